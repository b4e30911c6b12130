/// Identifier for the whole-portfolio aggregate row
pub const PORTFOLIO_TOTAL_ID: &str = "TOTAL";

/// Decimal precision for aggregate calculations
pub const DECIMAL_PRECISION: u32 = 6;

/// Day-count basis used when annualizing irregularly dated cash flows
pub const DAYS_PER_YEAR: f64 = 365.0;
