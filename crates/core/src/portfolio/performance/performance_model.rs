//! Performance output models and engine configuration.

use chrono::NaiveDate;
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::constants::DECIMAL_PRECISION;
use crate::errors::ValidationError;
use crate::portfolio::decomposition::Decomposition;
use crate::Result;

/// A dated signed cash flow in the investor perspective.
///
/// Positive amounts flow toward the holder, negative amounts away from the
/// holder; a contribution recorded positive in the ledger therefore becomes
/// a negative flow here. Transient: exists only for a solver invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashFlow {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Tri-state outcome of a return computation.
///
/// `Undefined` and `Unbounded` are first-class outcomes serialized
/// distinctly from any numeric rate, so downstream layers can never read
/// them as zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "camelCase")]
pub enum RateOutcome {
    /// Finite rate; a fraction from the calculators, percentage points in
    /// every `_pct` output field
    Rate(Decimal),
    /// No valid computation: no qualifying flows, non-convergence, or a
    /// guarded denominator
    Undefined,
    /// Non-positive capital base with non-negative value, conceptually +inf
    Unbounded,
}

impl RateOutcome {
    pub fn is_defined(&self) -> bool {
        matches!(self, RateOutcome::Rate(_))
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            RateOutcome::Rate(rate) => Some(*rate),
            _ => None,
        }
    }

    /// Wraps a solver result, mapping values Decimal cannot represent to
    /// `Undefined`.
    pub fn from_f64(rate: f64) -> Self {
        if !rate.is_finite() {
            return RateOutcome::Undefined;
        }
        match Decimal::from_f64(rate) {
            Some(rate) => RateOutcome::Rate(rate),
            None => RateOutcome::Undefined,
        }
    }

    /// Growth of a capital base toward a current value, as a fraction.
    ///
    /// Bases above the threshold divide normally. Positive bases at or
    /// below the threshold are suppressed to `Undefined` rather than
    /// amplifying decimal dust into huge percentages. Non-positive bases
    /// have no meaningful ratio at all: a non-negative value on them is
    /// `Unbounded`, a negative value on a negative base measures the loss
    /// against the base magnitude, and a negative value on a zero base is
    /// `Undefined`.
    pub fn from_value_growth(
        net_contribution: Decimal,
        current_value: Decimal,
        threshold: Decimal,
    ) -> Self {
        if net_contribution > threshold {
            RateOutcome::Rate((current_value - net_contribution) / net_contribution)
        } else if net_contribution > Decimal::ZERO {
            RateOutcome::Undefined
        } else if current_value >= Decimal::ZERO {
            RateOutcome::Unbounded
        } else if net_contribution < Decimal::ZERO {
            RateOutcome::Rate((current_value - net_contribution) / net_contribution.abs())
        } else {
            RateOutcome::Undefined
        }
    }

    /// Ratio guarded by the minimum-contribution threshold, as a fraction.
    /// Denominators at or below the threshold yield `Undefined`, never zero.
    pub fn from_guarded_ratio(
        numerator: Decimal,
        denominator: Decimal,
        threshold: Decimal,
    ) -> Self {
        if denominator > threshold {
            RateOutcome::Rate(numerator / denominator)
        } else {
            RateOutcome::Undefined
        }
    }

    /// Scales a fraction outcome into rounded percentage points.
    pub fn to_percent(self) -> Self {
        match self {
            RateOutcome::Rate(rate) => {
                RateOutcome::Rate((rate * dec!(100)).round_dp(DECIMAL_PRECISION))
            }
            other => other,
        }
    }
}

/// Newton-Raphson solver parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolverConfig {
    pub guess: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            guess: 0.1,
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

/// Cadence of rolling time cuts, as a fixed day step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CutCadence {
    Daily,
    Weekly,
    Fortnightly,
    /// Fixed 30-day step; calendar months belong to the period windows
    Monthly,
}

impl CutCadence {
    pub fn days(&self) -> i64 {
        match self {
            CutCadence::Daily => 1,
            CutCadence::Weekly => 7,
            CutCadence::Fortnightly => 14,
            CutCadence::Monthly => 30,
        }
    }
}

/// Calendar grain of the cumulative period windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PeriodGrain {
    Month,
    Year,
}

/// Engine configuration: everything the core lets a caller tune.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsConfig {
    /// Return percentages are suppressed while their denominator is at or
    /// below this amount
    pub min_contribution: Decimal,
    /// Rolling-cut cadence
    pub cadence: CutCadence,
    pub solver: SolverConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        MetricsConfig {
            min_contribution: dec!(100),
            cadence: CutCadence::Weekly,
            solver: SolverConfig::default(),
        }
    }
}

impl MetricsConfig {
    /// Rejects values the solver or the ratio guards cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.solver.max_iterations == 0 {
            return Err(ValidationError::InvalidConfiguration(
                "solver iteration cap must be positive".to_string(),
            )
            .into());
        }
        if !self.solver.tolerance.is_finite() || self.solver.tolerance <= 0.0 {
            return Err(ValidationError::InvalidConfiguration(
                "solver tolerance must be a positive finite number".to_string(),
            )
            .into());
        }
        if !self.solver.guess.is_finite() {
            return Err(ValidationError::InvalidConfiguration(
                "solver guess must be finite".to_string(),
            )
            .into());
        }
        if self.min_contribution < Decimal::ZERO {
            return Err(ValidationError::InvalidConfiguration(
                "minimum contribution threshold cannot be negative".to_string(),
            )
            .into());
        }
        Ok(())
    }
}

/// Whole-portfolio headline aggregate with its return percentages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub decomposition: Decomposition,
    /// Money-weighted annual rate over the whole window, percentage points
    pub money_weighted_rate_pct: RateOutcome,
    /// Current value growth over net contribution
    pub value_growth_pct: RateOutcome,
    /// Realized gain over gross contribution
    pub realized_over_gross_pct: RateOutcome,
    /// Realized gain over net contribution
    pub realized_over_net_pct: RateOutcome,
    /// Net gain over gross contribution
    pub net_gain_over_gross_pct: RateOutcome,
}

/// Per-asset performance row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetPerformance {
    pub asset_id: String,
    /// Display name resolved from the asset table
    pub name: Option<String>,
    pub decomposition: Decomposition,
    /// Money-weighted annual rate of this asset's flows, percentage points
    pub money_weighted_rate_pct: RateOutcome,
    /// Net gain over net contribution, threshold-guarded
    pub gain_return_pct: RateOutcome,
    pub value_growth_pct: RateOutcome,
    /// Number of principal contributions
    pub contribution_count: u32,
    pub first_activity: Option<NaiveDate>,
    pub last_activity: Option<NaiveDate>,
}

/// Cumulative-through-period performance row.
///
/// Values are since inception through the period end, never an isolated
/// bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodPerformance {
    /// "YYYY" or "YYYY-MM"
    pub period: String,
    /// Last calendar day of the period, the window's evaluation cutoff
    pub period_end: NaiveDate,
    pub decomposition: Decomposition,
    pub gain_return_pct: RateOutcome,
    pub money_weighted_rate_pct: RateOutcome,
}

/// One point of the rolling return curve
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollingPoint {
    pub date: NaiveDate,
    pub money_weighted_rate_pct: RateOutcome,
    /// Cumulative net contribution through the cut
    pub net_contribution: Decimal,
    /// Cumulative current value pinned at the cut
    pub current_value: Decimal,
}

/// One point of the capital evolution series.
///
/// Points exist at distinct transaction dates only; the last point's values
/// carry forward to any later date a consumer asks about.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionPoint {
    pub date: NaiveDate,
    pub net_contribution: Decimal,
    pub current_value: Decimal,
    pub net_gain: Decimal,
}

/// Annualized compounded growth, cumulative through a year end
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPeriod {
    /// "YYYY", or the portfolio total marker for the overall row
    pub period: String,
    /// Inclusive year count since the first ledger year
    pub years: u32,
    pub net_contribution: Decimal,
    pub net_gain: Decimal,
    /// Valuation the growth rate is measured against: contribution plus
    /// net gain for year rows, the portfolio's current value for the
    /// overall row
    pub end_value: Decimal,
    pub annualized_growth_pct: RateOutcome,
}

/// Compound growth summary: one cumulative row per calendar year present in
/// the ledger plus one overall row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthSummary {
    pub by_year: Vec<GrowthPeriod>,
    pub overall: GrowthPeriod,
}
