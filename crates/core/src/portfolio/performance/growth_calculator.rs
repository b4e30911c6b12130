//! Annualized compound growth between two capital amounts.

use rust_decimal::{Decimal, MathematicalOps};

use crate::portfolio::performance::performance_model::RateOutcome;

/// Annualized growth rate turning `start_value` into `end_value` over
/// `periods` whole years, as a fraction: (end/start)^(1/n) - 1.
///
/// Zero elapsed periods have no per-year rate. Non-positive starts have no
/// base to compound on: a non-negative end is `Unbounded` and a negative
/// end `Undefined`. A negative end on a positive start has no real root,
/// and a zero end is a total loss at -100% per year.
pub fn annualized_growth(start_value: Decimal, end_value: Decimal, periods: u32) -> RateOutcome {
    if periods == 0 {
        return RateOutcome::Undefined;
    }
    if start_value <= Decimal::ZERO {
        if end_value >= Decimal::ZERO {
            return RateOutcome::Unbounded;
        }
        return RateOutcome::Undefined;
    }
    if end_value < Decimal::ZERO {
        return RateOutcome::Undefined;
    }
    if end_value == Decimal::ZERO {
        return RateOutcome::Rate(Decimal::NEGATIVE_ONE);
    }

    let ratio = end_value / start_value;
    let exponent = Decimal::ONE / Decimal::from(periods);
    match ratio.checked_powd(exponent) {
        Some(compounded) => RateOutcome::Rate(compounded - Decimal::ONE),
        None => RateOutcome::Undefined,
    }
}
