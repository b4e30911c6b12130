//! Money-weighted return via Newton-Raphson on dated cash flows.
//!
//! The solver finds the annual rate at which the net present value of the
//! external flows plus the terminal portfolio value is zero. Amounts are
//! discounted in f64; the result crosses back into `Decimal` at the
//! `RateOutcome` boundary.

use chrono::NaiveDate;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;

use crate::constants::DAYS_PER_YEAR;
use crate::ledger::{is_external_flow, Transaction};
use crate::portfolio::performance::performance_model::{CashFlow, RateOutcome, SolverConfig};

/// Below this slope Newton-Raphson cannot produce a meaningful step.
const DERIVATIVE_EPSILON: f64 = 1e-10;

/// Rates at or below -99.9% are rejected rather than evaluated; the
/// discount base 1 + r degenerates there.
const RATE_FLOOR: f64 = -0.999;

/// Extracts the solver's flows from ledger rows.
///
/// Only external flows participate. Ledger amounts are holder-perspective
/// (contribution positive), so they are negated into the investor
/// perspective the NPV convention expects.
pub fn external_cash_flows(transactions: &[Transaction]) -> Vec<CashFlow> {
    transactions
        .iter()
        .filter(|tx| is_external_flow(tx))
        .map(|tx| CashFlow {
            date: tx.effective_date(),
            amount: (-tx.amount).to_f64().unwrap_or(0.0),
        })
        .collect()
}

/// Money-weighted annual rate of a transaction set, as a fraction.
///
/// Appends the terminal flow (+`current_value` at `cutoff`) and solves.
/// Any solver failure surfaces as `Undefined`, never as a zero rate.
pub fn money_weighted_rate(
    transactions: &[Transaction],
    current_value: Decimal,
    cutoff: NaiveDate,
    config: &SolverConfig,
) -> RateOutcome {
    let mut flows = external_cash_flows(transactions);
    if flows.is_empty() {
        return RateOutcome::Undefined;
    }
    flows.push(CashFlow {
        date: cutoff,
        amount: current_value.to_f64().unwrap_or(0.0),
    });

    match solve_rate(&flows, config) {
        Some(rate) => RateOutcome::from_f64(rate),
        None => RateOutcome::Undefined,
    }
}

/// Newton-Raphson root of the NPV function.
///
/// Returns `None` when no defensible rate exists: fewer than two flows, a
/// rate at or below the floor, a vanishing derivative, a non-finite
/// evaluation, or the iteration cap elapsing without convergence.
pub fn solve_rate(flows: &[CashFlow], config: &SolverConfig) -> Option<f64> {
    if flows.len() < 2 {
        return None;
    }
    let base_date = flows.iter().map(|flow| flow.date).min()?;

    let mut rate = config.guess;
    for _ in 0..config.max_iterations {
        if rate <= RATE_FLOOR {
            return None;
        }

        let (npv, derivative) = npv_and_derivative(flows, base_date, rate);
        if !npv.is_finite() || !derivative.is_finite() {
            return None;
        }
        if derivative.abs() < DERIVATIVE_EPSILON {
            return None;
        }

        let new_rate = rate - npv / derivative;
        if (new_rate - rate).abs() < config.tolerance {
            if new_rate <= RATE_FLOOR {
                return None;
            }
            return Some(new_rate);
        }
        rate = new_rate;
    }

    None
}

/// NPV and its derivative with respect to the rate, in one pass.
///
/// Each flow is discounted by (1 + r)^(-t) with t in years of 365 days
/// from the earliest flow date.
fn npv_and_derivative(flows: &[CashFlow], base_date: NaiveDate, rate: f64) -> (f64, f64) {
    let mut npv = 0.0;
    let mut derivative = 0.0;

    for flow in flows {
        let days = (flow.date - base_date).num_days() as f64;
        let years = days / DAYS_PER_YEAR;

        npv += flow.amount * (1.0 + rate).powf(-years);
        // d/dr [a * (1+r)^(-t)] = -t * a * (1+r)^(-t-1)
        derivative -= years * flow.amount * (1.0 + rate).powf(-years - 1.0);
    }

    (npv, derivative)
}
