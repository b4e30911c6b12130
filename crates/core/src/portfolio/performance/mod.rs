//! Performance module - return metrics over asset, period, and time-cut windows.

mod growth_calculator;
mod mwr_calculator;
pub mod performance_model;
pub mod performance_service;

pub use growth_calculator::annualized_growth;
pub use mwr_calculator::{external_cash_flows, money_weighted_rate, solve_rate};
pub use performance_model::*;
pub use performance_service::*;

#[cfg(test)]
mod performance_service_tests;
