//! Ledgerfolio Core - Return-computation engine over an investment ledger.
//!
//! This crate contains the core metric logic for Ledgerfolio: transaction
//! role classification, contribution/gain decomposition, the money-weighted
//! rate solver, and the windowing engine that applies them per asset, per
//! calendar period, and along rolling time cuts. It is storage-agnostic and
//! defines the repository trait the host's ledger store implements.

pub mod constants;
pub mod errors;
pub mod ledger;
pub mod portfolio;

// Re-export common types from ledger and portfolio modules
pub use ledger::*;
pub use portfolio::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
