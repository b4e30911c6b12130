//! Audit module - heuristics over the ledger that flag suspicious entries.

pub mod audit_model;
pub mod audit_service;

pub use audit_model::*;
pub use audit_service::*;
