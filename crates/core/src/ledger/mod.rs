//! Ledger module - domain models, constants, and the role classifier.

mod ledger_constants;
mod ledger_model;
mod ledger_traits;
mod role_classifier;


pub use ledger_constants::*;
pub use ledger_model::{Asset, LedgerFilter, OperationKind, Transaction};
pub use ledger_traits::LedgerRepositoryTrait;
pub use role_classifier::{
    affects_net_contribution, classify_role, classify_transaction, is_external_flow,
    TransactionRole,
};
