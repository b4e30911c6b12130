use super::ledger_model::{Asset, Transaction};
use crate::Result;

/// Trait defining the contract for ledger snapshot access.
///
/// Implemented by the host's storage layer. Both methods return the full
/// snapshot; windowing and filtering happen inside the engine. Store
/// failures surface as `Error::Repository`.
pub trait LedgerRepositoryTrait: Send + Sync {
    /// All transactions, ordered by timestamp.
    fn get_transactions(&self) -> Result<Vec<Transaction>>;
    /// All assets referenced by the transactions.
    fn get_assets(&self) -> Result<Vec<Asset>>;
}
