//! Role classification for ledger transactions.
//!
//! Maps each transaction's (kind, subtype) pair to a canonical financial
//! role. Every aggregate in the engine is defined over these roles, never
//! over raw kind strings.

use crate::ledger::ledger_constants::*;
use crate::ledger::ledger_model::Transaction;

/// Canonical financial role of a ledger transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionRole {
    /// Capital supplied through a direct purchase
    ContributionPrincipal,

    /// Gains routed back into the portfolio; internal reclassification,
    /// not external capital
    ContributionReinvested,

    /// Capital paid out to the holder
    WithdrawalPure,

    /// Withdrawal row reclassifying consolidated losses (recorded negative)
    LossAdjustment,

    /// Commission or management fee
    Fee,

    /// Consolidated profit from closed positions
    RealizedGain,

    /// Consolidated loss from closed positions
    RealizedLoss,

    /// Mark-to-market change on open positions, either direction
    UnrealizedResult,

    /// Combination the classifier does not recognize; excluded from every
    /// aggregate, counted for diagnostics
    Unclassified,
}

/// Classify a (kind, subtype) pair.
///
/// Deterministic total function: unknown subtypes fall back to the kind's
/// default role, unknown kinds classify as `Unclassified`. Never fails.
///
/// Defaults per kind:
/// - contribution -> `ContributionPrincipal` (only "reinvest*" differs)
/// - withdrawal -> `WithdrawalPure` (only "loss-adjustment" differs)
/// - fee -> `Fee` regardless of subtype
/// - realized-result -> `RealizedGain` (only "loss*" differs)
/// - unrealized-result -> recognized subtypes only; others are unclassified
pub fn classify_role(kind: &str, subtype: Option<&str>) -> TransactionRole {
    match kind {
        k if k == OPERATION_KIND_CONTRIBUTION => match subtype {
            Some(s) if s.starts_with(SUBTYPE_REINVESTED_PREFIX) => {
                TransactionRole::ContributionReinvested
            }
            _ => TransactionRole::ContributionPrincipal,
        },
        k if k == OPERATION_KIND_WITHDRAWAL => match subtype {
            Some(s) if s == SUBTYPE_LOSS_ADJUSTMENT => TransactionRole::LossAdjustment,
            _ => TransactionRole::WithdrawalPure,
        },
        k if k == OPERATION_KIND_FEE => TransactionRole::Fee,
        k if k == OPERATION_KIND_REALIZED_RESULT => match subtype {
            Some(s) if s.starts_with(SUBTYPE_LOSS_PREFIX) => TransactionRole::RealizedLoss,
            _ => TransactionRole::RealizedGain,
        },
        k if k == OPERATION_KIND_UNREALIZED_RESULT => match subtype {
            Some(s) if s == SUBTYPE_APPRECIATION || s == SUBTYPE_DEPRECIATION => {
                TransactionRole::UnrealizedResult
            }
            _ => TransactionRole::Unclassified,
        },
        _ => TransactionRole::Unclassified,
    }
}

/// Classify one ledger transaction
pub fn classify_transaction(transaction: &Transaction) -> TransactionRole {
    classify_role(&transaction.kind, transaction.subtype.as_deref())
}

/// Check if a transaction represents genuine external capital movement.
///
/// External flows are the only rows that become solver cash flows:
/// principal contributions, fees, and pure withdrawals. Reinvestment and
/// loss-adjustment rows stay inside the portfolio.
pub fn is_external_flow(transaction: &Transaction) -> bool {
    matches!(
        classify_transaction(transaction),
        TransactionRole::ContributionPrincipal
            | TransactionRole::Fee
            | TransactionRole::WithdrawalPure
    )
}

/// Check if a transaction participates in net contribution
pub fn affects_net_contribution(transaction: &Transaction) -> bool {
    matches!(
        classify_transaction(transaction),
        TransactionRole::ContributionPrincipal
            | TransactionRole::Fee
            | TransactionRole::WithdrawalPure
            | TransactionRole::ContributionReinvested
            | TransactionRole::LossAdjustment
    )
}
