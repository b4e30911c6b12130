//! Reduction of a classified transaction set into contribution/gain
//! aggregates.

use log::debug;
use rust_decimal::Decimal;

use super::decomposition_model::Decomposition;
use crate::ledger::{classify_transaction, Transaction, TransactionRole};

/// Reduces a transaction partition to its decomposition aggregate.
///
/// Pure function over the snapshot slice: an empty partition yields the
/// all-zero record and no input ever raises. Amount signs follow the
/// ledger convention, so every formula is a plain sum.
pub fn decompose(transactions: &[Transaction]) -> Decomposition {
    let mut contribution_principal = Decimal::ZERO;
    let mut contribution_reinvested = Decimal::ZERO;
    let mut withdrawal_pure = Decimal::ZERO;
    let mut loss_adjustment = Decimal::ZERO;
    let mut fees = Decimal::ZERO;
    let mut realized_gain = Decimal::ZERO;
    let mut unrealized_gain = Decimal::ZERO;
    let mut unclassified_count: u32 = 0;

    for tx in transactions {
        match classify_transaction(tx) {
            TransactionRole::ContributionPrincipal => contribution_principal += tx.amount,
            TransactionRole::ContributionReinvested => contribution_reinvested += tx.amount,
            TransactionRole::WithdrawalPure => withdrawal_pure += tx.amount,
            TransactionRole::LossAdjustment => loss_adjustment += tx.amount,
            TransactionRole::Fee => fees += tx.amount,
            TransactionRole::RealizedGain | TransactionRole::RealizedLoss => {
                realized_gain += tx.amount
            }
            TransactionRole::UnrealizedResult => unrealized_gain += tx.amount,
            TransactionRole::Unclassified => unclassified_count += 1,
        }
    }

    if unclassified_count > 0 {
        debug!(
            "decompose: excluded {} unclassified transactions from aggregates",
            unclassified_count
        );
    }

    let gross_contribution = contribution_principal + withdrawal_pure;
    let net_reinvestment = contribution_reinvested + loss_adjustment;
    let net_contribution = gross_contribution + net_reinvestment;
    let net_gain = realized_gain + unrealized_gain;
    let current_value = net_contribution + unrealized_gain;

    Decomposition {
        gross_contribution,
        net_reinvestment,
        net_contribution,
        realized_gain,
        unrealized_gain,
        net_gain,
        current_value,
        fees,
        unclassified_count,
    }
}
