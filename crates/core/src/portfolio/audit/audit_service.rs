//! Heuristic scan for withdrawals that likely embed unreported gains.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;
use rust_decimal::Decimal;

use crate::constants::DECIMAL_PRECISION;
use crate::ledger::{
    classify_transaction, LedgerFilter, LedgerRepositoryTrait, Transaction, TransactionRole,
    OPERATION_KIND_REALIZED_RESULT,
};
use crate::portfolio::audit::audit_model::{AuditConfig, SuspectWithdrawal};
use crate::Result;

pub trait WithdrawalAuditServiceTrait: Send + Sync {
    fn scan(&self, filter: &LedgerFilter, config: &AuditConfig) -> Result<Vec<SuspectWithdrawal>>;
}

pub struct WithdrawalAuditService {
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
}

impl WithdrawalAuditService {
    pub fn new(ledger_repository: Arc<dyn LedgerRepositoryTrait>) -> Self {
        WithdrawalAuditService { ledger_repository }
    }
}

impl WithdrawalAuditServiceTrait for WithdrawalAuditService {
    fn scan(&self, filter: &LedgerFilter, config: &AuditConfig) -> Result<Vec<SuspectWithdrawal>> {
        debug!("Scanning ledger for suspect withdrawals");
        let transactions = self.ledger_repository.get_transactions()?;
        let mut selected = filter.apply(&transactions)?;
        selected.sort_by_key(|tx| tx.timestamp);

        let mut partitions: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
        for tx in &selected {
            partitions.entry(tx.asset_id.as_str()).or_default().push(tx);
        }

        let mut suspects = Vec::new();
        for (asset_id, asset_txs) in &partitions {
            for tx in asset_txs {
                if classify_transaction(tx) != TransactionRole::WithdrawalPure
                    || tx.amount >= -config.min_withdrawal
                {
                    continue;
                }
                let date = tx.effective_date();

                let mut prior_contributions = Decimal::ZERO;
                let mut has_prior = false;
                for candidate in asset_txs {
                    if candidate.timestamp < tx.timestamp
                        && classify_transaction(candidate) == TransactionRole::ContributionPrincipal
                    {
                        has_prior = true;
                        prior_contributions += candidate.amount;
                    }
                }
                if !has_prior {
                    continue;
                }

                // A realized result booked on the day of the withdrawal
                // already accounts for the gain.
                let explained = asset_txs.iter().any(|other| {
                    other.kind == OPERATION_KIND_REALIZED_RESULT && other.effective_date() == date
                });
                if explained {
                    continue;
                }

                // Only an excess over prior principal is suspect; a partial
                // withdrawal covered by what was paid in is ordinary.
                let withdrawn = tx.amount.abs();
                let estimated_gain = withdrawn - prior_contributions;
                if estimated_gain <= Decimal::ZERO {
                    continue;
                }

                // Any contribution on or after the cash-out counts as the
                // gain flowing back in.
                let reinvested_after = asset_txs.iter().any(|other| {
                    matches!(
                        classify_transaction(other),
                        TransactionRole::ContributionPrincipal
                            | TransactionRole::ContributionReinvested
                    ) && other.effective_date() >= date
                });

                suspects.push(SuspectWithdrawal {
                    asset_id: (*asset_id).to_string(),
                    date,
                    withdrawn: withdrawn.round_dp(DECIMAL_PRECISION),
                    prior_contributions: prior_contributions.round_dp(DECIMAL_PRECISION),
                    estimated_gain: estimated_gain.round_dp(DECIMAL_PRECISION),
                    reinvested_after,
                });
            }
        }

        suspects.sort_by(|a, b| b.estimated_gain.cmp(&a.estimated_gain));
        Ok(suspects)
    }
}
