//! Withdrawal audit models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// A pure withdrawal whose size cannot be explained by the principal
/// contributed before it, suggesting a gain was cashed out without a
/// matching realized-result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspectWithdrawal {
    pub asset_id: String,
    pub date: NaiveDate,
    /// Magnitude withdrawn
    pub withdrawn: Decimal,
    /// Principal contributed to the asset before this withdrawal
    pub prior_contributions: Decimal,
    /// Withdrawn amount in excess of prior principal
    pub estimated_gain: Decimal,
    /// Whether any contribution exists on or after the withdrawal date,
    /// suggesting the cashed-out gain flowed back in
    pub reinvested_after: bool,
}

/// Audit scan tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditConfig {
    /// Withdrawals at or below this magnitude are ignored
    pub min_withdrawal: Decimal,
}

impl Default for AuditConfig {
    fn default() -> Self {
        AuditConfig {
            min_withdrawal: dec!(50),
        }
    }
}
