//! Ledger domain models.

use crate::errors::ValidationError;
use crate::ledger::ledger_constants::*;
use crate::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Domain model representing one immutable ledger record.
///
/// Records are created by the entry workflow and never mutated; the engine
/// treats every input sequence as a frozen snapshot. Amounts are signed:
/// money moving toward the holder (withdrawals, realized and unrealized
/// losses) is negative, and loss-adjustment rows are recorded negative even
/// though they reduce the amount withdrawn.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Ordering key for every window computation
    #[serde(with = "timestamp_format")]
    pub timestamp: DateTime<Utc>,
    pub asset_id: String,
    /// Signed amount in the ledger's base currency
    pub amount: Decimal,
    /// Amount in the currency the operation was entered in; informational
    pub original_amount: Decimal,
    pub currency: String,
    /// Exchange rate applied at entry time; informational
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fx_rate: Option<Decimal>,
    /// Operation kind (closed set, see `ledger_constants`)
    pub kind: String,
    /// Semantic variation scoped to the kind (e.g. "purchase", "loss-adjustment")
    pub subtype: Option<String>,
    /// Contributor label
    pub owner: String,
    /// Fraction of the amount attributed to the owner (0-1)
    #[serde(default = "default_participation")]
    pub participation: Decimal,
}

fn default_participation() -> Decimal {
    Decimal::ONE
}

impl Transaction {
    /// Returns the calendar date of this transaction
    pub fn effective_date(&self) -> NaiveDate {
        self.timestamp.naive_utc().date()
    }

    /// Period key "YYYY" used by yearly windows
    pub fn year_key(&self) -> String {
        self.effective_date().format("%Y").to_string()
    }

    /// Period key "YYYY-MM" used by monthly windows
    pub fn month_key(&self) -> String {
        self.effective_date().format("%Y-%m").to_string()
    }
}

/// Descriptive metadata for a grouping key; carries no financial state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Enum representing the closed set of operation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Contribution,
    Withdrawal,
    Fee,
    RealizedResult,
    UnrealizedResult,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Contribution => OPERATION_KIND_CONTRIBUTION,
            OperationKind::Withdrawal => OPERATION_KIND_WITHDRAWAL,
            OperationKind::Fee => OPERATION_KIND_FEE,
            OperationKind::RealizedResult => OPERATION_KIND_REALIZED_RESULT,
            OperationKind::UnrealizedResult => OPERATION_KIND_UNREALIZED_RESULT,
        }
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            s if s == OPERATION_KIND_CONTRIBUTION => Ok(OperationKind::Contribution),
            s if s == OPERATION_KIND_WITHDRAWAL => Ok(OperationKind::Withdrawal),
            s if s == OPERATION_KIND_FEE => Ok(OperationKind::Fee),
            s if s == OPERATION_KIND_REALIZED_RESULT => Ok(OperationKind::RealizedResult),
            s if s == OPERATION_KIND_UNREALIZED_RESULT => Ok(OperationKind::UnrealizedResult),
            _ => Err(format!("Unknown operation kind: {}", s)),
        }
    }
}

/// Caller-supplied restriction applied to the snapshot before any window
/// computation. `None` fields leave the corresponding dimension
/// unrestricted; the default filter keeps everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub asset_ids: Option<Vec<String>>,
    pub kinds: Option<Vec<OperationKind>>,
}

impl LedgerFilter {
    /// Applies the filter to a snapshot, validating the date range first.
    pub fn apply(&self, transactions: &[Transaction]) -> Result<Vec<Transaction>> {
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start > end {
                return Err(ValidationError::InvalidDateRange { start, end }.into());
            }
        }

        let kinds: Option<Vec<&str>> = self
            .kinds
            .as_ref()
            .map(|ks| ks.iter().map(|k| k.as_str()).collect());

        Ok(transactions
            .iter()
            .filter(|tx| {
                let date = tx.effective_date();
                self.start.is_none_or(|s| date >= s)
                    && self.end.is_none_or(|e| date <= e)
                    && self
                        .asset_ids
                        .as_ref()
                        .is_none_or(|ids| ids.iter().any(|id| id == &tx.asset_id))
                    && kinds.as_ref().is_none_or(|ks| ks.contains(&tx.kind.as_str()))
            })
            .cloned()
            .collect())
    }
}

// Custom serialization for timestamps to ensure consistent ISO 8601 formatting
mod timestamp_format {
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        // First try parsing as RFC3339/ISO8601
        if let Ok(dt) = DateTime::parse_from_rfc3339(&s) {
            return Ok(dt.with_timezone(&Utc));
        }

        // Then try as date-only format
        if let Ok(date) = NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            // Use midnight UTC for date-only values
            return Ok(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default()));
        }

        Err(serde::de::Error::custom(format!(
            "Invalid timestamp format: {}. Expected ISO 8601/RFC3339 or YYYY-MM-DD",
            s
        )))
    }
}
