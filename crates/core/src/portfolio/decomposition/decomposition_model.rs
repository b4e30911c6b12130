//! Decomposition aggregate model.

use crate::constants::DECIMAL_PRECISION;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Contribution/gain aggregate of one transaction partition.
///
/// One instance per partition (whole portfolio, one asset, one cumulative
/// window). Computed fresh on every query; never persisted. The identities
/// `net_contribution = gross_contribution + net_reinvestment`,
/// `net_gain = realized_gain + unrealized_gain` and
/// `current_value = net_contribution + unrealized_gain` hold by
/// construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decomposition {
    /// Capital supplied via direct purchases, net of pure withdrawals
    pub gross_contribution: Decimal,
    /// Reinvested gains net of loss-adjustment reclassifications
    pub net_reinvestment: Decimal,
    pub net_contribution: Decimal,
    /// Consolidated result of closed positions
    pub realized_gain: Decimal,
    /// Mark-to-market result on open positions
    pub unrealized_gain: Decimal,
    pub net_gain: Decimal,
    pub current_value: Decimal,
    /// Fee total, informational; fees enter the solver's cash-flow view but
    /// no contribution or gain sum
    pub fees: Decimal,
    /// Rows the classifier did not recognize, excluded from every sum
    pub unclassified_count: u32,
}

impl Decomposition {
    /// Field-wise accumulation of another partition's aggregate.
    ///
    /// Every monetary field is a linear sum over transactions, so
    /// accumulating partition aggregates equals decomposing their union.
    pub fn accumulate(&mut self, other: &Decomposition) {
        self.gross_contribution += other.gross_contribution;
        self.net_reinvestment += other.net_reinvestment;
        self.net_contribution += other.net_contribution;
        self.realized_gain += other.realized_gain;
        self.unrealized_gain += other.unrealized_gain;
        self.net_gain += other.net_gain;
        self.current_value += other.current_value;
        self.fees += other.fees;
        self.unclassified_count += other.unclassified_count;
    }

    /// Rounds every monetary field to the engine precision. Applied at the
    /// output boundary only, so intermediate accumulation stays exact.
    pub fn round(mut self) -> Self {
        self.gross_contribution = self.gross_contribution.round_dp(DECIMAL_PRECISION);
        self.net_reinvestment = self.net_reinvestment.round_dp(DECIMAL_PRECISION);
        self.net_contribution = self.net_contribution.round_dp(DECIMAL_PRECISION);
        self.realized_gain = self.realized_gain.round_dp(DECIMAL_PRECISION);
        self.unrealized_gain = self.unrealized_gain.round_dp(DECIMAL_PRECISION);
        self.net_gain = self.net_gain.round_dp(DECIMAL_PRECISION);
        self.current_value = self.current_value.round_dp(DECIMAL_PRECISION);
        self.fees = self.fees.round_dp(DECIMAL_PRECISION);
        self
    }
}
