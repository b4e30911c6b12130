/// Operation kinds
///
/// Each constant represents one of the supported ledger operation
/// categories. Subtypes are free-form strings scoped to their kind; the
/// classifier in `role_classifier` resolves (kind, subtype) pairs to
/// canonical roles.

/// Capital movement initiated by the holder into the portfolio. Positive amount.
pub const OPERATION_KIND_CONTRIBUTION: &str = "contribution";

/// Capital paid out of the portfolio to the holder. Negative amount.
pub const OPERATION_KIND_WITHDRAWAL: &str = "withdrawal";

/// Commission or management fee charged against the portfolio. Negative amount.
pub const OPERATION_KIND_FEE: &str = "fee";

/// Consolidated profit or loss from closing a position. Signed amount.
pub const OPERATION_KIND_REALIZED_RESULT: &str = "realized-result";

/// Mark-to-market valuation change on open positions. Signed amount.
pub const OPERATION_KIND_UNREALIZED_RESULT: &str = "unrealized-result";

/// All operation kinds understood by the engine
pub const OPERATION_KINDS: [&str; 5] = [
    OPERATION_KIND_CONTRIBUTION,
    OPERATION_KIND_WITHDRAWAL,
    OPERATION_KIND_FEE,
    OPERATION_KIND_REALIZED_RESULT,
    OPERATION_KIND_UNREALIZED_RESULT,
];

/// Operation subtypes
///
/// Only the subtypes below carry classification significance; anything else
/// falls back to its kind's default role.

/// Contribution entered as a direct purchase of an asset.
pub const SUBTYPE_PURCHASE: &str = "purchase";

/// Prefix shared by contribution subtypes that route gains back into the
/// portfolio (e.g. "reinvested-profit", "reinvested-dividend").
pub const SUBTYPE_REINVESTED_PREFIX: &str = "reinvest";

/// Withdrawal of capital to the holder.
pub const SUBTYPE_WITHDRAWAL: &str = "withdrawal";

/// Withdrawal row that reclassifies consolidated losses; recorded negative
/// even though it reduces the amount withdrawn.
pub const SUBTYPE_LOSS_ADJUSTMENT: &str = "loss-adjustment";

/// Prefix shared by realized-result subtypes that report losses.
pub const SUBTYPE_LOSS_PREFIX: &str = "loss";

/// Unrealized gain on open positions.
pub const SUBTYPE_APPRECIATION: &str = "appreciation";

/// Unrealized loss on open positions.
pub const SUBTYPE_DEPRECIATION: &str = "depreciation";
