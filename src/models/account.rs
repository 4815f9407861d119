//! Read-only account and instrument state supplied by the execution venue.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Snapshot of the account and traded instrument at planning time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    /// Instrument the orders are placed on (e.g., "EURUSD")
    pub symbol: String,

    /// Account balance in account currency
    pub balance: Decimal,

    /// Monetary value of one pip per unit of volume
    pub pip_value: Decimal,

    /// Price increment of one pip (e.g., 0.0001)
    pub pip_size: Decimal,

    /// Current bid price
    pub bid: Decimal,

    /// Venue clock, used to stamp order expirations
    #[serde(default = "Utc::now")]
    pub server_time: DateTime<Utc>,
}

impl AccountSnapshot {
    pub fn new(
        symbol: impl Into<String>,
        balance: Decimal,
        pip_value: Decimal,
        pip_size: Decimal,
        bid: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            balance,
            pip_value,
            pip_size,
            bid,
            server_time: Utc::now(),
        }
    }
}

/// `amount / base * 100`, or zero when `base` is zero or the percentage
/// does not fit in a `Decimal`.
pub fn pct_of(amount: Decimal, base: Decimal) -> Decimal {
    amount
        .checked_div(base)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(Decimal::ZERO)
}
