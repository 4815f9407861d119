//! Order plans and the limit-order requests built from them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::TradeSide;

/// How stop-loss and take-profit are expressed on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtectionType {
    /// Distances in pips from the fill price
    Relative,
}

/// One sized and priced leg of a trade plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPlan {
    /// Human-readable label (e.g., "TP1 Order")
    pub label: String,

    pub side: TradeSide,

    /// Volume in units, not yet normalised to the venue's lot step
    pub volume: Decimal,

    /// Share of the total volume carried by this leg (0-100)
    pub weight_pct: Decimal,

    /// Limit entry price
    pub entry_price: Decimal,

    pub take_profit_pips: u32,
    pub take_profit_price: Decimal,

    pub stop_loss_pips: u32,
    pub stop_loss_price: Decimal,
}

impl OrderPlan {
    /// Order comment carried to the venue.
    pub fn comment(&self) -> String {
        format!(
            "TP (pips): {}, SL (pips): {}",
            self.take_profit_pips, self.stop_loss_pips
        )
    }

    /// Build the relative-protection limit order request for this leg.
    pub fn to_request(
        &self,
        symbol: &str,
        expiration: Option<DateTime<Utc>>,
    ) -> LimitOrderRequest {
        LimitOrderRequest {
            side: self.side,
            symbol: symbol.to_string(),
            volume: self.volume,
            entry_price: self.entry_price,
            label: self.label.clone(),
            stop_loss_pips: self.stop_loss_pips,
            take_profit_pips: self.take_profit_pips,
            protection: ProtectionType::Relative,
            expiration,
            comment: self.comment(),
        }
    }
}

/// Pending limit order request handed to the execution venue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitOrderRequest {
    pub side: TradeSide,
    pub symbol: String,
    pub volume: Decimal,
    pub entry_price: Decimal,
    pub label: String,
    pub stop_loss_pips: u32,
    pub take_profit_pips: u32,
    pub protection: ProtectionType,
    /// None = good till cancelled
    pub expiration: Option<DateTime<Utc>>,
    pub comment: String,
}

/// Venue acknowledgement of an accepted pending order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderTicket {
    /// Venue-assigned order id
    pub order_id: String,

    /// Volume after lot-step normalisation
    pub volume: Decimal,

    pub request: LimitOrderRequest,

    pub created_at: DateTime<Utc>,
}
