//! Execution venue seam: account state, limit order placement and events.
//!
//! The venue owns matching, fills and position lifecycle. The planner only
//! reads an account snapshot and hands over pending limit orders.

mod paper;

use anyhow::Result;
use async_trait::async_trait;

use crate::events::EventBus;
use crate::models::{AccountSnapshot, LimitOrderRequest, OrderTicket};

pub use paper::{PaperVenue, VolumeRules};

/// Port implemented by any host that can take pending orders.
#[async_trait]
pub trait ExecutionVenue: Send + Sync {
    /// Current balance, pip metrics and bid for the traded instrument.
    async fn account_snapshot(&self) -> Result<AccountSnapshot>;

    /// Place a pending limit order.
    ///
    /// The venue normalises the volume to its own lot step. An `Err`
    /// carries the venue's rejection reason.
    async fn place_limit_order(&self, request: &LimitOrderRequest) -> Result<OrderTicket>;

    /// Event source for order and position lifecycle notifications.
    fn events(&self) -> &EventBus;
}
