//! Data models for account state, order plans and projections.

mod account;
mod order;
mod projection;
mod trade;

pub use account::{pct_of, AccountSnapshot};
pub use order::{LimitOrderRequest, OrderPlan, OrderTicket};
pub use projection::ProfitLossProjection;
pub use trade::TradeSide;
