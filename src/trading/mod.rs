//! Trading logic: position sizing, price levels, projection and the order planner.

mod config;
mod planner;
mod position_sizer;
mod price_levels;
mod projection;

pub use config::StrategyConfig;
pub use planner::{LegOutcome, OrderPlanner, TradePlan};
pub use position_sizer::{LegVolumes, PositionSizer};
