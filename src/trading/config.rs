//! Strategy configuration.

use std::path::Path;

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::models::TradeSide;

/// Longest accepted pending order lifetime (ten years).
pub const MAX_EXPIRATION_HOURS: u32 = 24 * 365 * 10;

/// User parameters for one two-leg run. Immutable once the bot starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Buy or sell for both legs
    pub side: TradeSide,

    /// Limit entry price shared by both legs
    pub entry_price: Decimal,

    /// Take-profit distance of leg 1 in pips
    pub take_profit1_pips: u32,

    /// Take-profit distance of leg 2 in pips
    pub take_profit2_pips: u32,

    /// Stop-loss distance shared by both legs in pips
    pub stop_loss_pips: u32,

    /// Percentage of balance risked if the stop-loss is hit (e.g., 2.0 = 2%)
    pub risk_percent: Decimal,

    /// Share of total volume assigned to leg 1 (0-100), leg 2 gets the rest
    pub tp1_weight_pct: Decimal,

    /// Pending order lifetime in hours, 0 = good till cancelled
    pub order_expiration_hours: u32,

    /// Prefix for leg labels ("TP" gives "TP1 Order" / "TP2 Order")
    pub label_prefix: String,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            side: TradeSide::Buy,
            entry_price: dec!(1.10000),
            take_profit1_pips: 50,
            take_profit2_pips: 100,
            stop_loss_pips: 30,
            risk_percent: dec!(2.0),
            tp1_weight_pct: dec!(60.0),
            order_expiration_hours: 24,
            label_prefix: "TP".to_string(),
        }
    }
}

impl StrategyConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Failed to parse strategy config")
    }

    /// Reject parameters the planner cannot work with.
    ///
    /// Zero pip distances are allowed here: the sizer handles a zero
    /// stop-loss by producing a zero volume.
    pub fn validate(&self) -> Result<()> {
        if self.tp1_weight_pct < Decimal::ZERO || self.tp1_weight_pct > dec!(100) {
            bail!(
                "TP1 weight must be between 0 and 100, got {}",
                self.tp1_weight_pct
            );
        }
        if self.entry_price <= Decimal::ZERO {
            bail!("Entry price must be positive, got {}", self.entry_price);
        }
        if self.risk_percent < Decimal::ZERO {
            bail!("Risk percent cannot be negative, got {}", self.risk_percent);
        }
        if self.order_expiration_hours > MAX_EXPIRATION_HOURS {
            bail!(
                "Order expiration cannot exceed {} hours, got {}",
                MAX_EXPIRATION_HOURS,
                self.order_expiration_hours
            );
        }
        Ok(())
    }

    /// Share of total volume assigned to leg 2.
    pub fn tp2_weight_pct(&self) -> Decimal {
        dec!(100) - self.tp1_weight_pct
    }

    /// Label of leg `n` (1-based).
    pub fn leg_label(&self, n: u8) -> String {
        format!("{}{} Order", self.label_prefix, n)
    }
}
