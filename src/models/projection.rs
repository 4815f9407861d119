//! Profit/loss projection for a two-leg plan.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Expected outcome of both legs hitting take-profit, or the whole volume
/// hitting the shared stop-loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitLossProjection {
    /// Profit if leg 1 reaches its take-profit
    pub profit_leg1: Decimal,
    pub profit_leg1_pct: Decimal,

    /// Profit if leg 2 reaches its take-profit
    pub profit_leg2: Decimal,
    pub profit_leg2_pct: Decimal,

    pub total_profit: Decimal,
    pub total_profit_pct: Decimal,

    /// Loss if the full volume is stopped out
    pub loss: Decimal,
    pub loss_pct: Decimal,

    /// |total profit / loss|, None when the loss is zero
    pub risk_reward: Option<Decimal>,
}

impl ProfitLossProjection {
    /// Risk/reward as displayed in logs: "2.00:1" or "undefined (zero risk)".
    pub fn risk_reward_label(&self) -> String {
        match self.risk_reward {
            Some(ratio) => format!("{:.2}:1", ratio),
            None => "undefined (zero risk)".to_string(),
        }
    }
}

impl std::fmt::Display for ProfitLossProjection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Profit & Loss Analysis:")?;
        writeln!(
            f,
            "   Potential Profit TP1: ${:.2} ({:.2}%)",
            self.profit_leg1, self.profit_leg1_pct
        )?;
        writeln!(
            f,
            "   Potential Profit TP2: ${:.2} ({:.2}%)",
            self.profit_leg2, self.profit_leg2_pct
        )?;
        writeln!(
            f,
            "   Total Potential Profit: ${:.2} ({:.2}% of balance)",
            self.total_profit, self.total_profit_pct
        )?;
        writeln!(
            f,
            "   Potential Loss: ${:.2} ({:.2}% of balance)",
            self.loss, self.loss_pct
        )?;
        write!(f, "   Risk/Reward Ratio: {}", self.risk_reward_label())
    }
}
