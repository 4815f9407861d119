//! Profit/loss projection for both legs.

use anyhow::{Context, Result};
use rust_decimal::Decimal;

use crate::models::{pct_of, ProfitLossProjection};
use super::LegVolumes;

/// Pip distances of a two-leg plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegPips {
    pub take_profit1: u32,
    pub take_profit2: u32,
    pub stop_loss: u32,
}

/// Project profit per leg if each take-profit is hit, and the loss if the
/// whole volume is stopped out. Fails if an amount does not fit in a `Decimal`.
pub fn project_profit_loss(
    volumes: &LegVolumes,
    pips: LegPips,
    pip_value: Decimal,
    balance: Decimal,
) -> Result<ProfitLossProjection> {
    let profit_leg1 = pip_amount(pips.take_profit1, pip_value, volumes.leg1)
        .context("TP1 profit overflows")?;
    let profit_leg2 = pip_amount(pips.take_profit2, pip_value, volumes.leg2)
        .context("TP2 profit overflows")?;
    let total_profit = profit_leg1
        .checked_add(profit_leg2)
        .context("Total profit overflows")?;
    let loss = pip_amount(pips.stop_loss, pip_value, volumes.total).context("Loss overflows")?;

    Ok(ProfitLossProjection {
        profit_leg1,
        profit_leg1_pct: pct_of(profit_leg1, balance),
        profit_leg2,
        profit_leg2_pct: pct_of(profit_leg2, balance),
        total_profit,
        total_profit_pct: pct_of(total_profit, balance),
        loss,
        loss_pct: pct_of(loss, balance),
        risk_reward: risk_reward_ratio(total_profit, loss),
    })
}

fn pip_amount(pips: u32, pip_value: Decimal, volume: Decimal) -> Option<Decimal> {
    Decimal::from(pips).checked_mul(pip_value)?.checked_mul(volume)
}

/// |profit / loss|, or None when there is nothing at risk.
pub fn risk_reward_ratio(total_profit: Decimal, loss: Decimal) -> Option<Decimal> {
    if loss.is_zero() {
        return None;
    }
    total_profit.checked_div(loss).map(|ratio| ratio.abs())
}
