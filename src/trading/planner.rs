//! Order planner: turns a config and an account snapshot into two sized,
//! priced legs, then submits them to the execution venue.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use tracing::{error, info};

use crate::models::{AccountSnapshot, OrderPlan, OrderTicket, ProfitLossProjection};
use crate::venue::ExecutionVenue;

use super::price_levels::{stop_loss_price, take_profit_price};
use super::projection::{project_profit_loss, LegPips};
use super::{LegVolumes, PositionSizer, StrategyConfig};

/// Everything computed for one run, before submission.
#[derive(Debug, Clone)]
pub struct TradePlan {
    pub symbol: String,
    pub volumes: LegVolumes,
    pub legs: [OrderPlan; 2],
    pub projection: ProfitLossProjection,
    pub expiration: Option<DateTime<Utc>>,
}

/// Submission result of a single leg.
#[derive(Debug)]
pub struct LegOutcome {
    pub label: String,
    pub result: Result<OrderTicket>,
}

impl LegOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Builds and submits the two-leg plan.
pub struct OrderPlanner {
    config: StrategyConfig,
    sizer: PositionSizer,
}

impl OrderPlanner {
    pub fn new(config: StrategyConfig) -> Self {
        let sizer = PositionSizer::new(config.clone());
        Self { config, sizer }
    }

    /// Size, price and project both legs against `account`.
    pub fn plan(&self, account: &AccountSnapshot) -> Result<TradePlan> {
        let cfg = &self.config;
        let volumes = self.sizer.calculate(account);

        info!(
            "Volume Calculation: Total={:.2} units, TP1={:.2} units ({}%), TP2={:.2} units ({}%)",
            volumes.total,
            volumes.leg1,
            cfg.tp1_weight_pct,
            volumes.leg2,
            cfg.tp2_weight_pct()
        );

        let pip_size = account.pip_size;
        let stop_loss = stop_loss_price(cfg.side, cfg.entry_price, cfg.stop_loss_pips, pip_size);

        let leg = |n: u8, volume: Decimal, weight_pct: Decimal, tp_pips: u32| OrderPlan {
            label: cfg.leg_label(n),
            side: cfg.side,
            volume,
            weight_pct,
            entry_price: cfg.entry_price,
            take_profit_pips: tp_pips,
            take_profit_price: take_profit_price(cfg.side, cfg.entry_price, tp_pips, pip_size),
            stop_loss_pips: cfg.stop_loss_pips,
            stop_loss_price: stop_loss,
        };

        let legs = [
            leg(1, volumes.leg1, cfg.tp1_weight_pct, cfg.take_profit1_pips),
            leg(2, volumes.leg2, cfg.tp2_weight_pct(), cfg.take_profit2_pips),
        ];

        let projection = project_profit_loss(
            &volumes,
            LegPips {
                take_profit1: cfg.take_profit1_pips,
                take_profit2: cfg.take_profit2_pips,
                stop_loss: cfg.stop_loss_pips,
            },
            account.pip_value,
            account.balance,
        )
        .context("Failed to project profit/loss")?;

        let expiration = match cfg.order_expiration_hours {
            0 => None,
            hours => Some(
                account
                    .server_time
                    .checked_add_signed(Duration::hours(i64::from(hours)))
                    .with_context(|| {
                        format!(
                            "Order expiration of {}h from {} is out of range",
                            hours, account.server_time
                        )
                    })?,
            ),
        };

        Ok(TradePlan {
            symbol: account.symbol.clone(),
            volumes,
            legs,
            projection,
            expiration,
        })
    }

    /// Submit both legs. Each leg is placed and logged on its own; a
    /// rejected leg does not stop the other from being sent.
    pub async fn submit<V: ExecutionVenue + ?Sized>(
        &self,
        venue: &V,
        plan: &TradePlan,
    ) -> Vec<LegOutcome> {
        let mut outcomes = Vec::with_capacity(plan.legs.len());

        for leg in &plan.legs {
            let request = leg.to_request(&plan.symbol, plan.expiration);
            let result = venue.place_limit_order(&request).await;

            match &result {
                Ok(ticket) => info!(
                    order_id = %ticket.order_id,
                    "{} placed: Volume={:.2}, Entry={}, TP={} ({} pips), SL={} ({} pips)",
                    leg.label,
                    ticket.volume,
                    leg.entry_price,
                    leg.take_profit_price,
                    leg.take_profit_pips,
                    leg.stop_loss_price,
                    leg.stop_loss_pips
                ),
                Err(e) => error!("Failed to place {}: {:#}", leg.label, e),
            }

            outcomes.push(LegOutcome {
                label: leg.label.clone(),
                result,
            });
        }

        outcomes
    }
}
