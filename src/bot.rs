//! Bot runner: strategy lifecycle around the order planner.
//!
//! Handles:
//! - Start: parameter summary, planning, projection and two-leg submission
//! - Venue event handlers (pending orders, positions, errors), log-only
//! - Tick, stop and error callbacks, log-only
//! - Optional watch loop until the shutdown signal is raised

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use tokio::time::interval;
use tracing::{error, info, trace, warn};

use crate::events::{PlatformError, VenueEvent};
use crate::models::{pct_of, AccountSnapshot};
use crate::trading::{LegOutcome, OrderPlanner, StrategyConfig, TradePlan};
use crate::venue::ExecutionVenue;

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Name used in start/stop banners
    pub name: String,

    /// Strategy parameters
    pub strategy: StrategyConfig,

    /// Tick interval of the watch loop (seconds)
    pub tick_interval_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "LegPlan".to_string(),
            strategy: StrategyConfig::default(),
            tick_interval_secs: 5,
        }
    }
}

/// Result of the start sequence.
#[derive(Debug)]
pub struct StartReport {
    pub plan: TradePlan,
    pub outcomes: Vec<LegOutcome>,
}

impl StartReport {
    pub fn placed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.placed()
    }
}

impl std::fmt::Display for StartReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Orders ===")?;
        for outcome in &self.outcomes {
            match &outcome.result {
                Ok(ticket) => writeln!(
                    f,
                    "{:<10} {}  volume {:.2}  at {}",
                    outcome.label,
                    ticket.order_id,
                    ticket.volume,
                    ticket.created_at.format("%H:%M:%S")
                )?,
                Err(e) => writeln!(f, "{:<10} FAILED: {:#}", outcome.label, e)?,
            }
        }
        writeln!(f, "Placed: {}, Failed: {}", self.placed(), self.failed())
    }
}

/// Strategy lifecycle driver.
pub struct Bot<V: ExecutionVenue> {
    config: BotConfig,
    venue: Arc<V>,
    planner: OrderPlanner,
    subscribed: AtomicBool,
    shutdown: Arc<AtomicBool>,
}

impl<V: ExecutionVenue> Bot<V> {
    /// Create a new bot. Fails if the strategy config is invalid.
    pub fn new(config: BotConfig, venue: Arc<V>) -> Result<Self> {
        config
            .strategy
            .validate()
            .context("Invalid strategy configuration")?;
        let planner = OrderPlanner::new(config.strategy.clone());

        Ok(Self {
            config,
            venue,
            planner,
            subscribed: AtomicBool::new(false),
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get shutdown signal for external control.
    pub fn shutdown_signal(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Plan both legs and submit them. Runs once per strategy start.
    pub async fn on_start(&self) -> Result<StartReport> {
        info!("=== {} Started ===", self.config.name);

        self.register_handlers();

        let account = self
            .venue
            .account_snapshot()
            .await
            .context("Failed to read account snapshot")?;

        self.log_parameters(&account);

        let plan = self
            .planner
            .plan(&account)
            .context("Failed to build trade plan")?;
        for line in plan.projection.to_string().lines() {
            info!("{}", line);
        }

        let outcomes = self.planner.submit(self.venue.as_ref(), &plan).await;
        let report = StartReport { plan, outcomes };

        if report.failed() == 0 {
            info!("=== Orders Placed Successfully ===");
        } else {
            warn!(
                placed = report.placed(),
                failed = report.failed(),
                "=== Order placement finished with failures ==="
            );
        }

        Ok(report)
    }

    /// Price update. Nothing is recomputed after start.
    pub fn on_tick(&self, bid: Decimal) {
        trace!(bid = %bid, "Tick");
    }

    pub fn on_stop(&self) {
        info!("=== {} Stopped ===", self.config.name);
    }

    /// Venue-level error. Logged only, never retried.
    pub fn on_error(&self, err: &PlatformError) {
        log_platform_error(err);
    }

    /// Start, then optionally tick until the shutdown signal is raised, then stop.
    pub async fn run(&self, watch: bool) -> Result<StartReport> {
        let report = self.on_start().await?;

        if watch {
            self.watch().await;
        }

        self.on_stop();
        Ok(report)
    }

    async fn watch(&self) {
        let mut ticker = interval(Duration::from_secs(self.config.tick_interval_secs.max(1)));

        while !self.shutdown.load(Ordering::SeqCst) {
            ticker.tick().await;
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }

            match self.venue.account_snapshot().await {
                Ok(account) => self.on_tick(account.bid),
                Err(e) => self.on_error(&PlatformError {
                    code: "SnapshotFailed".to_string(),
                    message: format!("{:#}", e),
                }),
            }
        }
    }

    fn register_handlers(&self) {
        if self.subscribed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.venue.events().subscribe(handle_venue_event);
    }

    fn log_parameters(&self, account: &AccountSnapshot) {
        let cfg = &self.config.strategy;
        info!("Parameters Summary:");
        info!("   Order Type: {}", cfg.side);
        info!("   Entry Price: {}", cfg.entry_price);
        info!("   Take Profit 1: {} pips", cfg.take_profit1_pips);
        info!("   Take Profit 2: {} pips", cfg.take_profit2_pips);
        info!("   Stop Loss: {} pips", cfg.stop_loss_pips);
        info!("   Volume: {}% of balance", cfg.risk_percent);
        info!("   TP1 Weight: {}%", cfg.tp1_weight_pct);
        info!("   Expiration: {}", expiration_label(cfg.order_expiration_hours));
        info!("   Symbol: {}", account.symbol);
        info!("   Current Price: {}", account.bid);
        info!("   Account Balance: ${:.2}", account.balance);
    }
}

fn expiration_label(hours: u32) -> String {
    match hours {
        0 => "none".to_string(),
        h => format!("{}h", h),
    }
}

fn log_platform_error(err: &PlatformError) {
    error!(code = %err.code, "Error: {}", err);
}

/// Log-only handler for every venue event.
fn handle_venue_event(event: &VenueEvent) {
    match event {
        VenueEvent::PendingOrderCreated {
            order_id, label, ..
        } => info!(order_id = %order_id, "Pending Order Created: {}", label),
        VenueEvent::PositionOpened { label, net_profit } => {
            info!("Position Opened: {} - P&L: ${:.2}", label, net_profit)
        }
        VenueEvent::PositionClosed {
            label,
            net_profit,
            balance,
        } => info!(
            "Position Closed: {} - P&L: ${:.2} ({:.2}%)",
            label,
            net_profit,
            pct_of(*net_profit, *balance)
        ),
        VenueEvent::Error(err) => log_platform_error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::venue::{PaperVenue, VolumeRules};
    use rust_decimal_macros::dec;

    fn paper(pip_value: Decimal) -> Arc<PaperVenue> {
        let account =
            AccountSnapshot::new("EURUSD", dec!(10000), pip_value, dec!(0.0001), dec!(1.10020));
        Arc::new(PaperVenue::new(
            account,
            VolumeRules {
                lot_step: dec!(0.01),
                min_volume: dec!(0.01),
            },
        ))
    }

    #[tokio::test]
    async fn test_start_places_two_legs() {
        // balance 10000, risk 2%, SL 30 pips, pip value 0.1
        let venue = paper(dec!(0.1));
        let bot = Bot::new(BotConfig::default(), venue.clone()).unwrap();

        let report = bot.on_start().await.unwrap();

        assert_eq!(report.placed(), 2);
        assert_eq!(report.failed(), 0);
        assert_eq!(report.plan.volumes.total.round_dp(2), dec!(66.67));

        let orders = venue.pending_orders();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].volume, dec!(40.00));
        assert_eq!(orders[1].volume, dec!(26.67));
        assert_eq!(orders[0].request.take_profit_pips, 50);
        assert_eq!(orders[1].request.take_profit_pips, 100);
        assert_eq!(report.plan.legs[0].stop_loss_price, report.plan.legs[1].stop_loss_price);
        assert!(orders.iter().all(|o| o.request.expiration.is_some()));
    }

    #[tokio::test]
    async fn test_zero_pip_value_still_submits() {
        let venue = paper(Decimal::ZERO);
        let bot = Bot::new(BotConfig::default(), venue.clone()).unwrap();

        let report = bot.on_start().await.unwrap();

        // Zero volume goes to the venue, which rejects each leg on its own
        assert_eq!(report.outcomes.len(), 2);
        assert_eq!(report.failed(), 2);
        assert!(venue.pending_orders().is_empty());
    }

    #[tokio::test]
    async fn test_handlers_registered_once() {
        let venue = paper(dec!(0.1));
        let bot = Bot::new(BotConfig::default(), venue.clone()).unwrap();

        bot.on_start().await.unwrap();
        bot.on_start().await.unwrap();

        assert_eq!(venue.events().handler_count(), 1);

        // Position events flow through the log-only handler
        venue.events().publish(&VenueEvent::PositionClosed {
            label: "TP1 Order".to_string(),
            net_profit: dec!(-20),
            balance: dec!(9980),
        });
        bot.on_error(&PlatformError {
            code: "TechnicalError".to_string(),
            message: "server unavailable".to_string(),
        });
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = BotConfig {
            strategy: StrategyConfig {
                tp1_weight_pct: dec!(120),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(Bot::new(config, paper(dec!(0.1))).is_err());
    }

    #[tokio::test]
    async fn test_run_without_watch_stops() {
        let venue = paper(dec!(0.1));
        let bot = Bot::new(BotConfig::default(), venue).unwrap();

        let report = bot.run(false).await.unwrap();
        assert_eq!(report.placed(), 2);
        assert!(report.to_string().contains("Placed: 2, Failed: 0"));
    }

    #[tokio::test]
    async fn test_watch_exits_on_shutdown_signal() {
        let venue = paper(dec!(0.1));
        let bot = Bot::new(
            BotConfig {
                tick_interval_secs: 1,
                ..Default::default()
            },
            venue,
        )
        .unwrap();

        bot.shutdown_signal().store(true, Ordering::SeqCst);
        let report = bot.run(true).await.unwrap();
        assert_eq!(report.outcomes.len(), 2);
    }

    #[tokio::test]
    async fn test_watch_stops_when_signal_raised_later() {
        let venue = paper(dec!(0.1));
        let bot = Bot::new(
            BotConfig {
                tick_interval_secs: 1,
                ..Default::default()
            },
            venue,
        )
        .unwrap();

        let shutdown = bot.shutdown_signal();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            shutdown.store(true, Ordering::SeqCst);
        });

        let report = tokio::time::timeout(Duration::from_secs(5), bot.run(true))
            .await
            .expect("watch loop did not stop")
            .unwrap();
        assert_eq!(report.placed(), 2);
    }

    #[tokio::test]
    async fn test_start_fails_on_unrepresentable_expiration() {
        let venue = paper(dec!(0.1));
        let mut bot = Bot::new(BotConfig::default(), venue.clone()).unwrap();
        bot.planner = OrderPlanner::new(StrategyConfig {
            order_expiration_hours: u32::MAX,
            ..Default::default()
        });

        let err = bot.on_start().await.unwrap_err();
        assert!(format!("{:#}", err).contains("out of range"));
        assert!(venue.pending_orders().is_empty());
    }

    #[test]
    fn test_expiration_label() {
        assert_eq!(expiration_label(0), "none");
        assert_eq!(expiration_label(24), "24h");
    }
}
