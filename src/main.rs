//! Two-Leg Limit Order Planner
//!
//! Sizes a trade from account balance and a risk percentage, splits it
//! across two take-profit legs and places both as pending limit orders.

mod bot;
mod events;
mod models;
mod trading;
mod venue;

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::bot::{Bot, BotConfig};
use crate::models::{AccountSnapshot, TradeSide};
use crate::trading::{OrderPlanner, StrategyConfig, TradePlan};
use crate::venue::{PaperVenue, VolumeRules};

/// Two-leg limit order planner CLI.
#[derive(Parser)]
#[command(name = "legplan")]
#[command(about = "Plan and place two weighted take-profit limit orders", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// JSON strategy config file; flags and env vars override its fields
    #[arg(short, long, env = "LEGPLAN_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(flatten)]
    strategy: StrategyArgs,

    #[command(flatten)]
    account: AccountArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute volumes, price levels and the P&L projection without placing orders
    Plan,

    /// Run the strategy against the paper venue
    Run {
        /// Keep running and log ticks until Ctrl+C
        #[arg(long)]
        watch: bool,

        /// Tick interval in seconds when watching
        #[arg(short, long, default_value = "5")]
        interval: u64,

        /// Name shown in start/stop banners
        #[arg(long, default_value = "LegPlan")]
        name: String,
    },

    /// Show the effective strategy configuration
    Config,
}

/// Per-field strategy overrides.
#[derive(Args)]
struct StrategyArgs {
    /// Order direction (buy or sell)
    #[arg(long, env = "LEGPLAN_SIDE", global = true)]
    side: Option<String>,

    /// Limit entry price
    #[arg(long, env = "LEGPLAN_ENTRY_PRICE", global = true)]
    entry_price: Option<Decimal>,

    /// Take profit 1 in pips
    #[arg(long, env = "LEGPLAN_TP1_PIPS", global = true)]
    tp1_pips: Option<u32>,

    /// Take profit 2 in pips
    #[arg(long, env = "LEGPLAN_TP2_PIPS", global = true)]
    tp2_pips: Option<u32>,

    /// Stop loss in pips
    #[arg(long, env = "LEGPLAN_SL_PIPS", global = true)]
    sl_pips: Option<u32>,

    /// Percentage of balance at risk
    #[arg(long, env = "LEGPLAN_RISK_PERCENT", global = true)]
    risk_percent: Option<Decimal>,

    /// Share of volume on the TP1 leg (0-100)
    #[arg(long, env = "LEGPLAN_TP1_WEIGHT", global = true)]
    tp1_weight: Option<Decimal>,

    /// Pending order expiration in hours (0 = none)
    #[arg(long, env = "LEGPLAN_EXPIRATION_HOURS", global = true)]
    expiration_hours: Option<u32>,
}

impl StrategyArgs {
    /// Defaults, then the config file, then these overrides.
    fn resolve(&self, file: Option<&Path>) -> Result<StrategyConfig> {
        let mut config = match file {
            Some(path) => StrategyConfig::from_file(path)?,
            None => StrategyConfig::default(),
        };

        if let Some(side) = &self.side {
            config.side = TradeSide::parse(side)?;
        }
        if let Some(v) = self.entry_price {
            config.entry_price = v;
        }
        if let Some(v) = self.tp1_pips {
            config.take_profit1_pips = v;
        }
        if let Some(v) = self.tp2_pips {
            config.take_profit2_pips = v;
        }
        if let Some(v) = self.sl_pips {
            config.stop_loss_pips = v;
        }
        if let Some(v) = self.risk_percent {
            config.risk_percent = v;
        }
        if let Some(v) = self.tp1_weight {
            config.tp1_weight_pct = v;
        }
        if let Some(v) = self.expiration_hours {
            config.order_expiration_hours = v;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Account and instrument inputs for the paper venue.
#[derive(Args)]
struct AccountArgs {
    /// Instrument symbol
    #[arg(long, env = "LEGPLAN_SYMBOL", default_value = "EURUSD", global = true)]
    symbol: String,

    /// Account balance
    #[arg(long, env = "LEGPLAN_BALANCE", default_value = "10000", global = true)]
    balance: Decimal,

    /// Value of one pip per unit of volume
    #[arg(long, env = "LEGPLAN_PIP_VALUE", default_value = "0.0001", global = true)]
    pip_value: Decimal,

    /// Price size of one pip
    #[arg(long, env = "LEGPLAN_PIP_SIZE", default_value = "0.0001", global = true)]
    pip_size: Decimal,

    /// Current bid price
    #[arg(long, env = "LEGPLAN_BID", default_value = "1.10000", global = true)]
    bid: Decimal,

    /// Volume granularity in units
    #[arg(long, env = "LEGPLAN_LOT_STEP", default_value = "1000", global = true)]
    lot_step: Decimal,

    /// Minimum order volume in units
    #[arg(long, env = "LEGPLAN_MIN_VOLUME", default_value = "1000", global = true)]
    min_volume: Decimal,
}

impl AccountArgs {
    fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot::new(
            self.symbol.clone(),
            self.balance,
            self.pip_value,
            self.pip_size,
            self.bid,
        )
    }

    fn volume_rules(&self) -> VolumeRules {
        VolumeRules {
            lot_step: self.lot_step,
            min_volume: self.min_volume,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let strategy = cli.strategy.resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Plan => {
            let account = cli.account.snapshot();
            let plan = OrderPlanner::new(strategy).plan(&account)?;
            print_plan(&plan);
        }

        Commands::Run {
            watch,
            interval,
            name,
        } => {
            info!(
                symbol = %cli.account.symbol,
                balance = %cli.account.balance,
                watch = watch,
                "Starting paper run"
            );

            let venue = Arc::new(PaperVenue::new(
                cli.account.snapshot(),
                cli.account.volume_rules(),
            ));
            let bot = Bot::new(
                BotConfig {
                    name,
                    strategy,
                    tick_interval_secs: interval,
                },
                venue.clone(),
            )?;

            if watch {
                let shutdown = bot.shutdown_signal();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        info!("Shutdown signal received");
                        shutdown.store(true, Ordering::SeqCst);
                    }
                });
                println!("\nPress Ctrl+C to stop.\n");
            }

            let report = bot.run(watch).await?;
            print_plan(&report.plan);
            println!("\n{}", report);
            println!("Pending orders on paper venue: {}", venue.pending_orders().len());
        }

        Commands::Config => {
            println!("\n=== Strategy Configuration ===\n");
            println!("  Order Type:           {}", strategy.side);
            println!("  Entry Price:          {}", strategy.entry_price);
            println!("  Take Profit 1:        {} pips", strategy.take_profit1_pips);
            println!("  Take Profit 2:        {} pips", strategy.take_profit2_pips);
            println!("  Stop Loss:            {} pips", strategy.stop_loss_pips);
            println!("  Risk:                 {}% of balance", strategy.risk_percent);
            println!(
                "  Leg Weights:          {}% / {}%",
                strategy.tp1_weight_pct,
                strategy.tp2_weight_pct()
            );
            println!("  Expiration:           {}h", strategy.order_expiration_hours);

            println!("\n=== Account (paper) ===\n");
            println!("  Symbol:               {}", cli.account.symbol);
            println!("  Balance:              ${:.2}", cli.account.balance);
            println!("  Pip Value / Size:     {} / {}", cli.account.pip_value, cli.account.pip_size);
            println!("  Lot Step / Min:       {} / {}", cli.account.lot_step, cli.account.min_volume);

            println!("\n--- JSON ---");
            println!("{}", serde_json::to_string_pretty(&strategy)?);
        }
    }

    Ok(())
}

fn print_plan(plan: &TradePlan) {
    println!("\n=== Trade Plan: {} ===", plan.symbol);
    println!("Total Volume: {:.2} units", plan.volumes.total);
    match plan.expiration {
        Some(at) => println!("Expires:      {}", at.format("%Y-%m-%d %H:%M UTC")),
        None => println!("Expires:      never"),
    }

    println!(
        "\n{:<10} {:>5} {:>8} {:>14} {:>10} {:>10} {:>10}",
        "LEG", "SIDE", "WEIGHT", "VOLUME", "ENTRY", "TP", "SL"
    );
    println!("{}", "-".repeat(83));

    for leg in &plan.legs {
        println!(
            "{:<10} {:>5} {:>7.1}% {:>14.2} {:>10} {:>10} {:>10}",
            leg.label,
            leg.side.as_str(),
            leg.weight_pct,
            leg.volume,
            leg.entry_price,
            leg.take_profit_price.round_dp(5),
            leg.stop_loss_price.round_dp(5)
        );
    }

    println!("\n{}", plan.projection);
    if plan.volumes.total.is_zero() {
        println!("\nWarning: computed volume is 0 (check pip value and stop loss)");
    }
}
