//! Paper venue: accepts pending limit orders in memory.
//!
//! No matching or fills happen here. Orders are validated, normalised to
//! the lot step, recorded and announced on the event bus.

use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::{debug, info};
use uuid::Uuid;

use crate::events::{EventBus, VenueEvent};
use crate::models::{AccountSnapshot, LimitOrderRequest, OrderTicket};

use super::ExecutionVenue;

/// Instrument volume constraints in units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeRules {
    /// Volume granularity
    pub lot_step: Decimal,
    /// Smallest accepted volume after normalisation
    pub min_volume: Decimal,
}

impl Default for VolumeRules {
    fn default() -> Self {
        Self {
            lot_step: dec!(1000),
            min_volume: dec!(1000),
        }
    }
}

impl VolumeRules {
    /// Round `volume` to the nearest lot step.
    pub fn normalize(&self, volume: Decimal) -> Decimal {
        if self.lot_step <= Decimal::ZERO {
            return volume;
        }
        (volume / self.lot_step).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            * self.lot_step
    }
}

/// In-memory execution venue for dry runs and tests.
pub struct PaperVenue {
    account: AccountSnapshot,
    rules: VolumeRules,
    events: EventBus,
    orders: Mutex<Vec<OrderTicket>>,
}

impl PaperVenue {
    pub fn new(account: AccountSnapshot, rules: VolumeRules) -> Self {
        Self {
            account,
            rules,
            events: EventBus::new(),
            orders: Mutex::new(Vec::new()),
        }
    }

    /// Orders accepted so far, in placement order.
    pub fn pending_orders(&self) -> Vec<OrderTicket> {
        self.orders.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn check(&self, request: &LimitOrderRequest, volume: Decimal) -> Result<()> {
        if request.symbol != self.account.symbol {
            bail!(
                "Unknown symbol {} (venue trades {})",
                request.symbol,
                self.account.symbol
            );
        }
        if request.entry_price <= Decimal::ZERO {
            bail!("Invalid entry price {}", request.entry_price);
        }
        if volume < self.rules.min_volume {
            bail!(
                "volume {} is below minimum {} (requested {:.2})",
                volume,
                self.rules.min_volume,
                request.volume
            );
        }
        Ok(())
    }
}

#[async_trait]
impl ExecutionVenue for PaperVenue {
    async fn account_snapshot(&self) -> Result<AccountSnapshot> {
        Ok(AccountSnapshot {
            server_time: Utc::now(),
            ..self.account.clone()
        })
    }

    async fn place_limit_order(&self, request: &LimitOrderRequest) -> Result<OrderTicket> {
        let volume = self.rules.normalize(request.volume);
        debug!(
            label = %request.label,
            requested = %request.volume,
            normalized = %volume,
            "Normalised order volume"
        );

        self.check(request, volume)?;

        let ticket = OrderTicket {
            order_id: format!("PAPER-{}", Uuid::new_v4()),
            volume,
            request: request.clone(),
            created_at: Utc::now(),
        };

        info!(
            order_id = %ticket.order_id,
            side = request.side.as_str(),
            symbol = %request.symbol,
            volume = %volume,
            price = %request.entry_price,
            "Paper limit order accepted"
        );

        self.orders
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(ticket.clone());

        self.events.publish(&VenueEvent::PendingOrderCreated {
            order_id: ticket.order_id.clone(),
            label: request.label.clone(),
            volume,
        });

        Ok(ticket)
    }

    fn events(&self) -> &EventBus {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{OrderPlan, TradeSide};

    fn venue() -> PaperVenue {
        let account =
            AccountSnapshot::new("EURUSD", dec!(10000), dec!(0.0001), dec!(0.0001), dec!(1.1));
        PaperVenue::new(account, VolumeRules::default())
    }

    fn request(volume: Decimal) -> LimitOrderRequest {
        OrderPlan {
            label: "TP1 Order".to_string(),
            side: TradeSide::Buy,
            volume,
            weight_pct: dec!(100),
            entry_price: dec!(1.10000),
            take_profit_pips: 50,
            take_profit_price: dec!(1.10500),
            stop_loss_pips: 30,
            stop_loss_price: dec!(1.09700),
        }
        .to_request("EURUSD", None)
    }

    #[test]
    fn test_normalize_to_lot_step() {
        let rules = VolumeRules::default();
        assert_eq!(rules.normalize(dec!(26666.67)), dec!(27000));
        assert_eq!(rules.normalize(dec!(40000)), dec!(40000));
        assert_eq!(rules.normalize(dec!(1499)), dec!(1000));
        assert_eq!(rules.normalize(dec!(1500)), dec!(2000));

        let unit = VolumeRules {
            lot_step: Decimal::ZERO,
            min_volume: Decimal::ZERO,
        };
        assert_eq!(unit.normalize(dec!(12.34)), dec!(12.34));
    }

    #[test]
    fn test_accepts_and_records_order() {
        let venue = venue();
        let ticket = tokio_test::block_on(venue.place_limit_order(&request(dec!(40000.4)))).unwrap();

        assert!(ticket.order_id.starts_with("PAPER-"));
        assert_eq!(ticket.volume, dec!(40000));
        assert_eq!(venue.pending_orders().len(), 1);
    }

    #[test]
    fn test_rejects_volume_below_minimum() {
        let venue = venue();
        let err = tokio_test::block_on(venue.place_limit_order(&request(dec!(400)))).unwrap_err();

        assert!(err.to_string().contains("below minimum"));
        assert!(venue.pending_orders().is_empty());
    }

    #[test]
    fn test_below_minimum_reports_normalized_volume() {
        let venue = venue();
        // 499.5 rounds down to zero lots
        let err = tokio_test::block_on(venue.place_limit_order(&request(dec!(499.5)))).unwrap_err();

        assert_eq!(
            err.to_string(),
            "volume 0 is below minimum 1000 (requested 499.50)"
        );
    }

    #[test]
    fn test_rejects_wrong_symbol() {
        let venue = venue();
        let mut req = request(dec!(5000));
        req.symbol = "GBPUSD".to_string();

        assert!(tokio_test::block_on(venue.place_limit_order(&req)).is_err());
    }

    #[tokio::test]
    async fn test_publishes_pending_order_created() {
        let venue = venue();
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = seen.clone();
            venue.events().subscribe(move |event| {
                if let VenueEvent::PendingOrderCreated { label, volume, .. } = event {
                    seen.lock().unwrap().push((label.clone(), *volume));
                }
            });
        }

        venue.place_limit_order(&request(dec!(3000))).await.unwrap();
        let _ = venue.place_limit_order(&request(dec!(10))).await;

        // Rejected orders are not announced
        assert_eq!(*seen.lock().unwrap(), vec![("TP1 Order".to_string(), dec!(3000))]);
    }

    #[tokio::test]
    async fn test_snapshot_refreshes_server_time() {
        let venue = venue();
        let before = Utc::now();
        let snapshot = venue.account_snapshot().await.unwrap();

        assert!(snapshot.server_time >= before);
        assert_eq!(snapshot.balance, dec!(10000));
    }
}
