//! Venue events and a plain callback registry.
//!
//! Handlers run synchronously on the publishing thread, in the order they
//! were registered. There is no queueing and no delivery guarantee beyond that.

use std::sync::{Arc, RwLock};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Error surfaced by the venue outside of a specific request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformError {
    pub code: String,
    pub message: String,
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.code, self.message)
    }
}

/// Lifecycle notifications published by an execution venue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VenueEvent {
    PendingOrderCreated {
        order_id: String,
        label: String,
        volume: Decimal,
    },
    PositionOpened {
        label: String,
        net_profit: Decimal,
    },
    PositionClosed {
        label: String,
        net_profit: Decimal,
        /// Account balance after the close
        balance: Decimal,
    },
    Error(PlatformError),
}

type Handler = Arc<dyn Fn(&VenueEvent) + Send + Sync>;

/// Callback registry for venue events.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<Vec<Handler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every subsequent event.
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&VenueEvent) + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(Arc::new(handler));
    }

    /// Deliver `event` to all registered handlers.
    pub fn publish(&self, event: &VenueEvent) {
        // Snapshot so a handler may subscribe or publish without deadlocking.
        let handlers: Vec<Handler> = self
            .handlers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        for handler in handlers {
            handler(event);
        }
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handler_count())
            .finish()
    }
}
