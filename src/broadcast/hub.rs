//! Broadcast hub implementation

use super::{group_key, PriceBroadcaster};
use crate::domain::PriceUpdate;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Default per-group channel capacity
const DEFAULT_GROUP_CAPACITY: usize = 256;

/// Fans price updates out to per-ticker subscriber groups
///
/// Groups are created lazily on first subscription or publish; dropping
/// every receiver of a group simply makes later publishes no-ops.
pub struct PriceHub {
    groups: Arc<RwLock<HashMap<String, broadcast::Sender<PriceUpdate>>>>,
    capacity: usize,
}

impl PriceHub {
    /// Create a new hub with default group capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_GROUP_CAPACITY)
    }

    /// Create a new hub with a custom per-group capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            groups: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Join a ticker's subscriber group
    pub async fn subscribe(&self, ticker: &str) -> broadcast::Receiver<PriceUpdate> {
        let key = group_key(ticker);
        let mut groups = self.groups.write().await;
        groups
            .entry(key)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of active subscriber groups
    pub async fn group_count(&self) -> usize {
        self.groups.read().await.len()
    }
}

impl Default for PriceHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceBroadcaster for PriceHub {
    async fn publish(&self, ticker: &str, update: PriceUpdate) -> anyhow::Result<()> {
        let key = group_key(ticker);
        let groups = self.groups.read().await;

        if let Some(sender) = groups.get(&key) {
            // A send error only means every receiver has left the group
            if sender.send(update).is_err() {
                tracing::debug!(ticker, "No subscribers for price update");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn update(ticker: &str) -> PriceUpdate {
        PriceUpdate {
            ticker: ticker.to_string(),
            price: dec!(100.012),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_update() {
        let hub = PriceHub::new();
        let mut rx = hub.subscribe("ACME").await;

        hub.publish("ACME", update("ACME")).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.ticker, "ACME");
        assert_eq!(received.price, dec!(100.012));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_noop() {
        let hub = PriceHub::new();
        let result = hub.publish("ACME", update("ACME")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_groups_are_isolated_per_ticker() {
        let hub = PriceHub::new();
        let mut acme_rx = hub.subscribe("ACME").await;
        let mut globo_rx = hub.subscribe("GLOBO").await;

        hub.publish("ACME", update("ACME")).await.unwrap();

        assert_eq!(acme_rx.recv().await.unwrap().ticker, "ACME");
        assert!(globo_rx.try_recv().is_err());
        assert_eq!(hub.group_count().await, 2);
    }

    #[tokio::test]
    async fn test_dropped_subscriber_does_not_fail_publish() {
        let hub = PriceHub::new();
        let rx = hub.subscribe("ACME").await;
        drop(rx);

        let result = hub.publish("ACME", update("ACME")).await;
        assert!(result.is_ok());
    }
}
