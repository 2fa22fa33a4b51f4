//! Shared quote snapshot board

use crate::domain::QuoteSnapshot;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Concurrent map of per-ticker quote snapshots
///
/// The only mutable state shared between the background engines. Upserts
/// replace the previous snapshot wholesale; snapshots are never persisted.
#[derive(Clone, Default)]
pub struct QuoteBoard {
    quotes: Arc<RwLock<HashMap<String, QuoteSnapshot>>>,
}

impl QuoteBoard {
    /// Create an empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace (or create) the snapshot for a ticker
    pub async fn upsert(&self, snapshot: QuoteSnapshot) {
        let mut quotes = self.quotes.write().await;
        quotes.insert(snapshot.ticker.clone(), snapshot);
    }

    /// Snapshot for one ticker, if present
    pub async fn get(&self, ticker: &str) -> Option<QuoteSnapshot> {
        let quotes = self.quotes.read().await;
        quotes.get(ticker).cloned()
    }

    /// Clone of every snapshot currently on the board
    pub async fn all(&self) -> Vec<QuoteSnapshot> {
        let quotes = self.quotes.read().await;
        quotes.values().cloned().collect()
    }

    /// Overwrite one snapshot's price and timestamp in place
    pub async fn set_price(&self, ticker: &str, price: Decimal, timestamp: DateTime<Utc>) {
        let mut quotes = self.quotes.write().await;
        if let Some(snapshot) = quotes.get_mut(ticker) {
            snapshot.last_price = Some(price);
            snapshot.updated_at = timestamp;
        }
    }

    /// Current price per ticker, for tickers that have one
    pub async fn current_prices(&self) -> HashMap<String, Decimal> {
        let quotes = self.quotes.read().await;
        quotes
            .iter()
            .filter_map(|(ticker, q)| q.last_price.map(|p| (ticker.clone(), p)))
            .collect()
    }

    /// Number of snapshots on the board
    pub async fn len(&self) -> usize {
        self.quotes.read().await.len()
    }

    /// Whether the board holds no snapshots
    pub async fn is_empty(&self) -> bool {
        self.quotes.read().await.is_empty()
    }
}
