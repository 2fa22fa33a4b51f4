//! Persistence contracts
//!
//! Access is session-scoped: each reconciliation pass and each order-book
//! query opens its own short-lived session. Writes are staged on the
//! session and applied atomically by `commit` (one save point per pass);
//! dropping a session without committing discards staged work.

mod memory;

pub use memory::MemoryStore;

use crate::domain::{CompanyProfile, FinancialReport, Order, OrderSide, StockRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Persistence errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique key already holds a row
    #[error("Duplicate key: {0}")]
    Conflict(String),
    /// The backing store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Factory for short-lived store sessions
#[async_trait]
pub trait MarketStore: Send + Sync {
    /// Open a session scoped to one operation
    async fn begin(&self) -> Result<Box<dyn StoreSession>, StoreError>;
}

/// One unit of work against the store
///
/// Reads observe committed state plus this session's own staged writes.
#[async_trait]
pub trait StoreSession: Send {
    /// All tickers in the universe
    async fn tickers(&self) -> Result<Vec<String>, StoreError>;

    /// Tickers that already have a company profile
    async fn tracked_tickers(&self) -> Result<Vec<String>, StoreError>;

    /// Date of the newest stock record across all tickers
    async fn latest_record_date(&self) -> Result<Option<DateTime<Utc>>, StoreError>;

    /// Look up the profile for a ticker
    async fn find_profile(&self, ticker: &str) -> Result<Option<CompanyProfile>, StoreError>;

    /// Stage a new profile
    async fn insert_profile(&mut self, profile: CompanyProfile) -> Result<(), StoreError>;

    /// Stage a full overwrite of an existing profile
    async fn update_profile(&mut self, profile: CompanyProfile) -> Result<(), StoreError>;

    /// Whether a record exists for (ticker, date)
    async fn has_record(&self, ticker: &str, date: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Stage a new stock record
    async fn insert_record(&mut self, record: StockRecord) -> Result<(), StoreError>;

    /// Look up the report for (ticker, label)
    async fn find_report(
        &self,
        ticker: &str,
        label: &str,
    ) -> Result<Option<FinancialReport>, StoreError>;

    /// Stage a new financial report
    async fn insert_report(&mut self, report: FinancialReport) -> Result<(), StoreError>;

    /// Stage a full overwrite of an existing report
    async fn update_report(&mut self, report: FinancialReport) -> Result<(), StoreError>;

    /// All Pending orders for a ticker on one side of the book
    async fn pending_orders(
        &self,
        ticker: &str,
        side: OrderSide,
    ) -> Result<Vec<Order>, StoreError>;

    /// Apply all staged writes atomically
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
