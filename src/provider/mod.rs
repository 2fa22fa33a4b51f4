//! Market-data provider module
//!
//! Contract for the external quote provider: company profiles, historical
//! daily bars, financial statements and batched quotes. Absence (None or
//! an empty collection) is a valid non-error response meaning "nothing to
//! merge".

mod rest;

pub use rest::{RestProvider, RestProviderConfig};

use crate::domain::FinancialFigures;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Company profile as returned by the provider
#[derive(Debug, Clone, Default)]
pub struct FetchedProfile {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub employee_count: Option<i64>,
    pub description: Option<String>,
}

/// One daily OHLCV bar as returned by the provider
///
/// A bar without a date or without a positive close never reaches the
/// store; the reconciliation engine filters it out.
#[derive(Debug, Clone, Default)]
pub struct DailyBar {
    pub date: Option<DateTime<Utc>>,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Option<Decimal>,
    pub adjusted_close: Option<Decimal>,
    pub volume: Option<i64>,
}

/// One quote as returned by the provider's batched quote endpoint
#[derive(Debug, Clone, Default)]
pub struct FetchedQuote {
    pub symbol: Option<String>,
    pub last_price: Option<Decimal>,
    pub high_52w: Option<Decimal>,
    pub low_52w: Option<Decimal>,
    pub volume: Option<i64>,
}

/// Trait for market-data provider implementations
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the company profile; None when the provider has nothing
    async fn get_profile(&self, ticker: &str) -> anyhow::Result<Option<FetchedProfile>>;

    /// Fetch daily bars in the [start, end] window
    async fn get_daily_bars(
        &self,
        ticker: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<DailyBar>>;

    /// Fetch financial snapshots keyed by report label
    async fn get_financials(
        &self,
        ticker: &str,
    ) -> anyhow::Result<HashMap<String, FinancialFigures>>;

    /// Fetch quotes for all symbols in one batched call
    async fn get_quotes(&self, tickers: &[String]) -> anyhow::Result<Vec<FetchedQuote>>;
}
