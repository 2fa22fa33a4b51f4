//! Shared test fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use stocksim::domain::{FinancialFigures, Order, OrderSide, OrderStatus};
use stocksim::provider::{DailyBar, FetchedProfile, FetchedQuote, MarketDataProvider};
use uuid::Uuid;

/// Scripted provider returning canned responses
#[derive(Default)]
pub struct MockProvider {
    pub profiles: HashMap<String, FetchedProfile>,
    pub bars: HashMap<String, Vec<DailyBar>>,
    pub financials: HashMap<String, HashMap<String, FinancialFigures>>,
    pub quotes: Vec<FetchedQuote>,
    pub bar_calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn get_profile(&self, ticker: &str) -> anyhow::Result<Option<FetchedProfile>> {
        Ok(self.profiles.get(ticker).cloned())
    }

    async fn get_daily_bars(
        &self,
        ticker: &str,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<DailyBar>> {
        self.bar_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.bars.get(ticker).cloned().unwrap_or_default())
    }

    async fn get_financials(
        &self,
        ticker: &str,
    ) -> anyhow::Result<HashMap<String, FinancialFigures>> {
        Ok(self.financials.get(ticker).cloned().unwrap_or_default())
    }

    async fn get_quotes(&self, _tickers: &[String]) -> anyhow::Result<Vec<FetchedQuote>> {
        Ok(self.quotes.clone())
    }
}

pub fn fetched_profile(sector: &str) -> FetchedProfile {
    FetchedProfile {
        address: Some("1 Main St".to_string()),
        phone: None,
        website: None,
        sector: Some(sector.to_string()),
        industry: Some("Software".to_string()),
        employee_count: Some(5000),
        description: None,
    }
}

pub fn bar(days_ago: i64, close: Option<Decimal>) -> DailyBar {
    DailyBar {
        date: Some(Utc::now() - Duration::days(days_ago)),
        open: Some(dec!(99)),
        high: Some(dec!(103)),
        low: Some(dec!(98)),
        close,
        adjusted_close: close,
        volume: Some(1_000_000),
    }
}

pub fn figures(revenue: Decimal, net_income: Decimal, eps: Decimal) -> FinancialFigures {
    FinancialFigures {
        total_revenue: Some(revenue),
        net_income_common: Some(net_income),
        basic_eps: Some(eps),
        ..Default::default()
    }
}

pub fn quote(symbol: Option<&str>, price: Decimal) -> FetchedQuote {
    FetchedQuote {
        symbol: symbol.map(str::to_string),
        last_price: Some(price),
        high_52w: Some(dec!(120)),
        low_52w: Some(dec!(90)),
        volume: Some(42_000),
    }
}

pub fn order(ticker: &str, side: OrderSide, quantity: i64, price: Decimal) -> Order {
    Order {
        id: Uuid::new_v4(),
        ticker: ticker.to_string(),
        side,
        quantity,
        price,
        status: OrderStatus::Pending,
        created_at: Utc::now(),
        executed_at: None,
        remaining_quantity: None,
    }
}
