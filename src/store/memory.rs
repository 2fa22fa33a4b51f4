//! In-memory store implementation
//!
//! Backs standalone runs and tests. Tables live behind a shared lock;
//! sessions stage their writes and apply them in one locked commit.

use super::{MarketStore, StoreError, StoreSession};
use crate::domain::{
    CompanyListing, CompanyProfile, FinancialReport, Order, OrderSide, OrderStatus, StockRecord,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    listings: Vec<CompanyListing>,
    profiles: Vec<CompanyProfile>,
    records: Vec<StockRecord>,
    reports: Vec<FinancialReport>,
    orders: Vec<Order>,
}

/// In-memory market store
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the ticker universe with (company name, ticker) pairs
    pub async fn seed_listings(&self, listings: &[(&str, &str)]) {
        let mut tables = self.tables.write().await;
        for (company_name, ticker) in listings {
            tables.listings.push(CompanyListing {
                id: Uuid::new_v4(),
                company_name: company_name.to_string(),
                ticker: ticker.to_string(),
            });
        }
    }

    /// Insert an order directly (bypasses session staging)
    pub async fn insert_order(&self, order: Order) {
        let mut tables = self.tables.write().await;
        tables.orders.push(order);
    }

    /// Insert a stock record directly (bypasses session staging)
    pub async fn insert_record_direct(&self, record: StockRecord) {
        let mut tables = self.tables.write().await;
        tables.records.push(record);
    }

    /// Number of committed stock records
    pub async fn record_count(&self) -> usize {
        self.tables.read().await.records.len()
    }

    /// Committed profile for a ticker, if any
    pub async fn profile(&self, ticker: &str) -> Option<CompanyProfile> {
        let tables = self.tables.read().await;
        tables.profiles.iter().find(|p| p.ticker == ticker).cloned()
    }

    /// Committed report for (ticker, label), if any
    pub async fn report(&self, ticker: &str, label: &str) -> Option<FinancialReport> {
        let tables = self.tables.read().await;
        tables
            .reports
            .iter()
            .find(|r| r.ticker == ticker && r.label == label)
            .cloned()
    }
}

#[async_trait]
impl MarketStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        Ok(Box::new(MemorySession {
            tables: self.tables.clone(),
            staged: Vec::new(),
        }))
    }
}

/// One staged write
#[derive(Debug, Clone)]
enum Mutation {
    InsertProfile(CompanyProfile),
    UpdateProfile(CompanyProfile),
    InsertRecord(StockRecord),
    InsertReport(FinancialReport),
    UpdateReport(FinancialReport),
}

struct MemorySession {
    tables: Arc<RwLock<Tables>>,
    staged: Vec<Mutation>,
}

impl MemorySession {
    /// Staged profile for a ticker, newest first
    fn staged_profile(&self, ticker: &str) -> Option<&CompanyProfile> {
        self.staged.iter().rev().find_map(|m| match m {
            Mutation::InsertProfile(p) | Mutation::UpdateProfile(p) if p.ticker == ticker => {
                Some(p)
            }
            _ => None,
        })
    }

    /// Staged report for (ticker, label), newest first
    fn staged_report(&self, ticker: &str, label: &str) -> Option<&FinancialReport> {
        self.staged.iter().rev().find_map(|m| match m {
            Mutation::InsertReport(r) | Mutation::UpdateReport(r)
                if r.ticker == ticker && r.label == label =>
            {
                Some(r)
            }
            _ => None,
        })
    }

    fn staged_has_record(&self, ticker: &str, date: DateTime<Utc>) -> bool {
        self.staged.iter().any(|m| match m {
            Mutation::InsertRecord(r) => r.ticker == ticker && r.date == date,
            _ => false,
        })
    }
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn tickers(&self) -> Result<Vec<String>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.listings.iter().map(|l| l.ticker.clone()).collect())
    }

    async fn tracked_tickers(&self) -> Result<Vec<String>, StoreError> {
        let tables = self.tables.read().await;
        let mut tracked: Vec<String> = tables.profiles.iter().map(|p| p.ticker.clone()).collect();
        for mutation in &self.staged {
            if let Mutation::InsertProfile(p) = mutation {
                if !tracked.contains(&p.ticker) {
                    tracked.push(p.ticker.clone());
                }
            }
        }
        Ok(tracked)
    }

    async fn latest_record_date(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let tables = self.tables.read().await;
        let committed = tables.records.iter().map(|r| r.date).max();
        let staged = self
            .staged
            .iter()
            .filter_map(|m| match m {
                Mutation::InsertRecord(r) => Some(r.date),
                _ => None,
            })
            .max();
        Ok(committed.max(staged))
    }

    async fn find_profile(&self, ticker: &str) -> Result<Option<CompanyProfile>, StoreError> {
        if let Some(staged) = self.staged_profile(ticker) {
            return Ok(Some(staged.clone()));
        }
        let tables = self.tables.read().await;
        Ok(tables.profiles.iter().find(|p| p.ticker == ticker).cloned())
    }

    async fn insert_profile(&mut self, profile: CompanyProfile) -> Result<(), StoreError> {
        self.staged.push(Mutation::InsertProfile(profile));
        Ok(())
    }

    async fn update_profile(&mut self, profile: CompanyProfile) -> Result<(), StoreError> {
        self.staged.push(Mutation::UpdateProfile(profile));
        Ok(())
    }

    async fn has_record(&self, ticker: &str, date: DateTime<Utc>) -> Result<bool, StoreError> {
        if self.staged_has_record(ticker, date) {
            return Ok(true);
        }
        let tables = self.tables.read().await;
        Ok(tables
            .records
            .iter()
            .any(|r| r.ticker == ticker && r.date == date))
    }

    async fn insert_record(&mut self, record: StockRecord) -> Result<(), StoreError> {
        self.staged.push(Mutation::InsertRecord(record));
        Ok(())
    }

    async fn find_report(
        &self,
        ticker: &str,
        label: &str,
    ) -> Result<Option<FinancialReport>, StoreError> {
        if let Some(staged) = self.staged_report(ticker, label) {
            return Ok(Some(staged.clone()));
        }
        let tables = self.tables.read().await;
        Ok(tables
            .reports
            .iter()
            .find(|r| r.ticker == ticker && r.label == label)
            .cloned())
    }

    async fn insert_report(&mut self, report: FinancialReport) -> Result<(), StoreError> {
        self.staged.push(Mutation::InsertReport(report));
        Ok(())
    }

    async fn update_report(&mut self, report: FinancialReport) -> Result<(), StoreError> {
        self.staged.push(Mutation::UpdateReport(report));
        Ok(())
    }

    async fn pending_orders(
        &self,
        ticker: &str,
        side: OrderSide,
    ) -> Result<Vec<Order>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .orders
            .iter()
            .filter(|o| o.ticker == ticker && o.side == side && o.status == OrderStatus::Pending)
            .cloned()
            .collect())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        for mutation in self.staged {
            match mutation {
                Mutation::InsertProfile(profile) => {
                    if tables.profiles.iter().any(|p| p.ticker == profile.ticker) {
                        return Err(StoreError::Conflict(format!(
                            "profile for {}",
                            profile.ticker
                        )));
                    }
                    tables.profiles.push(profile);
                }
                Mutation::UpdateProfile(profile) => {
                    match tables
                        .profiles
                        .iter_mut()
                        .find(|p| p.ticker == profile.ticker)
                    {
                        Some(existing) => *existing = profile,
                        None => tables.profiles.push(profile),
                    }
                }
                Mutation::InsertRecord(record) => {
                    if tables
                        .records
                        .iter()
                        .any(|r| r.ticker == record.ticker && r.date == record.date)
                    {
                        return Err(StoreError::Conflict(format!(
                            "record for {} at {}",
                            record.ticker, record.date
                        )));
                    }
                    tables.records.push(record);
                }
                Mutation::InsertReport(report) => {
                    if tables
                        .reports
                        .iter()
                        .any(|r| r.ticker == report.ticker && r.label == report.label)
                    {
                        return Err(StoreError::Conflict(format!(
                            "report for {} / {}",
                            report.ticker, report.label
                        )));
                    }
                    tables.reports.push(report);
                }
                Mutation::UpdateReport(report) => {
                    match tables
                        .reports
                        .iter_mut()
                        .find(|r| r.ticker == report.ticker && r.label == report.label)
                    {
                        Some(existing) => *existing = report,
                        None => tables.reports.push(report),
                    }
                }
            }
        }

        Ok(())
    }
}
