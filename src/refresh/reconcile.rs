//! Provider-to-store reconciliation

use crate::domain::{CompanyProfile, FinancialFigures, FinancialReport, StockRecord};
use crate::provider::MarketDataProvider;
use crate::store::{MarketStore, StoreSession};
use crate::telemetry::{self, CounterMetric};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Tickers the pass reached before finishing or being stopped
    pub attempted: usize,
    /// Tickers whose profile, records and reports all merged cleanly
    pub succeeded: usize,
}

/// Merges provider data into the store, ticker by ticker
///
/// One pass opens a single store session, stages every change and commits
/// once at the end. A stop signal ends the per-ticker loop early but the
/// work staged so far is still committed.
pub struct ReconciliationEngine {
    provider: Arc<dyn MarketDataProvider>,
    store: Arc<dyn MarketStore>,
    lookback_days: i64,
}

impl ReconciliationEngine {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        store: Arc<dyn MarketStore>,
        lookback_days: i64,
    ) -> Self {
        Self {
            provider,
            store,
            lookback_days,
        }
    }

    /// Reconcile every given ticker in one committed pass
    pub async fn reconcile_all(
        &self,
        tickers: &[String],
        stop: &watch::Receiver<bool>,
    ) -> anyhow::Result<ReconcileSummary> {
        let mut session = self.store.begin().await?;
        let mut summary = ReconcileSummary {
            attempted: 0,
            succeeded: 0,
        };

        for ticker in tickers {
            if *stop.borrow() {
                tracing::info!(
                    attempted = summary.attempted,
                    "Refresh cancelled, committing completed work"
                );
                break;
            }

            summary.attempted += 1;
            if self.reconcile_ticker(session.as_mut(), ticker).await {
                summary.succeeded += 1;
            }
        }

        session.commit().await?;
        tracing::info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            "Reconciliation pass committed"
        );
        Ok(summary)
    }

    /// Reconcile one ticker; true when every substep merged cleanly
    ///
    /// Substep failures are logged and do not abort the pass: the other
    /// substeps and the remaining tickers still run.
    pub async fn reconcile_ticker(&self, session: &mut dyn StoreSession, ticker: &str) -> bool {
        tracing::debug!(ticker, "Reconciling ticker");
        let mut clean = true;

        if let Err(e) = self.sync_profile(session, ticker).await {
            tracing::error!(ticker, error = %e, "Error syncing company profile");
            clean = false;
        }

        if let Err(e) = self.sync_records(session, ticker).await {
            tracing::error!(ticker, error = %e, "Error syncing stock records");
            clean = false;
        }

        if let Err(e) = self.sync_reports(session, ticker).await {
            tracing::error!(ticker, error = %e, "Error syncing financial reports");
            clean = false;
        }

        clean
    }

    /// Insert or fully overwrite the company profile
    async fn sync_profile(
        &self,
        session: &mut dyn StoreSession,
        ticker: &str,
    ) -> anyhow::Result<()> {
        let Some(fetched) = self.provider.get_profile(ticker).await? else {
            tracing::debug!(ticker, "Provider has no profile");
            return Ok(());
        };

        match session.find_profile(ticker).await? {
            Some(existing) => {
                session
                    .update_profile(CompanyProfile {
                        id: existing.id,
                        ticker: ticker.to_string(),
                        address: fetched.address,
                        phone: fetched.phone,
                        website: fetched.website,
                        sector: fetched.sector,
                        industry: fetched.industry,
                        employee_count: fetched.employee_count,
                        description: fetched.description,
                    })
                    .await?;
                tracing::debug!(ticker, "Company profile updated");
            }
            None => {
                session
                    .insert_profile(CompanyProfile {
                        id: Uuid::new_v4(),
                        ticker: ticker.to_string(),
                        address: fetched.address,
                        phone: fetched.phone,
                        website: fetched.website,
                        sector: fetched.sector,
                        industry: fetched.industry,
                        employee_count: fetched.employee_count,
                        description: fetched.description,
                    })
                    .await?;
                tracing::info!(ticker, "Company profile added");
            }
        }
        Ok(())
    }

    /// Insert the missing daily bars from the trailing lookback window
    ///
    /// Bars without a date or without a positive close are dropped; bars
    /// whose (ticker, date) already exists are left untouched.
    async fn sync_records(
        &self,
        session: &mut dyn StoreSession,
        ticker: &str,
    ) -> anyhow::Result<()> {
        let end = Utc::now();
        let start = end - Duration::days(self.lookback_days);
        let bars = self.provider.get_daily_bars(ticker, start, end).await?;

        let mut inserted = 0u64;
        for bar in bars {
            let Some(date) = bar.date else {
                continue;
            };
            let close = match bar.close {
                Some(close) if close > Decimal::ZERO => close,
                _ => continue,
            };
            if session.has_record(ticker, date).await? {
                continue;
            }

            session
                .insert_record(StockRecord {
                    id: Uuid::new_v4(),
                    ticker: ticker.to_string(),
                    date,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: Some(close),
                    adjusted_close: bar.adjusted_close,
                    volume: bar.volume,
                })
                .await?;
            inserted += 1;
        }

        if inserted > 0 {
            telemetry::increment(CounterMetric::RecordsInserted, inserted);
            tracing::info!(ticker, inserted, "Stock records added");
        }
        Ok(())
    }

    /// Insert new financial reports and overwrite materially changed ones
    ///
    /// A report is overwritten only when total revenue, net income or
    /// basic EPS differ from the stored figures. Failures on one label do
    /// not block the others.
    async fn sync_reports(
        &self,
        session: &mut dyn StoreSession,
        ticker: &str,
    ) -> anyhow::Result<()> {
        let financials = self.provider.get_financials(ticker).await?;

        for (label, figures) in financials {
            if let Err(e) = self.merge_report(session, ticker, &label, figures).await {
                tracing::error!(ticker, label = %label, error = %e, "Error merging financial report");
            }
        }
        Ok(())
    }

    async fn merge_report(
        &self,
        session: &mut dyn StoreSession,
        ticker: &str,
        label: &str,
        figures: FinancialFigures,
    ) -> anyhow::Result<()> {
        match session.find_report(ticker, label).await? {
            Some(existing) => {
                if existing.figures.material_fields_differ(&figures) {
                    session
                        .update_report(FinancialReport {
                            id: existing.id,
                            ticker: ticker.to_string(),
                            label: label.to_string(),
                            figures,
                        })
                        .await?;
                    telemetry::increment(CounterMetric::ReportsUpdated, 1);
                    tracing::info!(ticker, label, "Financial report updated");
                }
            }
            None => {
                session
                    .insert_report(FinancialReport {
                        id: Uuid::new_v4(),
                        ticker: ticker.to_string(),
                        label: label.to_string(),
                        figures,
                    })
                    .await?;
                telemetry::increment(CounterMetric::ReportsInserted, 1);
                tracing::info!(ticker, label, "Financial report added");
            }
        }
        Ok(())
    }
}
