//! Refresh scheduling loop

use super::{ReconciliationEngine, ReconcileSummary};
use crate::config::RefreshConfig;
use crate::store::MarketStore;
use crate::telemetry::{self, CounterMetric, LatencyMetric};
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;

/// Command channel depth for manual refresh requests
const COMMAND_BUFFER: usize = 8;

/// Request for an immediate refresh pass, skipping the staleness check
struct RefreshCommand {
    reply: oneshot::Sender<bool>,
}

/// Handle for requesting refreshes from outside the scheduler task
#[derive(Clone)]
pub struct RefreshHandle {
    tx: mpsc::Sender<RefreshCommand>,
}

impl RefreshHandle {
    /// Run a full refresh pass now; true when every ticker merged cleanly
    pub async fn trigger_now(&self) -> anyhow::Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(RefreshCommand { reply })
            .await
            .map_err(|_| anyhow::anyhow!("Refresh scheduler is not running"))?;
        rx.await
            .map_err(|_| anyhow::anyhow!("Refresh scheduler dropped the request"))
    }
}

/// Periodic staleness-checked refresh loop
///
/// Each interval tick decides whether a pass is due (stale data or tickers
/// with no profile yet) and skips otherwise. Passes never overlap: a tick
/// that arrives while a pass is running is dropped, and manual triggers
/// queue behind the running pass.
pub struct RefreshScheduler {
    config: RefreshConfig,
    store: Arc<dyn MarketStore>,
    engine: ReconciliationEngine,
    commands: mpsc::Receiver<RefreshCommand>,
}

impl RefreshScheduler {
    pub fn new(
        config: RefreshConfig,
        store: Arc<dyn MarketStore>,
        engine: ReconciliationEngine,
    ) -> (Self, RefreshHandle) {
        let (tx, commands) = mpsc::channel(COMMAND_BUFFER);
        (
            Self {
                config,
                store,
                engine,
                commands,
            },
            RefreshHandle { tx },
        )
    }

    /// Run the refresh loop until the stop signal flips
    ///
    /// The first staleness check runs immediately at startup.
    pub async fn run(mut self, mut stop: watch::Receiver<bool>) {
        tracing::info!(
            interval_secs = self.config.interval_secs,
            staleness_hours = self.config.staleness_hours,
            "Data refresh engine is starting"
        );

        let mut interval = tokio::time::interval(Duration::from_secs(self.config.interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.run_if_due(&stop).await {
                        tracing::error!(error = %e, "Error in scheduled refresh");
                    }
                }
                Some(command) = self.commands.recv() => {
                    let clean = match self.force_run(&stop).await {
                        Ok(clean) => clean,
                        Err(e) => {
                            tracing::error!(error = %e, "Error in manual refresh");
                            false
                        }
                    };
                    // Caller may have stopped waiting; nothing to do then
                    let _ = command.reply.send(clean);
                }
                _ = stop.changed() => {
                    if *stop.borrow() {
                        tracing::info!("Data refresh engine is stopping gracefully");
                        break;
                    }
                }
            }
        }

        tracing::info!("Data refresh engine has stopped");
    }

    /// Run a pass when the stored data warrants one
    ///
    /// A pass is due when the newest stock record is older than the
    /// staleness window (or absent entirely), or when the universe holds
    /// tickers that have no company profile yet. A due pass always covers
    /// the full universe.
    pub async fn run_if_due(&self, stop: &watch::Receiver<bool>) -> anyhow::Result<bool> {
        let session = self.store.begin().await?;
        let tickers = session.tickers().await?;
        let tracked: HashSet<String> = session.tracked_tickers().await?.into_iter().collect();
        let latest = session.latest_record_date().await?;
        drop(session);

        if tickers.is_empty() {
            tracing::warn!("No ticker symbols in the universe, skipping refresh");
            return Ok(true);
        }

        let now = Utc::now();
        let stale = match latest {
            Some(latest) => now - latest >= ChronoDuration::hours(self.config.staleness_hours),
            None => true,
        };
        let untracked: Vec<&String> = tickers.iter().filter(|t| !tracked.contains(*t)).collect();

        if stale {
            tracing::info!(
                latest_record = ?latest,
                "Stock data is stale, refreshing all tickers"
            );
        } else if !untracked.is_empty() {
            tracing::info!(
                count = untracked.len(),
                "Universe has untracked tickers, refreshing all tickers"
            );
        } else {
            tracing::debug!("Stock data is up to date, skipping refresh");
            return Ok(true);
        }

        let summary = self.refresh_all(&tickers, stop).await?;
        Ok(summary.succeeded == summary.attempted)
    }

    /// Run a pass unconditionally over the full universe
    pub async fn force_run(&self, stop: &watch::Receiver<bool>) -> anyhow::Result<bool> {
        let session = self.store.begin().await?;
        let tickers = session.tickers().await?;
        drop(session);

        if tickers.is_empty() {
            tracing::warn!("No ticker symbols in the universe, nothing to refresh");
            return Ok(true);
        }

        let summary = self.refresh_all(&tickers, stop).await?;
        Ok(summary.succeeded == summary.attempted)
    }

    async fn refresh_all(
        &self,
        tickers: &[String],
        stop: &watch::Receiver<bool>,
    ) -> anyhow::Result<ReconcileSummary> {
        let started = Instant::now();
        let summary = self.engine.reconcile_all(tickers, stop).await?;

        telemetry::increment(CounterMetric::RefreshPasses, 1);
        telemetry::record_latency(LatencyMetric::RefreshPass, started.elapsed());
        Ok(summary)
    }
}
