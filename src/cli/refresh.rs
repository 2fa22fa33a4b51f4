//! Refresh command implementation

use crate::config::Config;
use crate::provider::{MarketDataProvider, RestProvider, RestProviderConfig};
use crate::refresh::{ReconciliationEngine, RefreshScheduler};
use crate::store::{MarketStore, MemoryStore};
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct RefreshArgs {}

impl RefreshArgs {
    /// Run one forced reconciliation pass over the configured universe
    ///
    /// Exits non-zero when any ticker failed to merge cleanly.
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let memory = MemoryStore::new();
        let listings: Vec<(&str, &str)> = config
            .universe
            .tickers
            .iter()
            .map(|t| (t.as_str(), t.as_str()))
            .collect();
        memory.seed_listings(&listings).await;

        let store: Arc<dyn MarketStore> = Arc::new(memory);
        let provider: Arc<dyn MarketDataProvider> = Arc::new(RestProvider::new(
            RestProviderConfig::from_config(&config.provider),
        ));
        let engine =
            ReconciliationEngine::new(provider, store.clone(), config.refresh.lookback_days);
        let (scheduler, _handle) = RefreshScheduler::new(config.refresh.clone(), store, engine);

        let (_stop_tx, stop_rx) = watch::channel(false);
        let clean = scheduler.force_run(&stop_rx).await?;

        if !clean {
            anyhow::bail!("Refresh completed with errors");
        }
        println!("Refresh completed");
        Ok(())
    }
}
