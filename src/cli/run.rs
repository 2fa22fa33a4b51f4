//! Run command implementation

use crate::broadcast::{PriceBroadcaster, PriceHub};
use crate::config::Config;
use crate::provider::{MarketDataProvider, RestProvider, RestProviderConfig};
use crate::refresh::{ReconciliationEngine, RefreshScheduler};
use crate::sim::{
    PressureModel, PriceStrategy, QuoteBoard, SimulationScheduler, StepSource, ThreadRngStep,
};
use crate::store::{MarketStore, MemoryStore};
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Args, Debug)]
pub struct RunArgs {}

impl RunArgs {
    /// Wire the engines together and run until Ctrl+C
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let memory = MemoryStore::new();
        let listings: Vec<(&str, &str)> = config
            .universe
            .tickers
            .iter()
            .map(|t| (t.as_str(), t.as_str()))
            .collect();
        memory.seed_listings(&listings).await;
        tracing::info!(tickers = listings.len(), "Seeded ticker universe");

        let store: Arc<dyn MarketStore> = Arc::new(memory);
        let provider: Arc<dyn MarketDataProvider> = Arc::new(RestProvider::new(
            RestProviderConfig::from_config(&config.provider),
        ));
        let broadcaster: Arc<dyn PriceBroadcaster> = Arc::new(PriceHub::new());
        let strategy: Arc<dyn PriceStrategy> =
            Arc::new(PressureModel::new(config.simulation.max_step));
        let steps: Arc<dyn StepSource> = Arc::new(ThreadRngStep);
        let board = QuoteBoard::new();

        let engine =
            ReconciliationEngine::new(provider.clone(), store.clone(), config.refresh.lookback_days);
        let (refresh, refresh_handle) =
            RefreshScheduler::new(config.refresh.clone(), store.clone(), engine);
        let simulation = SimulationScheduler::new(
            config.simulation.clone(),
            store,
            provider,
            board,
            broadcaster,
            strategy,
            steps,
        );

        let (stop_tx, stop_rx) = watch::channel(false);
        let refresh_task = tokio::spawn(refresh.run(stop_rx.clone()));
        let simulation_task = tokio::spawn(simulation.run(stop_rx));

        // Keep the manual-trigger handle alive for the lifetime of the run
        let _refresh_handle = refresh_handle;

        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown signal received, stopping engines");
        stop_tx.send(true)?;

        refresh_task.await?;
        simulation_task.await?;
        tracing::info!("All engines stopped");
        Ok(())
    }
}
