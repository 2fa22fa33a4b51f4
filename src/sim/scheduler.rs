//! Simulation tick loop

use super::{BookPressure, PriceStrategy, QuoteBoard, StepSource};
use crate::broadcast::PriceBroadcaster;
use crate::config::SimulationConfig;
use crate::domain::{OrderSide, PriceUpdate, QuoteSnapshot};
use crate::provider::MarketDataProvider;
use crate::store::MarketStore;
use crate::telemetry::{self, CounterMetric, LatencyMetric};
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

/// Fixed-cadence price simulation engine
///
/// Every tick refreshes the quote board from the provider and recomputes
/// simulated prices from order-book pressure. Ticks are independent: a
/// failing tick is logged and the next one runs on schedule.
pub struct SimulationScheduler {
    config: SimulationConfig,
    store: Arc<dyn MarketStore>,
    provider: Arc<dyn MarketDataProvider>,
    board: QuoteBoard,
    broadcaster: Arc<dyn PriceBroadcaster>,
    strategy: Arc<dyn PriceStrategy>,
    steps: Arc<dyn StepSource>,
}

impl SimulationScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: SimulationConfig,
        store: Arc<dyn MarketStore>,
        provider: Arc<dyn MarketDataProvider>,
        board: QuoteBoard,
        broadcaster: Arc<dyn PriceBroadcaster>,
        strategy: Arc<dyn PriceStrategy>,
        steps: Arc<dyn StepSource>,
    ) -> Self {
        Self {
            config,
            store,
            provider,
            board,
            broadcaster,
            strategy,
            steps,
        }
    }

    /// Run the tick loop until the stop signal flips
    ///
    /// The first tick fires immediately. A tick that overruns the cadence
    /// never runs concurrently with the next one: late ticks are skipped.
    pub async fn run(self, mut stop: watch::Receiver<bool>) {
        tracing::info!("Price simulation engine is starting");

        let mut interval = tokio::time::interval(Duration::from_secs(self.config.tick_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let started = Instant::now();
                    self.run_tick().await;
                    telemetry::record_latency(LatencyMetric::SimulationTick, started.elapsed());
                }
                _ = stop.changed() => {
                    if *stop.borrow() {
                        tracing::info!("Price simulation engine is stopping gracefully");
                        break;
                    }
                }
            }
        }

        tracing::info!("Price simulation engine has stopped");
    }

    /// One simulation cycle: refresh quotes, then recompute prices
    ///
    /// Each phase contains its own failures so that a provider outage
    /// still lets the existing snapshots keep moving.
    pub async fn run_tick(&self) {
        tracing::debug!("Starting price simulation cycle");

        if let Err(e) = self.refresh_quotes().await {
            tracing::error!(error = %e, "Error refreshing quote snapshots");
        }

        self.recompute_prices().await;

        tracing::debug!("Price simulation cycle completed");
    }

    /// Pull quotes for the whole universe in one batched call and upsert
    /// them into the board
    pub async fn refresh_quotes(&self) -> anyhow::Result<()> {
        let session = self.store.begin().await?;
        let tickers = session.tickers().await?;
        drop(session);

        if tickers.is_empty() {
            tracing::warn!("No ticker symbols in the universe");
            return Ok(());
        }

        let quotes = self.provider.get_quotes(&tickers).await?;
        if quotes.is_empty() {
            tracing::warn!("No quotes returned from provider");
            return Ok(());
        }

        let mut refreshed = 0u64;
        for quote in quotes {
            let Some(symbol) = quote.symbol else {
                continue;
            };

            self.board
                .upsert(QuoteSnapshot {
                    ticker: symbol,
                    last_price: quote.last_price,
                    high_52w: quote.high_52w,
                    low_52w: quote.low_52w,
                    volume: quote.volume,
                    updated_at: Utc::now(),
                })
                .await;
            refreshed += 1;
        }

        telemetry::increment(CounterMetric::QuotesRefreshed, refreshed);
        let board_size = self.board.len().await;
        tracing::info!(refreshed, board_size, "Updated stock quote snapshots");
        Ok(())
    }

    /// Recompute the simulated price for every snapshot on the board
    pub async fn recompute_prices(&self) {
        tracing::debug!("Simulating price changes");

        for snapshot in self.board.all().await {
            if let Err(e) = self.simulate_ticker(&snapshot).await {
                tracing::error!(
                    ticker = %snapshot.ticker,
                    error = %e,
                    "Error computing simulated price"
                );
            }
        }
    }

    async fn simulate_ticker(&self, snapshot: &QuoteSnapshot) -> anyhow::Result<()> {
        let ticker = snapshot.ticker.as_str();

        let Some(base_price) = snapshot.last_price else {
            tracing::warn!(ticker, "No base price available, skipping");
            return Ok(());
        };

        // Short-lived session per order-book query
        let session = self.store.begin().await?;
        let buys = session.pending_orders(ticker, OrderSide::Buy).await?;
        let sells = session.pending_orders(ticker, OrderSide::Sell).await?;
        drop(session);

        let pressure =
            BookPressure::from_orders(&buys, &sells, self.config.max_expected_volume);
        tracing::debug!(
            ticker,
            net_volume = pressure.net_volume,
            direction = pressure.direction,
            volume_factor = %pressure.volume_factor,
            "Book pressure"
        );

        let Some(new_price) = self
            .strategy
            .next_price(snapshot, &pressure, self.steps.as_ref())
        else {
            return Ok(());
        };

        let timestamp = Utc::now();
        self.board.set_price(ticker, new_price, timestamp).await;

        // Fire-and-forget: a group with no subscribers is a no-op
        self.broadcaster
            .publish(
                ticker,
                PriceUpdate {
                    ticker: ticker.to_string(),
                    price: new_price,
                    timestamp,
                },
            )
            .await?;

        telemetry::increment(CounterMetric::PriceUpdates, 1);
        tracing::debug!(
            ticker,
            old_price = %base_price,
            new_price = %new_price,
            "Price update broadcast"
        );
        Ok(())
    }
}
