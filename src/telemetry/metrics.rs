//! Prometheus metrics

use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Completed refresh passes
    RefreshPasses,
    /// Stock records inserted
    RecordsInserted,
    /// Financial reports inserted
    ReportsInserted,
    /// Financial reports updated
    ReportsUpdated,
    /// Quote snapshots refreshed
    QuotesRefreshed,
    /// Price updates broadcast
    PriceUpdates,
}

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Full reconciliation pass duration
    RefreshPass,
    /// Simulation tick duration
    SimulationTick,
}

/// Increment a counter
pub fn increment(metric: CounterMetric, value: u64) {
    let metric_name = match metric {
        CounterMetric::RefreshPasses => "stocksim_refresh_passes_total",
        CounterMetric::RecordsInserted => "stocksim_records_inserted_total",
        CounterMetric::ReportsInserted => "stocksim_reports_inserted_total",
        CounterMetric::ReportsUpdated => "stocksim_reports_updated_total",
        CounterMetric::QuotesRefreshed => "stocksim_quotes_refreshed_total",
        CounterMetric::PriceUpdates => "stocksim_price_updates_total",
    };

    metrics::counter!(metric_name).increment(value);
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::RefreshPass => "stocksim_refresh_pass_duration_ms",
        LatencyMetric::SimulationTick => "stocksim_simulation_tick_duration_ms",
    };

    metrics::histogram!(metric_name).record(duration.as_millis() as f64);
}
