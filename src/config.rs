//! Configuration types for stocksim

use rust_decimal::Decimal;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub universe: UniverseConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    pub telemetry: TelemetryConfig,
}

/// Market-data provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the quote provider API
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

fn default_provider_timeout() -> u64 {
    10
}

/// Seed list for the ticker universe
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UniverseConfig {
    /// Tickers seeded into the listing table at startup
    #[serde(default)]
    pub tickers: Vec<String>,
}

/// Data-refresh scheduling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Seconds between refresh checks
    #[serde(default = "default_refresh_interval")]
    pub interval_secs: u64,

    /// Hours after which the newest stock record counts as stale
    #[serde(default = "default_staleness_hours")]
    pub staleness_hours: i64,

    /// Trailing window of daily bars to fetch per ticker
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
}

fn default_refresh_interval() -> u64 {
    3600
}
fn default_staleness_hours() -> i64 {
    24
}
fn default_lookback_days() -> i64 {
    365
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            staleness_hours: 24,
            lookback_days: 365,
        }
    }
}

/// Price-simulation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// Seconds between simulation ticks
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,

    /// Net order volume at which the volume factor saturates
    #[serde(default = "default_max_expected_volume")]
    pub max_expected_volume: i64,

    /// Upper bound of the uniform random price step
    #[serde(default = "default_max_step")]
    pub max_step: Decimal,
}

fn default_tick_secs() -> u64 {
    10
}
fn default_max_expected_volume() -> i64 {
    10_000
}
fn default_max_step() -> Decimal {
    Decimal::new(5, 0)
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_secs: 10,
            max_expected_volume: 10_000,
            max_step: Decimal::new(5, 0),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub metrics_port: u16,
    pub log_level: String,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
