use clap::Parser;
use stocksim::cli::{Cli, Commands};
use stocksim::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    let _telemetry = stocksim::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("Starting background engines");
            args.execute(&config).await?;
        }
        Commands::Refresh(args) => {
            tracing::info!("Starting one-shot refresh");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Provider: {}", config.provider.base_url);
            println!("  Universe: {} tickers", config.universe.tickers.len());
            println!(
                "  Refresh: every {}s, stale after {}h, {}d lookback",
                config.refresh.interval_secs,
                config.refresh.staleness_hours,
                config.refresh.lookback_days
            );
            println!(
                "  Simulation: every {}s, max step {}",
                config.simulation.tick_secs, config.simulation.max_step
            );
        }
    }

    Ok(())
}
