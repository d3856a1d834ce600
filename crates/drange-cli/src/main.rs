mod commands;

use std::sync::Arc;

use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use drange_catalog::FeedClient;
use drange_engine::{DeliveryRangeService, EngineSettings};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "drange-cli")]
#[command(about = "Delivery-range catalog command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the catalog feed and rebuild every stored index
    Preprocess,
    /// List the restaurants that deliver to a location
    Query {
        /// Latitude of the delivery location
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude of the delivery location
        #[arg(long, allow_hyphen_values = true)]
        long: f64,
        /// Clock time on the catalog clock (HH:MM); defaults to now
        #[arg(long, value_parser = commands::parse_clock_arg)]
        at: Option<NaiveTime>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = drange_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = drange_store::connect_store(&config).await?;
    let source = Arc::new(FeedClient::from_app_config(&config)?);
    let service =
        DeliveryRangeService::new(source, store, EngineSettings::from_app_config(&config));

    match cli.command {
        Commands::Preprocess => commands::run_preprocess(&service).await,
        Commands::Query { lat, long, at } => commands::run_query(&service, lat, long, at).await,
    }
}
