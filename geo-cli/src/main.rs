//! GEO Sensor CLI
//!
//! Command-line interface for tracking GEO Sensor analysis jobs.

mod commands;
mod config;
mod render;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "geo-sensor")]
#[command(about = "GEO Sensor analysis job CLI", long_about = None)]
struct Cli {
    /// GEO Sensor API URL
    #[arg(long, env = "GEO_SENSOR_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// Bearer token for the API
    #[arg(long, env = "GEO_SENSOR_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so progress output on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geo_cli=info,geo_poller=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        api_url: cli.api_url,
        token: cli.token,
    };

    handle_command(cli.command, &config).await
}
