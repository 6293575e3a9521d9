//! rpc-resilience command line
//!
//! ```text
//!   check-config <path>     parse and validate a client config file
//!   probe [--config <path>] connect to every configured service and report health
//! ```
//!
//! The binary is the only place where logging and the metrics exporter are
//! installed.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use rpc_resilience::config::{load_config, ClientConfig};
use rpc_resilience::observability::{logging, metrics};
use rpc_resilience::transport::ReachabilityConnector;
use rpc_resilience::UnifiedFacade;

#[derive(Parser)]
#[command(name = "rpc-resilience")]
#[command(about = "Resilient client for the simulation and data-management services", long_about = None)]
struct Cli {
    /// Log level when RUST_LOG is not set (overrides the config file)
    #[arg(long)]
    log_level: Option<String>,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    metrics_address: Option<SocketAddr>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a config file
    CheckConfig { path: PathBuf },
    /// Connect to every service and report its health
    Probe {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.command {
        Commands::CheckConfig { path } => load_config(path),
        Commands::Probe { config: Some(path) } => load_config(path),
        Commands::Probe { config: None } => Ok(ClientConfig::default()),
    };

    let level = cli.log_level.clone().unwrap_or_else(|| match &config {
        Ok(config) => config.observability.log_level.clone(),
        Err(_) => "info".to_string(),
    });
    logging::init_logging(&level);

    let config = config?;

    let metrics_address = match cli.metrics_address {
        Some(addr) => Some(addr),
        None if config.observability.metrics_enabled => {
            Some(config.observability.metrics_address.parse::<SocketAddr>()?)
        }
        None => None,
    };
    if let Some(addr) = metrics_address {
        metrics::init_metrics(addr);
    }

    match cli.command {
        Commands::CheckConfig { path } => {
            tracing::info!(path = %path.display(), "Configuration is valid");
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Probe { .. } => probe(&config).await?,
    }

    Ok(())
}

async fn probe(config: &ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let facade = UnifiedFacade::from_config(
        config,
        ReachabilityConnector::new(config.simulation.channel.clone()),
        ReachabilityConnector::new(config.data.channel.clone()),
    )?;

    let connect = facade.connect_all_report().await;
    let health = facade.ping_all().await;
    facade.close_all().await;

    let failed: Vec<_> = connect
        .failed
        .iter()
        .map(|(name, e)| json!({ "service": name, "kind": e.kind(), "error": e.message() }))
        .collect();
    let report = json!({
        "connected": connect.succeeded,
        "failed": failed,
        "health": health,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    if connect.is_complete() {
        Ok(())
    } else {
        Err(format!("unreachable: {}", connect.failed_names().join(", ")).into())
    }
}
