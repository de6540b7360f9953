//! Perk reward node — entry point.
//!
//! Wires the profile store, the settlement rail, and the reward engine
//! behind the HTTP API, with configuration from a TOML file or defaults.

mod api;
mod config;
mod state;
mod storage;

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use perk_rewards::{MemoryStore, ProfileStore, RewardEngine};
use perk_settlement::adapters::{InternalRail, RelayerRail};
use perk_settlement::{DeadlineRail, ITokenRail, RailRegistry};

use config::PerkConfig;
use state::AppState;
use storage::RocksStore;

/// Perk Reward Node
#[derive(Parser, Debug)]
#[command(name = "perk-node", version, about = "Perk reward issuance service")]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, default_value = "perk.toml")]
    config: PathBuf,

    /// Override the API port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Generate a default config file and exit.
    #[arg(long)]
    init: bool,
}

fn build_store(config: &PerkConfig) -> anyhow::Result<Arc<dyn ProfileStore>> {
    match config.storage.backend.as_str() {
        "memory" => {
            tracing::warn!("using the in-memory profile store: reward state will not survive restarts");
            Ok(Arc::new(MemoryStore::new()))
        }
        "rocks" => {
            let store = RocksStore::open(&config.storage.data_dir)?;
            tracing::info!(path = %config.storage.data_dir.display(), "profile store opened");
            Ok(Arc::new(store))
        }
        other => anyhow::bail!("unknown storage backend: {}", other),
    }
}

fn build_rail(config: &PerkConfig) -> anyhow::Result<Arc<dyn ITokenRail>> {
    let mut registry = RailRegistry::new();
    registry.register(Arc::new(InternalRail::new(u128::from(
        config.settlement.treasury,
    ))));
    if let Some(ref endpoint) = config.settlement.endpoint {
        registry.register(Arc::new(RelayerRail::new(
            endpoint.clone(),
            config.settlement.bearer_token.clone(),
            config.settlement.token_decimals,
        )));
    }

    let rail = registry.get(&config.settlement.rail)?;
    tracing::info!(rail_id = %rail.rail_id(), timeout_secs = config.settlement.timeout_secs, "settlement rail selected");
    Ok(Arc::new(DeadlineRail::new(
        rail,
        Duration::from_secs(config.settlement.timeout_secs),
    )))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    // Handle --init flag
    if args.init {
        let config = PerkConfig::default();
        config.save(&args.config)?;
        tracing::info!(path = %args.config.display(), "wrote default config");
        return Ok(());
    }

    // Load configuration
    let mut config = PerkConfig::load(&args.config)?;

    // Apply CLI overrides
    if let Some(api_port) = args.api_port {
        config.api.port = api_port;
    }
    if let Some(ref data_dir) = args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }
    config.logging.level = args.log_level;

    tracing::info!("Perk Reward Node v{}", env!("CARGO_PKG_VERSION"));

    // Assemble the engine
    let store = build_store(&config)?;
    let rail = build_rail(&config)?;
    let rail_id = rail.rail_id().to_string();
    let engine = Arc::new(RewardEngine::new(store, rail, config.rewards.clone()));
    let app_state = Arc::new(AppState::new(engine, rail_id));

    let listen_addr: SocketAddr = config.api_addr().parse()?;

    // Run until interrupted
    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
        tracing::info!("received shutdown signal");
    };

    tokio::select! {
        result = api::start_api_server(listen_addr, app_state) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "API server error");
            }
        }
        _ = shutdown => {
            tracing::info!("initiating graceful shutdown");
        }
    }

    tracing::info!("Perk node exited cleanly");
    Ok(())
}
