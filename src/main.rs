//! NFT Marketplace Sales Bot
//!
//! Watches one address, posts every marketplace sale that touches it.
//!
//! Required environment:
//! - `PROJECT_ADDRESS`: address to watch
//! - `DISCORD_URL`: notification webhook

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sales_bot::config::Config;
use sales_bot::endpoints;
use sales_bot::metadata::{MetaplexResolver, MetadataResolver, OffChainFetcher};
use sales_bot::notifier::Notifier;
use sales_bot::pacing::RequestPacer;
use sales_bot::pipeline::MarketplaceRegistry;
use sales_bot::poller::{Poller, PollerSettings, PollingState};
use sales_bot::rpc::{ChainRpc, PacedRpc, SolanaRpc};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "SALES_BOT_CONFIG", default_value = "sales-bot.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose)?;

    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Missing PROJECT_ADDRESS / DISCORD_URL stops here
    let config = Config::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config))?;

    // Snapshot before any network call so nothing that happens while
    // starting up is mistaken for history
    let mut state = PollingState::starting_now();

    let poller = build_poller(&config)?;

    if config.monitoring.enable_metrics {
        let port = config.monitoring.metrics_port;
        tokio::spawn(async move {
            if let Err(e) = endpoints::endpoint_server(port).await {
                error!("Metrics server error: {}", e);
            }
        });
    }

    tokio::select! {
        _ = poller.run(&mut state) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!(ticks = state.ticks(), "Shutting down");
    Ok(())
}

/// Wire the collaborators from configuration
fn build_poller(config: &Config) -> Result<Poller> {
    let address = config.project_pubkey()?;
    let pacer = Arc::new(RequestPacer::new(config.request_interval()));

    let rpc: Arc<dyn ChainRpc> = Arc::new(PacedRpc::new(
        SolanaRpc::from_config(&config.rpc),
        pacer.clone(),
    ));
    info!(endpoint = %config.rpc.url, commitment = %config.rpc.commitment, "RPC client ready");

    let fetcher = OffChainFetcher::from_config(&config.metadata, pacer.clone())?;
    let metadata: Arc<dyn MetadataResolver> = Arc::new(MetaplexResolver::new(rpc.clone(), fetcher));

    let notifier = Notifier::from_config(&config.notifier, &config.webhook_url, pacer)?;
    info!(sinks = ?notifier.sink_names(), "Notifier ready");

    let registry = MarketplaceRegistry::new(config.marketplaces.clone());

    Ok(Poller::new(
        address,
        rpc,
        metadata,
        notifier,
        registry,
        PollerSettings {
            backfill: config.polling.backfill,
            idle_interval: config.idle_interval(),
        },
    ))
}

/// Initialize logging subsystem
fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        "sales_bot=debug,info"
    } else {
        "sales_bot=info,warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    Ok(())
}
