//! vaip-as (Airport Service) - AirportDB enrichment proxy for the vAIP map
//!
//! Serves enriched Moroccan aerodrome data (runways, frequencies, navaids)
//! plus live IVAO controller and openAIP airspace status.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, reload};

use vaip_as::config::{log_filter, Overrides, ServiceConfig, CONFIG_ENV_VAR, MODULE_NAME};
use vaip_as::services::{
    AirportCache, AirportDbClient, AirportResolver, AirspaceService, BatchSettings,
    FallbackTable, IvaoClient, IvaoService, OpenAipClient,
};
use vaip_as::{build_router, AppState};
use vaip_common::config::{load_or_default, resolve_config_path};

/// Command-line arguments for vaip-as
#[derive(Parser, Debug)]
#[command(name = "vaip-as")]
#[command(about = "Airport data service for the vAIP Morocco map")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long)]
    bind: Option<String>,

    /// AirportDB API token
    #[arg(long, env = "AIRPORT_DB_TOKEN", hide_env_values = true)]
    airportdb_token: Option<String>,

    /// openAIP API key
    #[arg(long, env = "OPENAIP_API_KEY", hide_env_values = true)]
    openaip_key: Option<String>,

    /// Replacement fallback dataset (JSON keyed by ICAO code)
    #[arg(long)]
    fallback: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables win
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();

    // Info until the configured level is known
    let rust_log = std::env::var("RUST_LOG").ok();
    let (filter, filter_handle) = reload::Layer::new(log_filter(rust_log.as_deref(), "info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let config_path = resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR, MODULE_NAME);
    let toml_config = load_or_default(config_path.as_deref())
        .context("Failed to load configuration")?;

    filter_handle
        .reload(log_filter(rust_log.as_deref(), &toml_config.logging.level))
        .context("Failed to apply configured log level")?;

    info!(
        "Starting vAIP Airport Service (vaip-as) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let config = ServiceConfig::resolve(
        Overrides {
            port: args.port,
            bind_address: args.bind,
            airportdb_token: args.airportdb_token,
            openaip_key: args.openaip_key,
            fallback_path: args.fallback,
        },
        toml_config,
    );

    let fallback = FallbackTable::from_config(config.fallback_path.as_deref())
        .context("Failed to load fallback table")?;
    info!(codes = ?fallback.codes(), "Fallback table ready");

    let upstream = AirportDbClient::new(&config.airportdb)
        .context("Failed to create AirportDB client")?;
    let resolver = AirportResolver::new(
        Arc::new(AirportCache::new(config.record_ttl())),
        Arc::new(fallback),
        Arc::new(upstream),
        config.upstream_timeout(),
        BatchSettings::from(&config.batch),
    );

    let ivao = IvaoService::new(
        Arc::new(IvaoClient::new(&config.ivao).context("Failed to create IVAO client")?),
        &config.ivao,
    );
    let airspace = AirspaceService::new(
        Arc::new(OpenAipClient::new(&config.openaip).context("Failed to create openAIP client")?),
        &config.openaip,
    );

    info!(
        airports = config.airports.len(),
        ttl_secs = config.cache.record_ttl_secs,
        batch_size = config.batch.size,
        batch_delay_ms = config.batch.delay_ms,
        "Airport resolver configured"
    );

    let state = AppState::new(
        Arc::new(resolver),
        Arc::new(ivao),
        Arc::new(airspace),
        config.airports.clone(),
    );
    let app = build_router(state, &config.cors_origins);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("vaip-as listening on http://{}", addr);
    info!("Health check: http://{}/api/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
