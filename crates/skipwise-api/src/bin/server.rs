//! skipwise API server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! JSON snapshot store, and serves the REST API over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use serde::Deserialize;
use skipwise_core::ledger::Ledger;
use skipwise_store_json::JsonStore;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "SkipWise attendance server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
struct ServerConfig {
  #[serde(default = "default_host")]
  host:       String,
  #[serde(default = "default_port")]
  port:       u16,
  #[serde(default = "default_store_path")]
  store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".into() }

fn default_port() -> u16 { 8090 }

fn default_store_path() -> PathBuf { PathBuf::from("skipwise.json") }

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration; every field has a default, so both the file and the
  // SKIPWISE_* environment overrides are optional.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SKIPWISE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store = JsonStore::new(&server_cfg.store_path);
  tracing::info!("Using store at {:?}", store.path());
  let ledger = Arc::new(Ledger::new(store));

  let app =
    skipwise_api::api_router(ledger).layer(TraceLayer::new_for_http());

  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
