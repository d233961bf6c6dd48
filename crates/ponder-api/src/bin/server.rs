//! The ponder API server binary.
//!
//! Reads `config.toml` (or the file given with `--config`) plus `PONDER_*`
//! environment variables, opens the SQLite store, and serves the JSON API
//! over HTTP.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use ponder_api::ServerConfig;
use ponder_core::engine::Engine;
use ponder_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "ponder social API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("PONDER"))
    .build()
    .context("failed to read configuration")?;
  let server_config: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialize `ServerConfig`")?;

  let store_path = expand_tilde(&server_config.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let engine = Engine::new(Arc::new(store), server_config.rename_cascade);
  let app = ponder_api::router(engine);

  let address = format!("{}:{}", server_config.host, server_config.port);
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!("listening on http://{address}");

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let lossy = path.to_string_lossy();
  if let Some(rest) = lossy.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
