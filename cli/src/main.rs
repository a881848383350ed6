//! Countdown CLI - binary entry point for the deduction service.
//!
//! ```text
//! main() -> Settings::resolve(cli, config) -> open_registry() -> countdown_server::serve()
//! ```
//!
//! Flags override `~/.countdown/config.toml`, which overrides built-in
//! defaults. Logs go to stderr, filtered by `RUST_LOG` (default `info`).

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use countdown_config::{CountdownConfig, StorageBackend};
use countdown_engine::{MemoryStore, SessionRegistry, SessionStore};
use countdown_store::SqliteStore;

#[derive(Debug, Parser)]
#[command(name = "countdown")]
#[command(about = "Deduce a seven-segment countdown's start value and broken segments")]
#[command(disable_help_flag = true)]
struct Cli {
    /// Address to listen on
    #[arg(short = 'h', long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Read configuration from this file instead of ~/.countdown/config.toml
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Session storage backend
    #[arg(long, value_name = "BACKEND", value_parser = parse_backend)]
    storage: Option<StorageBackend>,

    /// Database file for the sqlite backend
    #[arg(long, value_name = "PATH")]
    db: Option<PathBuf>,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}

fn parse_backend(raw: &str) -> Result<StorageBackend, String> {
    StorageBackend::parse(raw).ok_or_else(|| format!("unknown storage backend `{raw}`"))
}

#[derive(Debug, PartialEq, Eq)]
struct Settings {
    host: String,
    port: u16,
    backend: StorageBackend,
    database: PathBuf,
}

impl Settings {
    fn resolve(cli: Cli, config: &CountdownConfig) -> Self {
        Self {
            host: cli.host.unwrap_or_else(|| config.host().to_string()),
            port: cli.port.unwrap_or_else(|| config.port()),
            backend: cli.storage.unwrap_or_else(|| config.storage_backend()),
            database: cli.db.unwrap_or_else(|| config.database_path()),
        }
    }

    fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn load_config(path: Option<&Path>) -> CountdownConfig {
    let loaded = match path {
        Some(path) => CountdownConfig::load_from(path),
        None => CountdownConfig::load(),
    };
    match loaded {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            tracing::warn!(path = %err.path().display(), "Ignoring config: {err}");
            CountdownConfig::default()
        }
    }
}

fn open_registry(settings: &Settings) -> Result<SessionRegistry> {
    let store: Arc<dyn SessionStore> = match settings.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Sqlite => Arc::new(
            SqliteStore::open(&settings.database)
                .context("Failed to open the sqlite session store")?,
        ),
    };
    tracing::info!(backend = settings.backend.as_str(), "Session storage ready");
    Ok(SessionRegistry::new(store))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());
    let settings = Settings::resolve(cli, &config);

    let registry = open_registry(&settings)?;
    countdown_server::serve(&settings.addr(), Arc::new(registry)).await
}
