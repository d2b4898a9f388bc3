use std::path::PathBuf;

use anyhow::Context;
use axum::extract::FromRef;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
use crate::config::Config;

mod db;

mod error;
pub(crate) use crate::error::{ApiError, ApiResult};

mod models;

mod storage;
use crate::storage::AnyStorage;

mod controllers {
    pub mod paste;
}

mod commands {
    pub mod init_db;
    pub mod serve;
}

/// A small JSON API for storing text pastes.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Config file to read instead of `pastebin.toml`.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (the default).
    Serve,
    /// Create the pastes table if it does not exist yet.
    InitDb,
}

/// State shared by every request handler.
#[derive(Clone, FromRef)]
pub struct App {
    pub config: Config,
    pub storage: AnyStorage,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // try to load .env, ignoring any errors
    _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("failed to read config")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("using {:?} store", config.store);
            let storage = AnyStorage::from_config(&config)
                .await
                .context("failed to open store")?;
            commands::serve::run(App { config, storage }).await
        }
        Command::InitDb => commands::init_db::run(&config).await,
    }
}
