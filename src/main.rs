//! # Main Entry Point
//!
//! Initializes the application:
//! - Domain: Configuration and Types
//! - Infrastructure: Telegram gateway, Request executor
//! - Application: Engine, Session store, Dispatcher
//!

mod application;
mod domain;
mod infrastructure;
mod strings;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::application::dispatcher::Dispatcher;
use crate::application::store::SessionStore;
use crate::domain::config::AppConfig;
use crate::infrastructure::executor::RequestExecutor;
use crate::infrastructure::telegram::TelegramGateway;

#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(version, about = "Telegram bot that builds and runs one HTTP request at a time", long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 1. Load Configuration
    let config = AppConfig::load(&args.config)?;
    let token = config.telegram_token()?;

    // 2. Logging Setup
    // Ensure data directory exists
    if !std::path::Path::new("data").exists() {
        fs::create_dir("data").context("Failed to create data directory")?;
    }

    // Clear previous session log
    let log_path = std::path::Path::new("data/session.log");
    if log_path.exists() {
        let _ = fs::remove_file(log_path);
    }

    let file_appender = tracing_appender::rolling::never("data", "session.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,reqwest=warn,hyper=warn"));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false);

    let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!("Starting Courier...");

    // 3. Initialize Infrastructure
    let gateway = Arc::new(TelegramGateway::new(&token, &config.services.telegram)?);
    let executor = Arc::new(RequestExecutor::new());

    // 4. Initialize Application Components
    let store = Arc::new(SessionStore::default());
    let dispatcher = Dispatcher::new(gateway.clone(), store, executor);

    // 5. Poll Loop
    tracing::info!("Polling for updates");
    loop {
        match gateway.poll_events().await {
            Ok(events) => {
                for event in events {
                    dispatcher.dispatch(event).await;
                }
            }
            Err(error) => {
                tracing::error!("Polling failed: {}", error);
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            }
        }
    }
}
