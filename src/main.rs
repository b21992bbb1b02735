//! notiflow agent, a headless host for the notification pipeline.
//!
//! Connects to the real-time server, renders notifications and navigation
//! requests into the log, and handles an optional launch link given as the
//! first argument.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use notiflow_core::config::AppConfig;
use notiflow_core::error::AppError;
use notiflow_core::traits::MemorySessionStore;
use notiflow_lifecycle::{LifecycleDispatcher, Platforms};
use notiflow_navigation::LogNavigator;
use notiflow_realtime::connection::WsConnector;
use notiflow_realtime::notification::LogPlatform;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Agent error");
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("NOTIFLOW_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    let env = std::env::var("NOTIFLOW_ENV").ok();

    AppConfig::load_layered(&config_path, env.as_deref())
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Wire the pipeline and run until interrupted
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting notiflow agent");

    let session = Arc::new(MemorySessionStore::new(config.session.user_id.clone()));
    let dispatcher = Arc::new(LifecycleDispatcher::new(
        &config,
        Platforms {
            connector: Arc::new(WsConnector::new()),
            notifications: Arc::new(LogPlatform::new()),
            navigator: Arc::new(LogNavigator::new()),
            session,
        },
    ));

    dispatcher.start();
    dispatcher.connect();

    let launch_link = std::env::args().nth(1);
    dispatcher.handle_initial_url(launch_link.as_deref());
    dispatcher.mark_navigation_ready();

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    dispatcher.shutdown().await;
    tracing::info!("notiflow agent stopped");
    Ok(())
}
