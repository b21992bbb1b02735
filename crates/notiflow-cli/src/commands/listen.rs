//! Live listening command.

use std::sync::Arc;

use clap::Args;
use tracing::info;

use crate::output;
use notiflow_core::config::AppConfig;
use notiflow_core::error::AppError;
use notiflow_core::traits::MemorySessionStore;
use notiflow_lifecycle::{LifecycleDispatcher, Platforms};
use notiflow_navigation::LogNavigator;
use notiflow_realtime::connection::WsConnector;
use notiflow_realtime::notification::LogPlatform;

/// Arguments for listen
#[derive(Debug, Args)]
pub struct ListenArgs {
    /// Real-time endpoint; overrides the configuration
    #[arg(short, long)]
    pub endpoint: Option<String>,
    /// User whose rooms to join; overrides the configuration
    #[arg(short, long)]
    pub user_id: Option<String>,
}

/// Connect and log notifications until interrupted
pub async fn execute(args: &ListenArgs, mut config: AppConfig) -> Result<(), AppError> {
    if let Some(endpoint) = &args.endpoint {
        config.realtime.endpoint = endpoint.clone();
    }
    config.realtime.enabled = true;
    let user_id = args.user_id.clone().or(config.session.user_id.clone());

    let dispatcher = Arc::new(LifecycleDispatcher::new(
        &config,
        Platforms {
            connector: Arc::new(WsConnector::new()),
            notifications: Arc::new(LogPlatform::new()),
            navigator: Arc::new(LogNavigator::new()),
            session: Arc::new(MemorySessionStore::new(user_id)),
        },
    ));
    dispatcher.start();
    dispatcher.mark_navigation_ready();
    dispatcher.connect();

    output::print_success(&format!(
        "Listening on {} (Ctrl+C to stop)",
        config.realtime.endpoint
    ));

    tokio::signal::ctrl_c().await?;
    info!("Interrupted");
    dispatcher.shutdown().await;
    Ok(())
}
