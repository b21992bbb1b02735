//! CLI command definitions and dispatch.

pub mod link;
pub mod listen;
pub mod normalize;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use notiflow_core::config::AppConfig;
use notiflow_core::error::AppError;

/// notiflow: notification ingestion and navigation routing tools
#[derive(Debug, Parser)]
#[command(name = "notiflow", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build a payment-result deep link
    EncodeLink(link::EncodeArgs),
    /// Parse a payment-result deep link
    DecodeLink(link::UrlArgs),
    /// Show where a deep link would navigate
    RouteLink(link::UrlArgs),
    /// Normalize a raw payload into a notification record
    Normalize(normalize::NormalizeArgs),
    /// Connect to the real-time server and log notifications
    Listen(listen::ListenArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = load_config(&self.config)?;
        match &self.command {
            Commands::EncodeLink(args) => link::encode(args, &config, self.format),
            Commands::DecodeLink(args) => link::decode(args, &config, self.format),
            Commands::RouteLink(args) => link::route(args, &config, self.format),
            Commands::Normalize(args) => normalize::execute(args, self.format).await,
            Commands::Listen(args) => listen::execute(args, config).await,
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}
