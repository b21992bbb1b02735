//! Deep-link commands.

use clap::Args;
use serde_json::json;

use crate::output::{self, OutputFormat};
use notiflow_core::config::AppConfig;
use notiflow_core::error::AppError;
use notiflow_core::types::DeepLinkResult;
use notiflow_navigation::DeepLinkCodec;
use notiflow_navigation::router::{RouteTrigger, resolve};

/// Arguments for encode-link
#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// Order the payment belongs to
    #[arg(long)]
    pub order_id: String,
    /// Payment status
    #[arg(long)]
    pub status: String,
    /// Paid amount
    #[arg(long)]
    pub amount: Option<f64>,
    /// Gateway transaction id
    #[arg(long)]
    pub transaction_id: Option<String>,
    /// Gateway error code
    #[arg(long)]
    pub error_code: Option<String>,
    /// Gateway error message
    #[arg(long)]
    pub error_message: Option<String>,
    /// Epoch milliseconds; defaults to now
    #[arg(long)]
    pub timestamp: Option<String>,
}

/// A single URL argument
#[derive(Debug, Args)]
pub struct UrlArgs {
    /// The deep link
    pub url: String,
}

/// Build a link from the given fields
pub fn encode(args: &EncodeArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let result = DeepLinkResult {
        amount: args.amount,
        transaction_id: args.transaction_id.clone(),
        error_code: args.error_code.clone(),
        error_message: args.error_message.clone(),
        timestamp: args.timestamp.clone(),
        ..DeepLinkResult::new(&args.order_id, &args.status)
    };
    if !result.is_valid() {
        return Err(AppError::validation("order id and status must not be empty"));
    }

    let link = DeepLinkCodec::new(&config.deep_link).encode(&result);
    match format {
        OutputFormat::Text => println!("{}", link),
        OutputFormat::Json => output::print_json(&json!({ "url": link })),
    }
    Ok(())
}

/// Decode a link and report its fields
pub fn decode(args: &UrlArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let result = decode_url(&args.url, config)?;

    match format {
        OutputFormat::Text => {
            print_result(&result);
            if result.is_valid() {
                output::print_success("Link is routable");
            } else {
                output::print_warning("Link is missing orderId or status");
            }
        }
        OutputFormat::Json => output::print_json(&json!({
            "result": result,
            "valid": result.is_valid(),
        })),
    }
    Ok(())
}

/// Decode a link and show the navigation target
pub fn route(args: &UrlArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let result = decode_url(&args.url, config)?;
    let target = resolve(&RouteTrigger::DeepLink(result));

    match (format, target) {
        (OutputFormat::Text, Some(target)) => {
            output::print_kv("screen", target.screen().as_str());
            output::print_kv("params", &target.params().to_string());
        }
        (OutputFormat::Text, None) => output::print_warning("Link would not navigate"),
        (OutputFormat::Json, target) => output::print_json(&json!({ "target": target })),
    }
    Ok(())
}

fn decode_url(url: &str, config: &AppConfig) -> Result<DeepLinkResult, AppError> {
    DeepLinkCodec::new(&config.deep_link)
        .decode(url)
        .map_err(|e| AppError::validation(e.to_string()))
}

fn print_result(result: &DeepLinkResult) {
    let amount = result.amount.map(|a| a.to_string());
    output::print_opt("orderId", result.order_id.as_deref());
    output::print_opt("status", result.status.as_deref());
    output::print_opt("amount", amount.as_deref());
    output::print_opt("transactionId", result.transaction_id.as_deref());
    output::print_opt("errorCode", result.error_code.as_deref());
    output::print_opt("errorMessage", result.error_message.as_deref());
    output::print_opt("timestamp", result.timestamp.as_deref());
}
