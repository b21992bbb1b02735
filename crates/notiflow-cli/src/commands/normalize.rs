//! Payload normalization command.

use std::sync::Arc;

use clap::{Args, ValueEnum};
use serde_json::Value;
use tokio::io::AsyncReadExt;

use crate::output::{self, OutputFormat};
use notiflow_core::error::AppError;
use notiflow_core::traits::MemorySessionStore;
use notiflow_core::types::NotificationRecord;
use notiflow_realtime::message::{Frame, InboundEvent, PushMessage};
use notiflow_realtime::{PayloadNormalizer, RawPayload};

/// Where the payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PayloadSource {
    /// A real-time server event; `--event` picks its name
    Realtime,
    /// A push-messaging message
    Push,
}

/// Arguments for normalize
#[derive(Debug, Args)]
pub struct NormalizeArgs {
    /// Payload source
    #[arg(short, long, value_enum, default_value = "realtime")]
    pub source: PayloadSource,
    /// Server event name for real-time payloads
    #[arg(short, long, default_value = "notification")]
    pub event: String,
    /// Signed-in user to stamp on the record
    #[arg(short, long)]
    pub user_id: Option<String>,
    /// JSON payload; read from stdin when absent
    pub payload: Option<String>,
}

/// Execute normalize
pub async fn execute(args: &NormalizeArgs, format: OutputFormat) -> Result<(), AppError> {
    let text = match &args.payload {
        Some(text) => text.clone(),
        None => {
            let mut text = String::new();
            tokio::io::stdin().read_to_string(&mut text).await?;
            text
        }
    };
    let value: Value = serde_json::from_str(&text)?;

    let raw = match args.source {
        PayloadSource::Push => RawPayload::Push(serde_json::from_value::<PushMessage>(value)?),
        PayloadSource::Realtime => {
            let frame = Frame::new(args.event.clone(), value);
            InboundEvent::classify(&frame).map(RawPayload::from).ok_or_else(|| {
                AppError::validation(format!("'{}' is not a notification event", args.event))
            })?
        }
    };

    let session = Arc::new(MemorySessionStore::new(args.user_id.clone()));
    let record = PayloadNormalizer::new(session).normalize(&raw);

    match format {
        OutputFormat::Text => print_record(&record),
        OutputFormat::Json => output::print_json(&record),
    }
    Ok(())
}

fn print_record(record: &NotificationRecord) {
    output::print_kv("id", record.id());
    output::print_kv("title", record.title());
    output::print_kv("body", record.body());
    output::print_kv("targetScreen", record.target_screen().as_str());
    for (key, value) in record.attributes() {
        output::print_kv(&format!("attr.{key}"), value);
    }
}
