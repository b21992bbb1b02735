//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from an
//! optional TOML file plus `NOTIFLOW__*` environment variables. Every section
//! has defaults, so an empty configuration is valid.

pub mod deep_link;
pub mod logging;
pub mod notifications;
pub mod realtime;
pub mod session;

use serde::{Deserialize, Serialize};
use tracing::debug;

pub use self::deep_link::DeepLinkConfig;
pub use self::logging::LoggingConfig;
pub use self::notifications::{ChannelConfig, Importance, NotificationsConfig, Visibility};
pub use self::realtime::RealtimeConfig;
pub use self::session::SessionConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Real-time push channel settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Local notification surface settings.
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Payment-result deep-link settings.
    #[serde(default)]
    pub deep_link: DeepLinkConfig,
    /// Session store seed values.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file and the environment.
    ///
    /// The file is optional. Environment variables prefixed with `NOTIFLOW`
    /// and separated by `__` (e.g. `NOTIFLOW__REALTIME__ENDPOINT`) override it.
    pub fn load(path: &str) -> Result<Self, AppError> {
        Self::load_layered(path, None)
    }

    /// Like [`AppConfig::load`], with an optional per-environment file layered
    /// on top of the base file.
    ///
    /// The environment file lives next to the base file and is named after
    /// the environment (`config/default` + `staging` reads `config/staging`).
    pub fn load_layered(path: &str, env: Option<&str>) -> Result<Self, AppError> {
        let mut builder =
            config::Config::builder().add_source(config::File::with_name(path).required(false));

        if let Some(env) = env.filter(|e| !e.is_empty()) {
            let env_path = std::path::Path::new(path).with_file_name(env);
            builder = builder.add_source(
                config::File::with_name(&env_path.to_string_lossy()).required(false),
            );
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("NOTIFLOW")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        debug!(
            path = %path,
            env = ?env,
            endpoint = %config.realtime.endpoint,
            "Configuration loaded"
        );
        Ok(config)
    }
}
