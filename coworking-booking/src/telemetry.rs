//! Tracing Initialization
//!
//! Installs a `tracing-subscriber` registry with an env filter and either a
//! human-readable or a JSON formatter. Configured from environment variables.

use coworking_core::{ConfigError, CoworkingResult};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `COWORKING_LOG_FILTER` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "coworking_booking=info,coworking_storage=info,warn";

/// Output format of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Multi-line, human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Pretty => write!(f, "pretty"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidValue {
                field: "log_format".to_string(),
                value: s.to_string(),
                reason: "expected 'pretty' or 'json'".to_string(),
            }),
        }
    }
}

/// Telemetry configuration from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Line format
    pub format: LogFormat,
    /// `EnvFilter` directives, e.g. `coworking_booking=debug,warn`
    pub filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create TelemetryConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `COWORKING_LOG_FORMAT`: `pretty` or `json` (default: pretty)
    /// - `COWORKING_LOG_FILTER`: filter directives, falling back to `RUST_LOG`
    ///   and then to [`DEFAULT_LOG_FILTER`]
    pub fn from_env() -> Self {
        let format = std::env::var("COWORKING_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        let filter = std::env::var("COWORKING_LOG_FILTER")
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());

        Self { format, filter }
    }
}

/// Initialize the global tracing subscriber.
///
/// Call once at startup. A second call, or a subscriber installed elsewhere,
/// yields a `ConfigError` instead of panicking.
pub fn init_tracing(config: &TelemetryConfig) -> CoworkingResult<()> {
    let env_filter = EnvFilter::try_new(&config.filter).map_err(|e| ConfigError::InvalidValue {
        field: "log_filter".to_string(),
        value: config.filter.clone(),
        reason: e.to_string(),
    })?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match config.format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
    };
    installed.map_err(|e| ConfigError::InvalidValue {
        field: "subscriber".to_string(),
        value: config.format.to_string(),
        reason: format!("Failed to init subscriber: {}", e),
    })?;

    tracing::info!(
        format = %config.format,
        filter = %config.filter,
        "Tracing initialized"
    );

    Ok(())
}
