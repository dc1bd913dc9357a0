use std::env;

use crate::context::EntryOrder;
use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Context reconstruction settings
    pub context: ContextConfig,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    /// Human-readable output
    Pretty,
    /// One JSON object per event
    Json,
}

/// Context reconstruction configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ContextConfig {
    /// Placement of the assistant entry relative to a node's message entries.
    pub entry_order: EntryOrder,
    /// Drop zero-length sentence units instead of emitting empty entries.
    pub skip_empty_units: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let entry_order = match env::var("CONTEXT_ENTRY_ORDER") {
            Ok(raw) => raw.parse::<EntryOrder>().map_err(|message| AppError::Config {
                message: format!("CONTEXT_ENTRY_ORDER: {}", message),
            })?,
            Err(_) => EntryOrder::default(),
        };

        let context = ContextConfig {
            entry_order,
            skip_empty_units: env::var("CONTEXT_SKIP_EMPTY_UNITS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(false),
        };

        Ok(Config { logging, context })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            entry_order: EntryOrder::default(),
            skip_empty_units: false,
        }
    }
}
