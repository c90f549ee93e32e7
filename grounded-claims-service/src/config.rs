use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::error::ConfigError;
use crate::tables::ReasoningTables;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_FACT_STORE_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Structured JSON logging for production
    Json,
    /// Human-readable logging for development
    Pretty,
}

/// Process configuration read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub port: u16,
    pub log_format: LogFormat,
    pub tables_path: Option<PathBuf>,
    pub fact_store_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            log_format: LogFormat::Json,
            tables_path: None,
            fact_store_timeout: Duration::from_millis(DEFAULT_FACT_STORE_TIMEOUT_MS),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidEnv { name: "PORT", value })?,
            None => defaults.port,
        };

        // Anything but "pretty" logs JSON
        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("pretty") => LogFormat::Pretty,
            _ => LogFormat::Json,
        };

        let tables_path = lookup("REASONING_TABLES_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        let fact_store_timeout = match lookup("FACT_STORE_TIMEOUT_MS") {
            Some(value) => value
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| ConfigError::InvalidEnv {
                    name: "FACT_STORE_TIMEOUT_MS",
                    value,
                })?,
            None => defaults.fact_store_timeout,
        };

        Ok(Self {
            port,
            log_format,
            tables_path,
            fact_store_timeout,
        })
    }

    /// Load the reasoning tables from the configured file, falling back to
    /// the built-in defaults when no path is configured. File tables are
    /// validated while parsing.
    pub fn load_tables(&self) -> Result<ReasoningTables, ConfigError> {
        match &self.tables_path {
            Some(path) => ReasoningTables::load(path),
            None => {
                info!("Using built-in reasoning tables");
                Ok(ReasoningTables::default())
            }
        }
    }
}
