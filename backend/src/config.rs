//! Runtime configuration.
//!
//! Constants for the defaults, plus the few values the server reads from the
//! environment. A `.env` file in the working directory is loaded first.

use std::env;

use crate::error::{ServerError, ServerResult};

/// Port the HTTP server listens on when nothing else is set.
pub const DEFAULT_PORT: u16 = 3000;

/// Maximum size of one uploaded dataset (in bytes).
///
/// 50 MB limit.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Buffered log entries per SSE subscriber before the oldest are dropped.
pub const LOG_CHANNEL_CAPACITY: usize = 100;

pub const PORT_VAR: &str = "CSVRECONCILE_PORT";
pub const MAX_UPLOAD_VAR: &str = "CSVRECONCILE_MAX_UPLOAD_BYTES";

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Read `CSVRECONCILE_PORT` and `CSVRECONCILE_MAX_UPLOAD_BYTES`.
    ///
    /// Unset variables keep their defaults; unparsable ones are an error.
    pub fn from_env() -> ServerResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ServerResult<Self> {
        let mut config = Self::default();
        if let Some(port) = lookup(PORT_VAR) {
            config.port = parse_var(PORT_VAR, &port)?;
        }
        if let Some(limit) = lookup(MAX_UPLOAD_VAR) {
            config.max_upload_bytes = parse_var(MAX_UPLOAD_VAR, &limit)?;
        }
        Ok(config)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> ServerResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ServerError::Config(format!("{} has invalid value '{}'", key, value)))
}
