//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

use crate::util::time::INPUT_SYNC_TPS;

const DEFAULT_PORT: u16 = 3001;
/// Input plus state messages at the client sync rate
const DEFAULT_INPUT_RATE_LIMIT: u32 = INPUT_SYNC_TPS * 2;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS; `*` allows any
    pub client_origins: Vec<String>,
    /// Max `sync_input` messages per second per connection
    pub input_rate_limit: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = if let Some(port) = lookup("PORT") {
            format!("0.0.0.0:{}", port.trim())
        } else {
            lookup("SERVER_ADDR").unwrap_or_else(|| format!("0.0.0.0:{}", DEFAULT_PORT))
        };

        let input_rate_limit = match lookup("INPUT_RATE_LIMIT") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|&n| n > 0)
                .ok_or(ConfigError::Invalid("INPUT_RATE_LIMIT"))?,
            None => DEFAULT_INPUT_RATE_LIMIT,
        };

        let client_origins = lookup("CLIENT_ORIGIN")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec!["*".to_string()]);

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            client_origins,
            input_rate_limit,
        })
    }

    pub fn allows_any_origin(&self) -> bool {
        self.client_origins.iter().any(|o| o == "*")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            log_level: "info".to_string(),
            client_origins: vec!["*".to_string()],
            input_rate_limit: DEFAULT_INPUT_RATE_LIMIT,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
