//! Connection configuration
//!
//! Flags win over `DAGLOAD_*` environment variables (a `.env` file is read
//! first), which win over the defaults below.

use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Connection Defaults
// ============================================================================

/// Server URL when neither `--url` nor `DAGLOAD_URL` is set
pub const DEFAULT_URL: &str = "http://localhost:8069";

pub const DEFAULT_DB: &str = "odoo";

pub const DEFAULT_USER: &str = "admin";

pub const DEFAULT_PASSWORD: &str = "admin";

/// Timeout for a single RPC call in seconds.
/// Can be overridden via the DAGLOAD_TIMEOUT_SECS environment variable.
/// Large batches with computed fields can take minutes on the server.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub url: String,
    pub db: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            db: DEFAULT_DB.to_string(),
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Build from the parsed command line; clap has already folded in the
    /// `DAGLOAD_*` variables
    pub fn from_cli(cli: &crate::Cli) -> Result<Self> {
        let timeout_secs = match std::env::var("DAGLOAD_TIMEOUT_SECS") {
            Ok(value) => value
                .parse()
                .map_err(|_| CliError::config(format!("DAGLOAD_TIMEOUT_SECS must be a number of seconds, got '{value}'")))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let config = Self {
            url: cli.url.trim_end_matches('/').to_string(),
            db: cli.db.clone(),
            user: cli.user.clone(),
            password: cli.password.clone(),
            timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(CliError::config(format!(
                "server URL must start with http:// or https://, got '{}'",
                self.url
            )));
        }
        if self.db.trim().is_empty() {
            return Err(CliError::config("database name must not be empty"));
        }
        if self.user.trim().is_empty() {
            return Err(CliError::config("user must not be empty"));
        }
        if self.timeout_secs == 0 {
            return Err(CliError::config("timeout must be greater than 0"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// JSON-RPC endpoint of the server
    pub fn endpoint(&self) -> String {
        format!("{}/jsonrpc", self.url)
    }
}
