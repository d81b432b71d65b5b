use std::str::FromStr;
use std::time::Duration;

use crate::cli::Cli;
use crate::search::client::DEFAULT_ENDPOINT;

/// Default HTTP port when neither `--http <port>` nor `PORT` is given.
pub const DEFAULT_PORT: u16 = 8080;

/// Default timeout for one outbound search (30 seconds).
const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 30;

const DEFAULT_LOG_LEVEL: &str = "info";

/// Which transport the process serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Stdio,
    Http,
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("MCP_MODE must be 'stdio' or 'http', got '{0}'")]
    InvalidMode(String),
    #[error("PORT must be an integer between 1 and 65535, got '{0}'")]
    InvalidPort(String),
    #[error("WEBSEARCH_TIMEOUT_SECS must be a positive integer, got '{0}'")]
    InvalidTimeout(String),
}

/// Server configuration loaded from environment variables, then overridden
/// by command-line flags.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub mode: Mode,
    pub port: u16,
    pub search_endpoint: String,
    pub search_timeout: Duration,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            port: DEFAULT_PORT,
            search_endpoint: DEFAULT_ENDPOINT.to_string(),
            search_timeout: Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `MCP_MODE` (optional, default `stdio`): `stdio` or `http`
    /// - `PORT` (optional, default 8080): HTTP listen port
    /// - `WEBSEARCH_ENDPOINT` (optional): search provider HTML endpoint
    /// - `WEBSEARCH_TIMEOUT_SECS` (optional, default 30): max seconds per search
    /// - `WEBSEARCH_LOG` (optional, default `info`): log filter when `RUST_LOG` is unset
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(mode) = lookup("MCP_MODE") {
            config.mode = mode.parse()?;
        }

        if let Some(port) = lookup("PORT").filter(|p| !p.trim().is_empty()) {
            config.port = parse_port(&port)?;
        }

        if let Some(endpoint) = lookup("WEBSEARCH_ENDPOINT").filter(|e| !e.trim().is_empty()) {
            config.search_endpoint = endpoint;
        }

        if let Some(val) = lookup("WEBSEARCH_TIMEOUT_SECS") {
            let secs = val
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(val.clone()))?;
            config.search_timeout = Duration::from_secs(secs);
        }

        if let Some(level) = lookup("WEBSEARCH_LOG").filter(|l| !l.trim().is_empty()) {
            config.log_level = level;
        }

        Ok(config)
    }

    /// Apply command-line flags. Flags win over environment variables.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if cli.stdio {
            self.mode = Mode::Stdio;
        }
        if let Some(port) = cli.http {
            self.mode = Mode::Http;
            if let Some(port) = port {
                self.port = port;
            }
        }
    }
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse::<u16>()
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| ConfigError::InvalidPort(raw.to_string()))
}
