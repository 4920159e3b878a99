use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// signd runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Directory for rotated JSON logs; console only when unset
    pub log_dir: Option<PathBuf>,
    /// Upper bound on one enclave call while serving a request
    pub call_timeout_secs: u64,
    /// File the shell hook writes the last command to
    pub last_command_file: Option<PathBuf>,
    /// Name shown on the enclave when pairing
    pub workstation_name: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8765,
            log_level: "info".to_string(),
            log_dir: None,
            call_timeout_secs: 30,
            last_command_file: signd_infra::default_command_file(),
            workstation_name: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_address: lookup("SIGND_BIND").unwrap_or(defaults.bind_address),
            port: lookup("SIGND_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            log_dir: lookup("SIGND_LOG_DIR").map(PathBuf::from),
            call_timeout_secs: lookup("SIGND_CALL_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.call_timeout_secs),
            last_command_file: lookup("SIGND_LAST_COMMAND_FILE")
                .map(PathBuf::from)
                .or(defaults.last_command_file),
            workstation_name: lookup("SIGND_WORKSTATION_NAME").or_else(|| lookup("HOSTNAME")),
        }
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.bind_address, self.port)
    }
}
