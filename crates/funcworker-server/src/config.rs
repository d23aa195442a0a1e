use std::net::SocketAddr;
use std::num::ParseIntError;

use thiserror::Error;

/// Port the host assigns to the custom handler process.
pub const PORT_ENV: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";
pub const HOST_ENV: &str = "FUNCWORKER_HOST";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid FUNCTIONS_CUSTOMHANDLER_PORT value {value:?}: {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Invalid listen address {0}")]
    InvalidAddress(String),
}

/// Worker configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerConfig {
    pub host: String,
    pub port: u16,
    /// Whether the port came from the host rather than the default.
    pub port_from_host: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            port_from_host: false,
        }
    }
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(host) = lookup(HOST_ENV).filter(|host| !host.trim().is_empty()) {
            config.host = host.trim().to_string();
        }

        if let Some(value) = lookup(PORT_ENV) {
            config.port = value
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidPort { value, source })?;
            config.port_from_host = true;
        }

        Ok(config)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse().map_err(|_| ConfigError::InvalidAddress(addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, WorkerConfig::default());
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_port_from_host() {
        let config = WorkerConfig::from_lookup(lookup(&[(PORT_ENV, "34567")])).unwrap();
        assert_eq!(config.port, 34567);
        assert!(config.port_from_host);
    }

    #[test]
    fn test_invalid_port() {
        let err = WorkerConfig::from_lookup(lookup(&[(PORT_ENV, "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { ref value, .. } if value == "http"));
    }

    #[test]
    fn test_invalid_host() {
        let config = WorkerConfig::from_lookup(lookup(&[(HOST_ENV, "not an address")])).unwrap();
        assert!(matches!(config.socket_addr(), Err(ConfigError::InvalidAddress(_))));
    }
}
