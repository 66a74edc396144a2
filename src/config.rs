//! Node configuration, read from the environment.

use std::env;
use std::time::Duration;

use crate::error::RelayError;

/// Runtime settings for one relay node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Name reported in the `service` field of every reply
    pub service_name: String,
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Transport timeout for forwarded calls; `None` waits indefinitely
    pub forward_timeout: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            service_name: "Undefined".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8080,
            forward_timeout: None,
        }
    }
}

impl RelayConfig {
    /// Reads `SERVICE_NAME`, `RELAY_HOST`, `PORT` and `RELAY_FORWARD_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RelayError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| RelayError::Config(format!("PORT={:?}: {}", raw, e)))?,
            None => defaults.port,
        };

        let forward_timeout = match lookup("RELAY_FORWARD_TIMEOUT_MS") {
            Some(raw) => {
                let ms = raw.trim().parse::<u64>().map_err(|e| {
                    RelayError::Config(format!("RELAY_FORWARD_TIMEOUT_MS={:?}: {}", raw, e))
                })?;
                Some(Duration::from_millis(ms))
            }
            None => defaults.forward_timeout,
        };

        Ok(Self {
            service_name: lookup("SERVICE_NAME").unwrap_or(defaults.service_name),
            host: lookup("RELAY_HOST").unwrap_or(defaults.host),
            port,
            forward_timeout,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = RelayConfig::from_lookup(lookup_in(&[])).unwrap();
        assert_eq!(config, RelayConfig::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_reads_overrides() {
        let config = RelayConfig::from_lookup(lookup_in(&[
            ("SERVICE_NAME", "checkout"),
            ("RELAY_HOST", "127.0.0.1"),
            ("PORT", "9090"),
            ("RELAY_FORWARD_TIMEOUT_MS", "1500"),
        ]))
        .unwrap();

        assert_eq!(config.service_name, "checkout");
        assert_eq!(config.bind_addr(), "127.0.0.1:9090");
        assert_eq!(config.forward_timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_bad_port_is_an_error() {
        let err = RelayConfig::from_lookup(lookup_in(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, RelayError::Config(_)));
    }
}
