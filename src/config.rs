use std::time::Duration;

use tracing::warn;

use crate::engine::StoreKind;

const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DRAIN_SECS: u64 = 10;

/// Process settings, read from `ROOMBOOK_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub metrics_port: Option<u16>,
    pub store: StoreKind,
    /// How long shutdown waits for in-flight requests.
    pub drain_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.into(),
            port: DEFAULT_PORT,
            metrics_port: None,
            store: StoreKind::default(),
            drain_timeout: Duration::from_secs(DEFAULT_DRAIN_SECS),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let bind = lookup("ROOMBOOK_BIND").unwrap_or(defaults.bind);
        let port = lookup("ROOMBOOK_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.port);
        let metrics_port = lookup("ROOMBOOK_METRICS_PORT").and_then(|s| s.parse().ok());
        let store = match lookup("ROOMBOOK_STORE") {
            Some(raw) => raw.parse::<StoreKind>().unwrap_or_else(|e| {
                warn!("{e}, using {}", defaults.store.as_str());
                defaults.store
            }),
            None => defaults.store,
        };
        let drain_timeout = lookup("ROOMBOOK_DRAIN_SECS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.drain_timeout);

        Self {
            bind,
            port,
            metrics_port,
            store,
            drain_timeout,
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.listen_addr(), "0.0.0.0:8000");
    }

    #[test]
    fn reads_all_keys() {
        let config = Config::from_lookup(lookup_from(&[
            ("ROOMBOOK_BIND", "127.0.0.1"),
            ("ROOMBOOK_PORT", "9090"),
            ("ROOMBOOK_METRICS_PORT", "9100"),
            ("ROOMBOOK_STORE", "sharded"),
            ("ROOMBOOK_DRAIN_SECS", "3"),
        ]));
        assert_eq!(config.listen_addr(), "127.0.0.1:9090");
        assert_eq!(config.metrics_port, Some(9100));
        assert_eq!(config.store, StoreKind::Sharded);
        assert_eq!(config.drain_timeout, Duration::from_secs(3));
    }

    #[test]
    fn bad_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("ROOMBOOK_PORT", "not-a-port"),
            ("ROOMBOOK_METRICS_PORT", "70000"),
            ("ROOMBOOK_STORE", "postgres"),
        ]));
        assert_eq!(config.port, 8000);
        assert_eq!(config.metrics_port, None);
        assert_eq!(config.store, StoreKind::Single);
    }
}
