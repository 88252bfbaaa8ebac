//! Connection configuration handed to drivers.
//!
//! [`ConnectionConfig`] is a string key-value bag (host, port, credentials,
//! driver options). The registry never reads it; it only forwards a
//! reference to the bound driver. Secret-looking values are redacted from
//! `Debug` and `Display` output.

use std::collections::HashMap;
use std::fmt;

use crate::masking::SecretMasker;

/// Connector-specific parameters for one connection attempt.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectionConfig {
    properties: HashMap<String, String>,
}

impl ConnectionConfig {
    /// Creates an empty config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config from existing properties.
    #[must_use]
    pub fn with_properties(properties: HashMap<String, String>) -> Self {
        Self { properties }
    }

    /// Builder-style variant of [`ConnectionConfig::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets a property.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Gets a property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Gets a property, treating blank values as absent.
    #[must_use]
    pub fn get_non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    /// Returns true if the property is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Returns all properties.
    #[must_use]
    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    /// Returns properties with a given prefix, with the prefix stripped.
    #[must_use]
    pub fn properties_with_prefix(&self, prefix: &str) -> HashMap<String, String> {
        self.properties
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(prefix)
                    .map(|stripped| (stripped.to_string(), v.clone()))
            })
            .collect()
    }

    /// Returns a copy of the properties with secret values replaced.
    #[must_use]
    pub fn redacted(&self) -> HashMap<String, String> {
        SecretMasker::redact_map(&self.properties)
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        let mut pairs: Vec<_> = self.properties.iter().collect();
        pairs.sort_by_key(|(k, _)| k.as_str());
        for (k, v) in pairs {
            if SecretMasker::is_secret_key(k) {
                map.entry(k, &"***");
            } else {
                map.entry(k, v);
            }
        }
        map.finish()
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&SecretMasker::display_map(&self.properties))
    }
}

impl<K, V> FromIterator<(K, V)> for ConnectionConfig
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_basic_operations() {
        let mut config = ConnectionConfig::new();
        config.set("host", "db.internal");
        config.set("port", "3306");

        assert_eq!(config.get("host"), Some("db.internal"));
        assert_eq!(config.get("port"), Some("3306"));
        assert_eq!(config.get("missing"), None);
        assert!(config.contains("port"));
    }

    #[test]
    fn test_non_blank() {
        let config = ConnectionConfig::new().with("host", "  ").with("db", "sales");
        assert_eq!(config.get_non_blank("host"), None);
        assert_eq!(config.get_non_blank("db"), Some("sales"));
    }

    #[test]
    fn test_prefix_extraction() {
        let config: ConnectionConfig = [
            ("jdbc.useSSL", "true"),
            ("jdbc.serverTimezone", "UTC"),
            ("host", "h"),
        ]
        .into_iter()
        .collect();

        let jdbc = config.properties_with_prefix("jdbc.");
        assert_eq!(jdbc.len(), 2);
        assert_eq!(jdbc.get("useSSL"), Some(&"true".to_string()));
    }

    #[test]
    fn test_debug_and_display_redact_secrets() {
        let config = ConnectionConfig::new()
            .with("username", "admin")
            .with("password", "hunter2");

        let debug = format!("{config:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));

        let display = config.to_string();
        assert_eq!(display, "password=***, username=admin");

        assert_eq!(config.redacted()["password"], "***");
        // the config itself keeps the live value for the driver
        assert_eq!(config.get("password"), Some("hunter2"));
    }
}
