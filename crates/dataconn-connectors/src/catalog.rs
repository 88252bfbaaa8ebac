//! Connector catalog.
//!
//! The [`ConnectorCatalog`] is the read-only table of every connector type
//! the platform knows about. Entries are built once (the builtin table plus
//! any configured extras) and never change afterwards.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::error::{ConnectorError, Result};

/// Broad family a connector belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorCategory {
    /// Relational and tabular stores.
    Structured,
    /// Document and file based sources.
    #[serde(alias = "no-structured")]
    Unstructured,
    /// Search engines, APM and everything else.
    Other,
}

impl ConnectorCategory {
    /// Returns the stable tag of this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ConnectorCategory::Structured => "structured",
            ConnectorCategory::Unstructured => "unstructured",
            ConnectorCategory::Other => "other",
        }
    }
}

impl fmt::Display for ConnectorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectorCategory {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "structured" => Ok(ConnectorCategory::Structured),
            "unstructured" | "no-structured" => Ok(ConnectorCategory::Unstructured),
            "other" => Ok(ConnectorCategory::Other),
            _ => Err(ConnectorError::Configuration(format!(
                "invalid connector category '{s}', expected one of: structured, unstructured, other"
            ))),
        }
    }
}

/// Transport protocol a connector speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// JDBC-style database wire protocol.
    Jdbc,
    /// Apache Thrift.
    Thrift,
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
}

impl Protocol {
    /// Returns the stable tag of this protocol.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Protocol::Jdbc => "jdbc",
            Protocol::Thrift => "thrift",
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }

    /// Parses a comma-separated protocol list such as `"jdbc,thrift"`.
    ///
    /// Order is preserved and duplicates are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Configuration` on an unknown tag.
    pub fn parse_list(list: &str) -> Result<Vec<Protocol>> {
        let mut out = Vec::new();
        for tag in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let p: Protocol = tag.parse()?;
            if !out.contains(&p) {
                out.push(p);
            }
        }
        Ok(out)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jdbc" => Ok(Protocol::Jdbc),
            "thrift" => Ok(Protocol::Thrift),
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            _ => Err(ConnectorError::Configuration(format!(
                "invalid protocol '{s}', expected one of: jdbc, thrift, http, https"
            ))),
        }
    }
}

/// Identity and metadata of one connector type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectorIdentity {
    /// Broad family of the connector.
    pub category: ConnectorCategory,
    /// Stable lowercase dispatch key (e.g. `"mysql"`).
    pub type_key: String,
    /// Human label (e.g. `"MySQL"`).
    pub display_name: String,
    /// Supported transport protocols, in declaration order.
    pub protocols: Vec<Protocol>,
}

impl ConnectorIdentity {
    /// Creates a new identity. The type key is normalized with
    /// [`normalize_key`].
    #[must_use]
    pub fn new(
        category: ConnectorCategory,
        type_key: impl Into<String>,
        display_name: impl Into<String>,
        protocols: impl Into<Vec<Protocol>>,
    ) -> Self {
        Self {
            category,
            type_key: normalize_key(&type_key.into()),
            display_name: display_name.into(),
            protocols: protocols.into(),
        }
    }

    /// Returns true if the connector declares the given protocol.
    #[must_use]
    pub fn supports(&self, protocol: Protocol) -> bool {
        self.protocols.contains(&protocol)
    }
}

impl fmt::Display for ConnectorIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.type_key)
    }
}

/// Canonical form of a type key: surrounding whitespace removed, ASCII
/// lowercase. Every type key comparison in the crate goes through this.
#[must_use]
pub fn normalize_key(type_key: &str) -> String {
    type_key.trim().to_ascii_lowercase()
}

/// Type keys enabled without the optional query engine package.
pub const BASELINE_CONNECTORS: &[&str] = &["mysql", "maria", "opensearch"];

fn builtin_entries() -> Vec<ConnectorIdentity> {
    use ConnectorCategory::{Other, Structured, Unstructured};
    use Protocol::{Http, Https, Jdbc, Thrift};

    vec![
        // structured
        ConnectorIdentity::new(Structured, "mysql", "MySQL", [Jdbc]),
        ConnectorIdentity::new(Structured, "maria", "MariaDB", [Jdbc]),
        ConnectorIdentity::new(Structured, "oracle", "Oracle", [Jdbc]),
        ConnectorIdentity::new(Structured, "postgresql", "PostgreSQL", [Jdbc]),
        ConnectorIdentity::new(Structured, "sqlserver", "SQL Server", [Jdbc]),
        ConnectorIdentity::new(Structured, "doris", "Apache Doris", [Jdbc]),
        ConnectorIdentity::new(Structured, "hologres", "Hologres", [Jdbc]),
        ConnectorIdentity::new(Structured, "opengauss", "OpenGauss", [Jdbc]),
        ConnectorIdentity::new(Structured, "dameng", "Dameng", [Jdbc]),
        ConnectorIdentity::new(Structured, "gaussdb", "GaussDB", [Jdbc]),
        ConnectorIdentity::new(Structured, "mongodb", "MongoDB", [Jdbc]),
        ConnectorIdentity::new(Structured, "hive", "Apache Hive", [Jdbc, Thrift]),
        ConnectorIdentity::new(Structured, "clickhouse", "ClickHouse", [Jdbc]),
        ConnectorIdentity::new(Structured, "inceptor-jdbc", "TDH Inceptor", [Jdbc]),
        ConnectorIdentity::new(Structured, "maxcompute", "MaxCompute", [Https]),
        // unstructured
        ConnectorIdentity::new(Unstructured, "excel", "Excel", [Https, Http]),
        ConnectorIdentity::new(Unstructured, "anyshare7", "AnyShare 7.0", [Https]),
        // other
        ConnectorIdentity::new(Other, "tingyun", "听云", [Https, Http]),
        ConnectorIdentity::new(Other, "opensearch", "OpenSearch", [Https, Http]),
    ]
}

/// Read-only table of known connector identities.
///
/// Lookups are case-insensitive on the type key. Iteration follows
/// declaration order.
#[derive(Debug, Clone)]
pub struct ConnectorCatalog {
    entries: Vec<ConnectorIdentity>,
    index: HashMap<String, usize>,
}

impl ConnectorCatalog {
    /// Builds a catalog from the given entries.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::DuplicateConnectorType` if two entries share
    /// a type key (compared case-insensitively), or
    /// `ConnectorError::Configuration` for an empty type key.
    pub fn new(entries: impl IntoIterator<Item = ConnectorIdentity>) -> Result<Self> {
        let mut catalog = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        for entry in entries {
            catalog.push(entry)?;
        }
        Ok(catalog)
    }

    /// Returns the shared builtin catalog.
    #[must_use]
    pub fn builtin() -> Arc<ConnectorCatalog> {
        static BUILTIN: OnceLock<Arc<ConnectorCatalog>> = OnceLock::new();
        BUILTIN
            .get_or_init(|| {
                let entries = builtin_entries();
                let index = entries
                    .iter()
                    .enumerate()
                    .map(|(i, e)| (e.type_key.clone(), i))
                    .collect();
                Arc::new(ConnectorCatalog { entries, index })
            })
            .clone()
    }

    /// Returns a new catalog with `extra` appended to this one.
    ///
    /// # Errors
    ///
    /// Same as [`ConnectorCatalog::new`].
    pub fn extended_with(
        &self,
        extra: impl IntoIterator<Item = ConnectorIdentity>,
    ) -> Result<Self> {
        let mut catalog = self.clone();
        for entry in extra {
            catalog.push(entry)?;
        }
        Ok(catalog)
    }

    fn push(&mut self, mut entry: ConnectorIdentity) -> Result<()> {
        entry.type_key = normalize_key(&entry.type_key);
        if entry.type_key.is_empty() {
            return Err(ConnectorError::Configuration(
                "connector type key must not be empty".into(),
            ));
        }
        if self.index.contains_key(&entry.type_key) {
            return Err(ConnectorError::DuplicateConnectorType(entry.type_key));
        }
        self.index.insert(entry.type_key.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Resolves a type key to its identity.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::UnknownConnectorType` if no entry matches.
    pub fn resolve(&self, type_key: &str) -> Result<&ConnectorIdentity> {
        self.get(type_key)
            .ok_or_else(|| ConnectorError::UnknownConnectorType(type_key.to_string()))
    }

    /// Returns the identity for a type key, if cataloged.
    #[must_use]
    pub fn get(&self, type_key: &str) -> Option<&ConnectorIdentity> {
        self.index
            .get(&normalize_key(type_key))
            .map(|&i| &self.entries[i])
    }

    /// Returns true if the type key is cataloged.
    #[must_use]
    pub fn contains(&self, type_key: &str) -> bool {
        self.get(type_key).is_some()
    }

    /// Returns every known type key.
    #[must_use]
    pub fn all_type_keys(&self) -> BTreeSet<String> {
        self.entries.iter().map(|e| e.type_key.clone()).collect()
    }

    /// Iterates over all identities in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ConnectorIdentity> {
        self.entries.iter()
    }

    /// Iterates over the identities of one category.
    pub fn by_category(
        &self,
        category: ConnectorCategory,
    ) -> impl Iterator<Item = &ConnectorIdentity> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    /// Iterates over the identities that speak the given protocol.
    pub fn with_protocol(&self, protocol: Protocol) -> impl Iterator<Item = &ConnectorIdentity> {
        self.entries.iter().filter(move |e| e.supports(protocol))
    }

    /// Returns the number of cataloged connectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_unique_keys() {
        let catalog = ConnectorCatalog::builtin();
        assert_eq!(catalog.len(), 19);
        assert_eq!(catalog.all_type_keys().len(), catalog.len());
        // rebuilding through the checked path must not report duplicates
        assert!(ConnectorCatalog::new(builtin_entries()).is_ok());
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let catalog = ConnectorCatalog::builtin();
        let a = catalog.resolve("MySQL").unwrap();
        let b = catalog.resolve("mysql").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.display_name, "MySQL");
        assert_eq!(a.category, ConnectorCategory::Structured);
    }

    #[test]
    fn test_resolve_ignores_surrounding_whitespace() {
        let catalog = ConnectorCatalog::builtin();
        assert_eq!(normalize_key("  Inceptor-JDBC\t"), "inceptor-jdbc");
        assert_eq!(catalog.resolve(" hive ").unwrap().type_key, "hive");
        assert!(catalog.contains("OpenSearch\n"));
    }

    #[test]
    fn test_builtin_display_names() {
        let catalog = ConnectorCatalog::builtin();
        assert_eq!(catalog.resolve("tingyun").unwrap().display_name, "听云");
        assert_eq!(catalog.resolve("anyshare7").unwrap().display_name, "AnyShare 7.0");
    }

    #[test]
    fn test_resolve_unknown() {
        let err = ConnectorCatalog::builtin().resolve("db2").unwrap_err();
        assert!(matches!(err, ConnectorError::UnknownConnectorType(ref k) if k == "db2"));
    }

    #[test]
    fn test_multi_protocol_connectors() {
        let catalog = ConnectorCatalog::builtin();
        let hive = catalog.resolve("hive").unwrap();
        assert_eq!(hive.protocols, vec![Protocol::Jdbc, Protocol::Thrift]);

        let thrift: Vec<_> = catalog
            .with_protocol(Protocol::Thrift)
            .map(|e| e.type_key.as_str())
            .collect();
        assert_eq!(thrift, vec!["hive"]);
    }

    #[test]
    fn test_by_category() {
        let catalog = ConnectorCatalog::builtin();
        let unstructured: Vec<_> = catalog
            .by_category(ConnectorCategory::Unstructured)
            .map(|e| e.type_key.as_str())
            .collect();
        assert_eq!(unstructured, vec!["excel", "anyshare7"]);
        assert_eq!(catalog.by_category(ConnectorCategory::Structured).count(), 15);
    }

    #[test]
    fn test_baseline_keys_are_cataloged() {
        let catalog = ConnectorCatalog::builtin();
        for key in BASELINE_CONNECTORS {
            assert!(catalog.contains(key), "{key} missing from catalog");
        }
    }

    #[test]
    fn test_duplicate_rejected_case_insensitively() {
        let result = ConnectorCatalog::new([
            ConnectorIdentity::new(ConnectorCategory::Other, "acme", "Acme", [Protocol::Http]),
            ConnectorIdentity {
                category: ConnectorCategory::Other,
                type_key: "ACME".into(),
                display_name: "Acme 2".into(),
                protocols: vec![Protocol::Https],
            },
        ]);
        assert!(matches!(
            result,
            Err(ConnectorError::DuplicateConnectorType(ref k)) if k == "acme"
        ));
    }

    #[test]
    fn test_extended_with() {
        let extra = ConnectorIdentity::new(
            ConnectorCategory::Other,
            "indexbase",
            "IndexBase",
            [Protocol::Https, Protocol::Http],
        );
        let catalog = ConnectorCatalog::builtin().extended_with([extra]).unwrap();
        assert_eq!(catalog.len(), 20);
        assert!(catalog.contains("IndexBase"));

        let dup = ConnectorIdentity::new(ConnectorCategory::Other, "mysql", "x", [Protocol::Jdbc]);
        assert!(ConnectorCatalog::builtin().extended_with([dup]).is_err());
    }

    #[test]
    fn test_parse_protocol_list() {
        assert_eq!(
            Protocol::parse_list("https, http,https").unwrap(),
            vec![Protocol::Https, Protocol::Http]
        );
        assert!(Protocol::parse_list("jdbc,ftp").is_err());
    }

    #[test]
    fn test_category_parse_accepts_legacy_tag() {
        assert_eq!(
            "no-structured".parse::<ConnectorCategory>().unwrap(),
            ConnectorCategory::Unstructured
        );
        assert!("bogus".parse::<ConnectorCategory>().is_err());
    }

    #[test]
    fn test_identity_serde() {
        let json = r#"{"category":"no-structured","type_key":"box","display_name":"Box","protocols":["https"]}"#;
        let identity: ConnectorIdentity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.category, ConnectorCategory::Unstructured);
        let out = serde_json::to_string(&identity).unwrap();
        assert!(out.contains(r#""category":"unstructured""#));
    }
}
