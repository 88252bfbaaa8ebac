//! Edition-based connector availability.
//!
//! The [`CapabilityGate`] decides whether a cataloged connector may be used
//! in the current installation. Unknown keys and known-but-disabled keys are
//! reported as different errors so callers can tell a typo from an upsell.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{normalize_key, ConnectorCatalog, ConnectorIdentity, BASELINE_CONNECTORS};
use crate::error::{ConnectorError, Result};

/// Product edition of the running installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    /// Free edition: only the allow-listed connectors are enabled.
    #[default]
    Baseline,
    /// The optional query engine package is installed: every cataloged
    /// connector is enabled.
    Extended,
}

impl Edition {
    /// Returns the stable tag of this edition.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Edition::Baseline => "baseline",
            Edition::Extended => "extended",
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Edition {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "baseline" => Ok(Edition::Baseline),
            "extended" => Ok(Edition::Extended),
            _ => Err(ConnectorError::Configuration(format!(
                "invalid edition '{s}', expected one of: baseline, extended"
            ))),
        }
    }
}

/// Decides which cataloged connectors are enabled.
#[derive(Debug, Clone)]
pub struct CapabilityGate {
    catalog: Arc<ConnectorCatalog>,
    edition: Edition,
    allow_list: HashSet<String>,
}

impl CapabilityGate {
    /// Creates a gate for `edition` using the baseline allow-list.
    #[must_use]
    pub fn new(catalog: Arc<ConnectorCatalog>, edition: Edition) -> Self {
        Self::with_allow_list(catalog, edition, BASELINE_CONNECTORS.iter().copied())
    }

    /// Creates a gate with a custom allow-list.
    ///
    /// The allow-list only matters under [`Edition::Baseline`]. Keys are
    /// normalized with [`normalize_key`].
    #[must_use]
    pub fn with_allow_list<I, S>(catalog: Arc<ConnectorCatalog>, edition: Edition, allow: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            catalog,
            edition,
            allow_list: allow
                .into_iter()
                .map(|k| normalize_key(k.as_ref()))
                .collect(),
        }
    }

    /// Creates a gate that enables every connector of `catalog`.
    #[must_use]
    pub fn unrestricted(catalog: Arc<ConnectorCatalog>) -> Self {
        Self::new(catalog, Edition::Extended)
    }

    /// Checks that `type_key` is cataloged and enabled.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::UnknownConnectorType` if the key is not
    /// cataloged, or `ConnectorError::ConnectorNotLicensed` (carrying the
    /// display name) if it is disabled under the current edition.
    pub fn check_enabled(&self, type_key: &str) -> Result<&ConnectorIdentity> {
        let identity = self.catalog.resolve(type_key)?;
        if self.allows(identity) {
            Ok(identity)
        } else {
            Err(ConnectorError::ConnectorNotLicensed {
                type_key: identity.type_key.clone(),
                display_name: identity.display_name.clone(),
            })
        }
    }

    /// Returns true if `type_key` is cataloged and enabled.
    #[must_use]
    pub fn is_enabled(&self, type_key: &str) -> bool {
        self.check_enabled(type_key).is_ok()
    }

    fn allows(&self, identity: &ConnectorIdentity) -> bool {
        match self.edition {
            Edition::Extended => true,
            Edition::Baseline => self.allow_list.contains(&identity.type_key),
        }
    }

    /// Iterates over every enabled identity in catalog order.
    pub fn enabled_identities(&self) -> impl Iterator<Item = &ConnectorIdentity> {
        self.catalog.iter().filter(|e| self.allows(e))
    }

    /// Returns the keys of every enabled connector.
    #[must_use]
    pub fn enabled_type_keys(&self) -> BTreeSet<String> {
        self.enabled_identities()
            .map(|e| e.type_key.clone())
            .collect()
    }

    /// Returns the catalog this gate resolves against.
    #[must_use]
    pub fn catalog(&self) -> &Arc<ConnectorCatalog> {
        &self.catalog
    }

    /// Returns the configured edition.
    #[must_use]
    pub fn edition(&self) -> Edition {
        self.edition
    }
}
