//! Registry settings.
//!
//! [`RegistrySettings`] is loaded from TOML at process start and describes
//! the edition, the baseline allow-list, the default connection test
//! timeout and any connectors cataloged in addition to the builtin table.
//!
//! ## Example
//!
//! ```toml
//! edition = "baseline"
//! allow_list = ["mysql", "maria", "opensearch"]
//! test_timeout_ms = 30000   # 0 disables the timeout
//!
//! [[extra_connectors]]
//! category = "other"
//! type_key = "indexbase"
//! display_name = "IndexBase"
//! protocols = ["https", "http"]
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalog::{ConnectorCatalog, ConnectorIdentity};
use crate::error::{ConnectorError, Result};
use crate::gate::{CapabilityGate, Edition};
use crate::registry::DEFAULT_TEST_TIMEOUT;

fn default_timeout_ms() -> u64 {
    u64::try_from(DEFAULT_TEST_TIMEOUT.as_millis()).unwrap_or(u64::MAX)
}

/// Settings for building a [`DriverRegistry`](crate::registry::DriverRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistrySettings {
    /// Installed product edition.
    pub edition: Edition,

    /// Connectors enabled under [`Edition::Baseline`]. `None` keeps the
    /// builtin baseline list.
    pub allow_list: Option<Vec<String>>,

    /// Default connection test timeout in milliseconds; `0` disables it.
    pub test_timeout_ms: u64,

    /// Connectors cataloged in addition to the builtin table.
    pub extra_connectors: Vec<ConnectorIdentity>,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            edition: Edition::Baseline,
            allow_list: None,
            test_timeout_ms: default_timeout_ms(),
            extra_connectors: Vec::new(),
        }
    }
}

impl RegistrySettings {
    /// Parses settings from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Configuration` on malformed TOML, unknown
    /// keys or invalid values.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input)
            .map_err(|e| ConnectorError::Configuration(format!("invalid registry settings: {e}")))
    }

    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::Io` if the file cannot be read, or the
    /// errors of [`RegistrySettings::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Returns the default test timeout, or `None` if disabled.
    #[must_use]
    pub fn test_timeout(&self) -> Option<Duration> {
        (self.test_timeout_ms > 0).then(|| Duration::from_millis(self.test_timeout_ms))
    }

    /// Builds the catalog: builtin entries followed by `extra_connectors`.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::DuplicateConnectorType` if an extra entry
    /// reuses a type key.
    pub fn build_catalog(&self) -> Result<Arc<ConnectorCatalog>> {
        let builtin = ConnectorCatalog::builtin();
        if self.extra_connectors.is_empty() {
            return Ok(builtin);
        }
        Ok(Arc::new(
            builtin.extended_with(self.extra_connectors.iter().cloned())?,
        ))
    }

    /// Builds the capability gate over [`RegistrySettings::build_catalog`].
    ///
    /// # Errors
    ///
    /// Same as [`RegistrySettings::build_catalog`].
    pub fn build_gate(&self) -> Result<CapabilityGate> {
        let catalog = self.build_catalog()?;
        Ok(match &self.allow_list {
            Some(allow) => CapabilityGate::with_allow_list(catalog, self.edition, allow),
            None => CapabilityGate::new(catalog, self.edition),
        })
    }
}
