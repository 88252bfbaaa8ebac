//! Driver registry and dispatch.
//!
//! The [`DriverRegistry`] binds every available [`ConnectorDriver`] to its
//! type key once at startup and routes test/validate/describe calls to it.
//!
//! Dispatch for `test_connection` and `validate_connection_params` runs in
//! a fixed order, so a gated or unknown type never reaches a driver:
//!
//! ```text
//! type key ──> catalog ──> gate ──> binding ──> driver
//!              Unknown     NotLicensed  Unsupported
//! ```
//!
//! `initialize` takes `&mut self`; once the registry is shared (typically
//! behind an `Arc`) the index is read-only and needs no locking.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{normalize_key, ConnectorIdentity};
use crate::config::ConnectionConfig;
use crate::driver::ConnectorDriver;
use crate::error::{ConnectorError, Result};
use crate::gate::CapabilityGate;
use crate::masking::SecretMasker;
use crate::settings::RegistrySettings;

/// Default time limit for a single connection test.
pub const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Association between a type key and the driver serving it.
#[derive(Clone)]
pub struct DriverBinding {
    type_key: String,
    driver: Arc<dyn ConnectorDriver>,
}

impl DriverBinding {
    /// The normalized type key.
    #[must_use]
    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    /// The bound driver.
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn ConnectorDriver> {
        &self.driver
    }
}

impl std::fmt::Debug for DriverBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverBinding")
            .field("type_key", &self.type_key)
            .finish_non_exhaustive()
    }
}

/// Catalog, gate and driver view of one connector, for listing UIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectorDescriptor {
    /// Catalog identity.
    #[serde(flatten)]
    pub identity: ConnectorIdentity,
    /// Whether the current edition enables the connector.
    pub enabled: bool,
    /// Whether a driver is bound to the type key.
    pub driver_registered: bool,
    /// Redacted URL template of the bound driver.
    pub url_template: Option<String>,
}

/// Registry of connector drivers, indexed by type key.
///
/// # Example
///
/// ```rust,ignore
/// let gate = CapabilityGate::new(ConnectorCatalog::builtin(), Edition::Baseline);
/// let mut registry = DriverRegistry::new(gate);
/// registry.initialize(vec![Arc::new(MySqlDriver) as Arc<dyn ConnectorDriver>]);
/// let registry = Arc::new(registry);
///
/// registry.validate_connection_params("mysql", &config)?;
/// let ok = registry.test_connection("mysql", &config).await?;
/// ```
pub struct DriverRegistry {
    gate: CapabilityGate,
    bindings: HashMap<String, DriverBinding>,
    default_timeout: Option<Duration>,
}

impl DriverRegistry {
    /// Creates an empty registry that dispatches through `gate`.
    ///
    /// Connection tests time out after [`DEFAULT_TEST_TIMEOUT`].
    #[must_use]
    pub fn new(gate: CapabilityGate) -> Self {
        Self {
            gate,
            bindings: HashMap::new(),
            default_timeout: Some(DEFAULT_TEST_TIMEOUT),
        }
    }

    /// Creates an empty registry from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings describe an invalid catalog.
    pub fn from_settings(settings: &RegistrySettings) -> Result<Self> {
        Ok(Self::new(settings.build_gate()?).with_default_timeout(settings.test_timeout()))
    }

    /// Sets the default connection test timeout. `None` disables it.
    #[must_use]
    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Builder-style variant of [`DriverRegistry::initialize`].
    #[must_use]
    pub fn with_drivers<I>(mut self, drivers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ConnectorDriver>>,
    {
        self.initialize(drivers);
        self
    }

    /// Binds each driver to its supported type, replacing the whole index.
    ///
    /// A later driver with the same (case-insensitive) type key replaces an
    /// earlier one.
    pub fn initialize<I>(&mut self, drivers: I)
    where
        I: IntoIterator<Item = Arc<dyn ConnectorDriver>>,
    {
        let mut bindings = HashMap::new();
        for driver in drivers {
            let type_key = normalize_key(driver.supported_type());
            if !self.gate.catalog().contains(&type_key) {
                warn!(
                    connector = %type_key,
                    "driver serves a type missing from the catalog, only `lookup` will reach it"
                );
            }
            let binding = DriverBinding {
                type_key: type_key.clone(),
                driver,
            };
            if bindings.insert(type_key.clone(), binding).is_some() {
                warn!(connector = %type_key, "driver binding replaced by a later registration");
            }
            info!(connector = %type_key, "registered connector driver");
        }
        info!(drivers = bindings.len(), "driver registry initialized");
        self.bindings = bindings;
    }

    /// Returns the driver bound to `type_key`, if any.
    ///
    /// Consults bindings only; no catalog or gate check.
    #[must_use]
    pub fn lookup(&self, type_key: &str) -> Option<&Arc<dyn ConnectorDriver>> {
        self.bindings
            .get(&normalize_key(type_key))
            .map(DriverBinding::driver)
    }

    fn resolve(&self, type_key: &str) -> Result<&DriverBinding> {
        let identity = self.gate.check_enabled(type_key).inspect_err(|e| {
            warn!(connector = %type_key, error = %e, "connector rejected before dispatch");
        })?;
        self.bindings.get(&identity.type_key).ok_or_else(|| {
            warn!(connector = %identity.type_key, "no driver registered");
            ConnectorError::UnsupportedConnectorType(identity.type_key.clone())
        })
    }

    /// Tests a connection using the default timeout.
    ///
    /// # Errors
    ///
    /// Returns `UnknownConnectorType`, `ConnectorNotLicensed` or
    /// `UnsupportedConnectorType` before any driver is called, `Timeout`
    /// if the attempt exceeds the default timeout, and the driver's own
    /// error otherwise.
    pub async fn test_connection(&self, type_key: &str, config: &ConnectionConfig) -> Result<bool> {
        self.test_connection_with_timeout(type_key, config, self.default_timeout)
            .await
    }

    /// Tests a connection with an explicit timeout. `None` waits forever.
    ///
    /// On timeout the driver's future is dropped, which cancels the attempt.
    ///
    /// # Errors
    ///
    /// Same as [`DriverRegistry::test_connection`].
    pub async fn test_connection_with_timeout(
        &self,
        type_key: &str,
        config: &ConnectionConfig,
        timeout: Option<Duration>,
    ) -> Result<bool> {
        let binding = self.resolve(type_key)?;
        debug!(connector = %binding.type_key, ?timeout, "testing connection");

        let attempt = binding.driver.test_connection(config);
        let result = match timeout {
            None => attempt.await,
            Some(limit) => match tokio::time::timeout(limit, attempt).await {
                Ok(result) => result,
                Err(_) => Err(ConnectorError::Timeout {
                    connector: binding.type_key.clone(),
                    timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                }),
            },
        };

        match &result {
            Ok(connected) => debug!(connector = %binding.type_key, connected, "connection test finished"),
            Err(e) => debug!(connector = %binding.type_key, error = %e, "connection test failed"),
        }
        result
    }

    /// Validates connection parameters with the bound driver.
    ///
    /// # Errors
    ///
    /// Returns `UnknownConnectorType`, `ConnectorNotLicensed` or
    /// `UnsupportedConnectorType` before any driver is called, and the
    /// driver's `InvalidConnectionParams` otherwise.
    pub fn validate_connection_params(&self, type_key: &str, config: &ConnectionConfig) -> Result<()> {
        let binding = self.resolve(type_key)?;
        debug!(connector = %binding.type_key, "validating connection params");
        binding.driver.validate_params(config)
    }

    /// Returns the bound driver's URL template with credentials removed.
    ///
    /// Returns `None` when no driver is bound; never fails.
    #[must_use]
    pub fn url_template(&self, type_key: &str) -> Option<String> {
        let template = self.lookup(type_key)?.url_template();
        if template.is_empty() {
            None
        } else {
            Some(SecretMasker::redact_url(&template))
        }
    }

    /// Describes one cataloged connector.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::UnknownConnectorType` if the key is not
    /// cataloged.
    pub fn describe(&self, type_key: &str) -> Result<ConnectorDescriptor> {
        let identity = self.gate.catalog().resolve(type_key)?;
        Ok(self.descriptor(identity))
    }

    /// Describes every cataloged connector, in catalog order.
    #[must_use]
    pub fn describe_all(&self) -> Vec<ConnectorDescriptor> {
        self.gate
            .catalog()
            .iter()
            .map(|identity| self.descriptor(identity))
            .collect()
    }

    fn descriptor(&self, identity: &ConnectorIdentity) -> ConnectorDescriptor {
        ConnectorDescriptor {
            identity: identity.clone(),
            enabled: self.gate.is_enabled(&identity.type_key),
            driver_registered: self.bindings.contains_key(&identity.type_key),
            url_template: self.url_template(&identity.type_key),
        }
    }

    /// Returns the bound type keys, sorted.
    #[must_use]
    pub fn registered_types(&self) -> Vec<String> {
        let mut keys: Vec<_> = self.bindings.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Iterates over all bindings in unspecified order.
    pub fn bindings(&self) -> impl Iterator<Item = &DriverBinding> {
        self.bindings.values()
    }

    /// Number of bound drivers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true if no driver is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// The gate used for dispatch.
    #[must_use]
    pub fn gate(&self) -> &CapabilityGate {
        &self.gate
    }

    /// The default connection test timeout.
    #[must_use]
    pub fn default_timeout(&self) -> Option<Duration> {
        self.default_timeout
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("edition", &self.gate.edition())
            .field("drivers", &self.registered_types())
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}
