//! Testing utilities for driver implementations.
//!
//! Provides a scriptable [`MockDriver`] and helpers for testing the
//! registry and code that depends on it.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::catalog::ConnectorCatalog;
use crate::config::ConnectionConfig;
use crate::driver::ConnectorDriver;
use crate::error::{ConnectorError, ParamViolation};
use crate::gate::{CapabilityGate, Edition};
use crate::registry::DriverRegistry;

/// What a [`MockDriver`] connection test does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectBehavior {
    /// The round trip succeeds.
    Succeed,
    /// The server answers but the check is negative.
    Reject,
    /// The attempt fails with a connection-refused transport error.
    Fail(String),
}

/// Scriptable driver for tests.
///
/// Counts calls, remembers the last config it saw and tracks how many
/// simulated connections are open, so tests can check that cancelled
/// attempts release their connection.
#[derive(Debug)]
pub struct MockDriver {
    type_key: String,
    behavior: ConnectBehavior,
    violations: Vec<ParamViolation>,
    template: String,
    latency: Option<Duration>,
    test_calls: AtomicU64,
    validate_calls: AtomicU64,
    open_connections: Arc<AtomicI64>,
    last_config: Mutex<Option<ConnectionConfig>>,
}

impl MockDriver {
    /// Creates a mock that connects successfully and accepts any params.
    #[must_use]
    pub fn new(type_key: impl Into<String>) -> Self {
        let type_key = type_key.into();
        let template = format!("{type_key}://{{host}}:{{port}}/{{database}}");
        Self {
            type_key,
            behavior: ConnectBehavior::Succeed,
            violations: Vec::new(),
            template,
            latency: None,
            test_calls: AtomicU64::new(0),
            validate_calls: AtomicU64::new(0),
            open_connections: Arc::new(AtomicI64::new(0)),
            last_config: Mutex::new(None),
        }
    }

    /// Sets the connection test behavior.
    #[must_use]
    pub fn with_behavior(mut self, behavior: ConnectBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Makes `validate_params` reject `field` with `reason`.
    #[must_use]
    pub fn with_violation(mut self, field: &str, reason: &str) -> Self {
        self.violations.push(ParamViolation::new(field, reason));
        self
    }

    /// Overrides the URL template.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Holds the simulated connection open for `latency` before answering.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of `test_connection` calls so far.
    #[must_use]
    pub fn test_calls(&self) -> u64 {
        self.test_calls.load(Ordering::Relaxed)
    }

    /// Number of `validate_params` calls so far.
    #[must_use]
    pub fn validate_calls(&self) -> u64 {
        self.validate_calls.load(Ordering::Relaxed)
    }

    /// Number of simulated connections currently open.
    #[must_use]
    pub fn open_connections(&self) -> i64 {
        self.open_connections.load(Ordering::SeqCst)
    }

    /// The config passed to the most recent call.
    #[must_use]
    pub fn last_config(&self) -> Option<ConnectionConfig> {
        self.last_config.lock().clone()
    }
}

/// A simulated connection, closed on drop.
struct MockConnection(Arc<AtomicI64>);

impl MockConnection {
    fn open(counter: &Arc<AtomicI64>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectorDriver for MockDriver {
    fn supported_type(&self) -> &str {
        &self.type_key
    }

    async fn test_connection(&self, config: &ConnectionConfig) -> Result<bool, ConnectorError> {
        self.test_calls.fetch_add(1, Ordering::Relaxed);
        *self.last_config.lock() = Some(config.clone());

        let _conn = MockConnection::open(&self.open_connections);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match &self.behavior {
            ConnectBehavior::Succeed => Ok(true),
            ConnectBehavior::Reject => Ok(false),
            ConnectBehavior::Fail(message) => Err(ConnectorError::connection(
                self.type_key.clone(),
                message.clone(),
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            )),
        }
    }

    fn validate_params(&self, config: &ConnectionConfig) -> Result<(), ConnectorError> {
        self.validate_calls.fetch_add(1, Ordering::Relaxed);
        *self.last_config.lock() = Some(config.clone());

        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ConnectorError::InvalidConnectionParams {
                connector: self.type_key.clone(),
                violations: self.violations.clone(),
            })
        }
    }

    fn url_template(&self) -> String {
        self.template.clone()
    }
}

/// Gate over the builtin catalog with the baseline allow-list.
#[must_use]
pub fn baseline_gate() -> CapabilityGate {
    CapabilityGate::new(ConnectorCatalog::builtin(), Edition::Baseline)
}

/// Registry over `gate`, initialized with `drivers`, with no default timeout.
#[must_use]
pub fn registry_with(gate: CapabilityGate, drivers: &[Arc<MockDriver>]) -> DriverRegistry {
    let mut registry = DriverRegistry::new(gate).with_default_timeout(None);
    registry.initialize(
        drivers
            .iter()
            .map(|d| Arc::clone(d) as Arc<dyn ConnectorDriver>),
    );
    registry
}

/// A config with typical JDBC parameters and a password.
#[must_use]
pub fn sample_config() -> ConnectionConfig {
    ConnectionConfig::new()
        .with("host", "db.example.com")
        .with("port", "3306")
        .with("database", "sales")
        .with("username", "etl")
        .with("password", "s3cret")
}
