//! Connector error types.
//!
//! Provides a single error hierarchy for catalog, gate, registry and driver
//! operations:
//! - `ConnectorError`: every failure surfaced to callers
//! - `ErrorKind`: a copyable classification for rendering messages
//! - `ParamViolation`: one offending connection parameter

use std::fmt;

use thiserror::Error;

/// Boxed transport error carried by [`ConnectorError::ConnectionError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T, E = ConnectorError> = std::result::Result<T, E>;

/// Errors that can occur while resolving, gating or driving a connector.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The type key is absent from the catalog.
    #[error("unknown connector type: '{0}'")]
    UnknownConnectorType(String),

    /// The type key is cataloged but disabled under the current edition.
    #[error(
        "connector '{display_name}' is not supported in the current installation; \
         install the optional query engine package to enable it"
    )]
    ConnectorNotLicensed {
        /// The requested type key.
        type_key: String,
        /// Human label of the connector, for upgrade prompts.
        display_name: String,
    },

    /// The type key is cataloged and enabled but no driver is registered.
    #[error("unsupported connector type: '{0}' (no driver registered)")]
    UnsupportedConnectorType(String),

    /// Structural validation of the connection parameters failed.
    #[error("invalid connection parameters for '{connector}': {}", DisplayViolations(.violations))]
    InvalidConnectionParams {
        /// The connector whose parameters were rejected.
        connector: String,
        /// Every offending field.
        violations: Vec<ParamViolation>,
    },

    /// Network, authentication or protocol failure during a connection attempt.
    #[error("connection to '{connector}' failed: {message}")]
    ConnectionError {
        /// The connector that failed.
        connector: String,
        /// Summary of the failure.
        message: String,
        /// The underlying transport error, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// A connection test did not finish in time.
    #[error("connection test for '{connector}' timed out after {timeout_ms}ms")]
    Timeout {
        /// The connector under test.
        connector: String,
        /// The timeout that elapsed.
        timeout_ms: u64,
    },

    /// Two catalog entries share a type key.
    #[error("duplicate connector type in catalog: '{0}'")]
    DuplicateConnectorType(String),

    /// Invalid registry settings.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An I/O error while reading settings.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Classification of a [`ConnectorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`ConnectorError::UnknownConnectorType`].
    UnknownConnectorType,
    /// See [`ConnectorError::ConnectorNotLicensed`].
    ConnectorNotLicensed,
    /// See [`ConnectorError::UnsupportedConnectorType`].
    UnsupportedConnectorType,
    /// See [`ConnectorError::InvalidConnectionParams`].
    InvalidConnectionParams,
    /// See [`ConnectorError::ConnectionError`].
    ConnectionError,
    /// See [`ConnectorError::Timeout`].
    Timeout,
    /// See [`ConnectorError::DuplicateConnectorType`].
    DuplicateConnectorType,
    /// Settings or I/O failures.
    Configuration,
}

impl ConnectorError {
    /// Builds a [`ConnectorError::ConnectionError`] wrapping a transport error.
    pub fn connection(
        connector: impl Into<String>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        ConnectorError::ConnectionError {
            connector: connector.into(),
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Builds a [`ConnectorError::ConnectionError`] with no underlying error.
    pub fn connection_msg(connector: impl Into<String>, message: impl Into<String>) -> Self {
        ConnectorError::ConnectionError {
            connector: connector.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Builds a [`ConnectorError::InvalidConnectionParams`] for a single field.
    pub fn invalid_param(
        connector: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConnectorError::InvalidConnectionParams {
            connector: connector.into(),
            violations: vec![ParamViolation::new(field, reason)],
        }
    }

    /// Returns the classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConnectorError::UnknownConnectorType(_) => ErrorKind::UnknownConnectorType,
            ConnectorError::ConnectorNotLicensed { .. } => ErrorKind::ConnectorNotLicensed,
            ConnectorError::UnsupportedConnectorType(_) => ErrorKind::UnsupportedConnectorType,
            ConnectorError::InvalidConnectionParams { .. } => ErrorKind::InvalidConnectionParams,
            ConnectorError::ConnectionError { .. } => ErrorKind::ConnectionError,
            ConnectorError::Timeout { .. } => ErrorKind::Timeout,
            ConnectorError::DuplicateConnectorType(_) => ErrorKind::DuplicateConnectorType,
            ConnectorError::Configuration(_) | ConnectorError::Io(_) => ErrorKind::Configuration,
        }
    }

    /// Returns the connector type key this error is about, if any.
    #[must_use]
    pub fn connector(&self) -> Option<&str> {
        match self {
            ConnectorError::UnknownConnectorType(key)
            | ConnectorError::UnsupportedConnectorType(key)
            | ConnectorError::DuplicateConnectorType(key)
            | ConnectorError::ConnectorNotLicensed { type_key: key, .. }
            | ConnectorError::InvalidConnectionParams { connector: key, .. }
            | ConnectorError::ConnectionError { connector: key, .. }
            | ConnectorError::Timeout { connector: key, .. } => Some(key.as_str()),
            ConnectorError::Configuration(_) | ConnectorError::Io(_) => None,
        }
    }

    /// Returns the offending field names of an `InvalidConnectionParams` error.
    #[must_use]
    pub fn invalid_fields(&self) -> Vec<&str> {
        match self {
            ConnectorError::InvalidConnectionParams { violations, .. } => {
                violations.iter().map(|v| v.field.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// A single rejected connection parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamViolation {
    /// The parameter name.
    pub field: String,
    /// Why it was rejected.
    pub reason: String,
}

impl ParamViolation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ParamViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

struct DisplayViolations<'a>(&'a [ParamViolation]);

impl fmt::Display for DisplayViolations<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}
