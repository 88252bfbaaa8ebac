//! Driver contract for connector implementations.
//!
//! Every concrete connector (MySQL, Hive, OpenSearch, ...) plugs into the
//! [`DriverRegistry`](crate::registry::DriverRegistry) by implementing
//! [`ConnectorDriver`]. Drivers only check connectivity and parameter
//! legality; they never move data.

use async_trait::async_trait;

use crate::config::ConnectionConfig;
use crate::error::ConnectorError;

/// Connectivity test and parameter validation for one connector type.
///
/// # Contract
///
/// - [`supported_type`](Self::supported_type) returns the lowercase catalog
///   key the driver serves. The registry binds drivers by this key.
/// - [`validate_params`](Self::validate_params) is synchronous and performs
///   no I/O. Callers run it before a connection test to fail fast.
/// - [`test_connection`](Self::test_connection) opens a connection and
///   releases it before returning, on every path. The registry may drop
///   the future on timeout, so sockets must be owned by values that close
///   on drop.
/// - Transport errors are mapped into [`ConnectorError::ConnectionError`];
///   transport-native error types never cross this boundary except as the
///   boxed `source`.
/// - [`url_template`](Self::url_template) never contains live credentials.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug)]
/// struct MySqlDriver;
///
/// #[async_trait]
/// impl ConnectorDriver for MySqlDriver {
///     fn supported_type(&self) -> &str {
///         "mysql"
///     }
///
///     async fn test_connection(&self, config: &ConnectionConfig) -> Result<bool, ConnectorError> {
///         let conn = connect(config)
///             .await
///             .map_err(|e| ConnectorError::connection("mysql", "connect failed", e))?;
///         conn.ping().await.map_err(|e| ConnectorError::connection("mysql", "ping failed", e))?;
///         Ok(true) // `conn` dropped here
///     }
///
///     fn validate_params(&self, config: &ConnectionConfig) -> Result<(), ConnectorError> {
///         ParamValidator::new("mysql", config)
///             .require_host("host")
///             .require_port("port")
///             .require("username")
///             .finish()
///     }
///
///     fn url_template(&self) -> String {
///         "jdbc:mysql://{host}:{port}/{database}".into()
///     }
/// }
/// ```
#[async_trait]
pub trait ConnectorDriver: Send + Sync {
    /// Returns the catalog type key this driver serves.
    fn supported_type(&self) -> &str;

    /// Opens and immediately releases a connection described by `config`.
    ///
    /// Returns `Ok(true)` only after a full round trip succeeded.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::ConnectionError` on any network,
    /// authentication or protocol failure.
    async fn test_connection(&self, config: &ConnectionConfig) -> Result<bool, ConnectorError>;

    /// Checks that `config` is structurally valid without touching the network.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::InvalidConnectionParams` naming the
    /// offending fields.
    fn validate_params(&self, config: &ConnectionConfig) -> Result<(), ConnectorError>;

    /// Returns a redacted, human-readable connection string pattern.
    fn url_template(&self) -> String;
}
