//! # Dataconn Connectors
//!
//! Pluggable connector abstraction for testing and describing connections
//! to external data sources (relational databases, document stores,
//! HTTP-based sources) through one uniform contract, gated by product
//! edition.
//!
//! - [`catalog`] - Known connector types and their metadata
//! - [`gate`] - Edition-based availability (`CapabilityGate`)
//! - [`driver`] - The `ConnectorDriver` trait concrete connectors implement
//! - [`registry`] - Driver binding and dispatch (`DriverRegistry`)
//! - [`config`] - Opaque connection parameters handed to drivers
//! - [`params`] - Structural parameter checks for drivers
//! - [`masking`] - Secret redaction for logs and URL templates
//! - [`settings`] - TOML registry settings
//! - [`testing`] - Mock drivers and test helpers
//!
//! ## Architecture
//!
//! ```text
//! caller ──> DriverRegistry ──> CapabilityGate ──> ConnectorCatalog
//!                 │
//!                 └──> ConnectorDriver (mysql, hive, opensearch, ...)
//! ```
//!
//! The core only validates connectivity and parameter legality. It moves
//! no data and stores no credentials.

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::too_many_lines))]

/// Connector error types.
pub mod error;

/// Connector catalog.
pub mod catalog;

/// Edition-based capability gate.
pub mod gate;

/// Connection configuration handed to drivers.
pub mod config;

/// Connector driver trait.
pub mod driver;

/// Driver registry and dispatch.
pub mod registry;

/// Connection parameter validation helpers.
pub mod params;

/// Secret masking.
pub mod masking;

/// Registry settings.
pub mod settings;

/// Testing utilities (mock drivers, helpers).
pub mod testing;

pub use catalog::{normalize_key, ConnectorCatalog, ConnectorCategory, ConnectorIdentity, Protocol};
pub use config::ConnectionConfig;
pub use driver::ConnectorDriver;
pub use error::{ConnectorError, ErrorKind, ParamViolation, Result};
pub use gate::{CapabilityGate, Edition};
pub use registry::{ConnectorDescriptor, DriverBinding, DriverRegistry, DEFAULT_TEST_TIMEOUT};
pub use settings::RegistrySettings;

// Re-export async_trait for driver implementors
pub use async_trait::async_trait;
