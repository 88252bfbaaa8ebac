//! Structural checks for connection parameters.
//!
//! [`ParamValidator`] collects every problem with a [`ConnectionConfig`]
//! before failing, so a driver's `validate_params` can report all offending
//! fields at once. No check performs I/O.
//!
//! ```
//! use dataconn_connectors::config::ConnectionConfig;
//! use dataconn_connectors::params::ParamValidator;
//!
//! let config = ConnectionConfig::new().with("host", "db").with("port", "70000");
//! let err = ParamValidator::new("mysql", &config)
//!     .require_host("host")
//!     .require_port("port")
//!     .require("username")
//!     .finish()
//!     .unwrap_err();
//! assert_eq!(err.invalid_fields(), vec!["port", "username"]);
//! ```

use url::{Host, Url};

use crate::config::ConnectionConfig;
use crate::error::{ConnectorError, ParamViolation, Result};

/// Accumulates parameter violations for one connector.
#[derive(Debug)]
#[must_use = "call `finish` to obtain the validation result"]
pub struct ParamValidator<'a> {
    connector: &'a str,
    config: &'a ConnectionConfig,
    violations: Vec<ParamViolation>,
}

impl<'a> ParamValidator<'a> {
    /// Starts validating `config` on behalf of `connector`.
    pub fn new(connector: &'a str, config: &'a ConnectionConfig) -> Self {
        Self {
            connector,
            config,
            violations: Vec::new(),
        }
    }

    fn reject(&mut self, field: &str, reason: impl Into<String>) {
        self.violations.push(ParamViolation::new(field, reason));
    }

    fn value(&mut self, field: &str) -> Option<&'a str> {
        let config: &'a ConnectionConfig = self.config;
        let value = config.get_non_blank(field);
        if value.is_none() {
            self.reject(field, "is required");
        }
        value
    }

    /// Requires a non-blank value.
    pub fn require(mut self, field: &str) -> Self {
        self.value(field);
        self
    }

    /// Requires at least one of `fields` to be non-blank.
    pub fn require_any(mut self, fields: &[&str]) -> Self {
        if !fields.iter().any(|f| self.config.get_non_blank(f).is_some()) {
            let joined = fields.join(", ");
            self.reject(&joined, "at least one is required");
        }
        self
    }

    /// Requires a well-formed host name or IP address.
    pub fn require_host(mut self, field: &str) -> Self {
        if let Some(host) = self.value(field) {
            if let Some(reason) = host_problem(host) {
                self.reject(field, reason);
            }
        }
        self
    }

    /// Requires a port number in `1..=65535`.
    pub fn require_port(mut self, field: &str) -> Self {
        if let Some(port) = self.value(field) {
            self.check_port(field, port);
        }
        self
    }

    /// Checks a port number when present.
    pub fn optional_port(mut self, field: &str) -> Self {
        if let Some(port) = self.config.get_non_blank(field) {
            self.check_port(field, port);
        }
        self
    }

    fn check_port(&mut self, field: &str, port: &str) {
        match port.trim().parse::<u16>() {
            Ok(p) if p > 0 => {}
            _ => self.reject(field, "must be a port number between 1 and 65535"),
        }
    }

    /// Requires an absolute URL whose scheme is one of `schemes`.
    pub fn require_url(mut self, field: &str, schemes: &[&str]) -> Self {
        if let Some(raw) = self.value(field) {
            match Url::parse(raw.trim()) {
                Ok(url) if !schemes.iter().any(|s| s.eq_ignore_ascii_case(url.scheme())) => {
                    self.reject(
                        field,
                        format!(
                            "scheme '{}' not allowed, expected one of: {}",
                            url.scheme(),
                            schemes.join(", ")
                        ),
                    );
                }
                Ok(url) if url.host_str().map_or(true, str::is_empty) => {
                    self.reject(field, "must include a host");
                }
                Ok(_) => {}
                Err(e) => self.reject(field, format!("is not a valid URL: {e}")),
            }
        }
        self
    }

    /// Requires the value to be one of `allowed` (case-insensitive).
    pub fn require_one_of(mut self, field: &str, allowed: &[&str]) -> Self {
        if let Some(value) = self.value(field) {
            if !allowed.iter().any(|a| a.eq_ignore_ascii_case(value.trim())) {
                self.reject(
                    field,
                    format!("must be one of: {}", allowed.join(", ")),
                );
            }
        }
        self
    }

    /// Checks a boolean flag when present.
    pub fn optional_bool(mut self, field: &str) -> Self {
        if let Some(value) = self.config.get_non_blank(field) {
            if value.trim().parse::<bool>().is_err() {
                self.reject(field, "must be 'true' or 'false'");
            }
        }
        self
    }

    /// Applies a custom check; `check` returns a reason on failure.
    pub fn check(mut self, field: &str, check: impl FnOnce(Option<&str>) -> Option<String>) -> Self {
        if let Some(reason) = check(self.config.get(field)) {
            self.reject(field, reason);
        }
        self
    }

    /// Returns the violations collected so far.
    #[must_use]
    pub fn violations(&self) -> &[ParamViolation] {
        &self.violations
    }

    /// Finishes validation.
    ///
    /// # Errors
    ///
    /// Returns `ConnectorError::InvalidConnectionParams` naming every
    /// offending field if any check failed.
    pub fn finish(self) -> Result<()> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ConnectorError::InvalidConnectionParams {
                connector: self.connector.to_string(),
                violations: self.violations,
            })
        }
    }
}

fn host_problem(host: &str) -> Option<&'static str> {
    let host = host.trim();
    // bare IPv6 literals are accepted without brackets
    if host.parse::<std::net::IpAddr>().is_ok() {
        return None;
    }
    match Host::parse(host) {
        Ok(Host::Domain(domain)) => domain_problem(&domain),
        Ok(Host::Ipv4(_) | Host::Ipv6(_)) => None,
        Err(_) if host.starts_with('[') => Some("is not a valid IPv6 address"),
        Err(_) => Some("is not a valid host name"),
    }
}

// `Host::parse` accepts any domain free of forbidden code points
fn domain_problem(domain: &str) -> Option<&'static str> {
    if domain.len() > 253 {
        return Some("is longer than 253 characters");
    }
    let valid_label = |label: &str| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    };
    if domain.split('.').all(valid_label) {
        None
    } else {
        Some("is not a valid host name")
    }
}
