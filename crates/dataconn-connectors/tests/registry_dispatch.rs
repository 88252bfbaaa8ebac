use std::io::Write as _;
use std::sync::Arc;
use std::time::Duration;

use dataconn_connectors::params::ParamValidator;
use dataconn_connectors::testing::{baseline_gate, registry_with, sample_config, MockDriver};
use dataconn_connectors::{
    async_trait, ConnectionConfig, ConnectorDriver, ConnectorError, DriverRegistry, ErrorKind,
    RegistrySettings,
};
use tokio::net::{TcpListener, TcpStream};

/// Minimal TCP reachability driver, shaped like a real JDBC driver.
#[derive(Debug)]
struct TcpReachDriver {
    type_key: &'static str,
}

#[async_trait]
impl ConnectorDriver for TcpReachDriver {
    fn supported_type(&self) -> &str {
        self.type_key
    }

    async fn test_connection(&self, config: &ConnectionConfig) -> Result<bool, ConnectorError> {
        self.validate_params(config)?;
        let host = config.get("host").unwrap_or_default();
        let port = config.get("port").unwrap_or_default();
        let stream = TcpStream::connect(format!("{host}:{port}"))
            .await
            .map_err(|e| ConnectorError::connection(self.type_key, "tcp connect failed", e))?;
        drop(stream);
        Ok(true)
    }

    fn validate_params(&self, config: &ConnectionConfig) -> Result<(), ConnectorError> {
        ParamValidator::new(self.type_key, config)
            .require_host("host")
            .require_port("port")
            .require("username")
            .finish()
    }

    fn url_template(&self) -> String {
        format!("jdbc:{}://{{host}}:{{port}}/{{database}}", self.type_key)
    }
}

fn tcp_driver(type_key: &'static str) -> Arc<dyn ConnectorDriver> {
    Arc::new(TcpReachDriver { type_key })
}

#[tokio::test]
async fn test_edition_example() {
    // catalog has mysql (allow-listed) and oracle (not allow-listed)
    let registry = registry_with(baseline_gate(), &[]);
    let gate = registry.gate();

    assert!(gate.check_enabled("mysql").is_ok());
    match gate.check_enabled("oracle") {
        Err(ConnectorError::ConnectorNotLicensed { display_name, .. }) => {
            assert_eq!(display_name, "Oracle");
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(
        gate.check_enabled("db2").unwrap_err().kind(),
        ErrorKind::UnknownConnectorType
    );
}

#[tokio::test]
async fn test_missing_driver_example() {
    let registry = registry_with(baseline_gate(), &[]);

    let err = registry
        .test_connection("mysql", &sample_config())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedConnectorType);
    assert_eq!(registry.url_template("mysql"), None);
}

#[tokio::test]
async fn test_tcp_driver_against_local_listener() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let accept = tokio::spawn(async move {
        let _ = listener.accept().await;
    });

    let registry = DriverRegistry::new(baseline_gate()).with_drivers(vec![tcp_driver("mysql")]);
    let config = ConnectionConfig::new()
        .with("host", "127.0.0.1")
        .with("port", port.to_string())
        .with("username", "etl")
        .with("password", "s3cret");

    registry.validate_connection_params("mysql", &config).unwrap();
    assert!(registry.test_connection("mysql", &config).await.unwrap());
    accept.await.unwrap();

    assert_eq!(
        registry.url_template("MYSQL").as_deref(),
        Some("jdbc:mysql://{host}:{port}/{database}")
    );
}

#[tokio::test]
async fn test_tcp_driver_refused_maps_to_connection_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let registry = DriverRegistry::new(baseline_gate()).with_drivers(vec![tcp_driver("maria")]);
    let config = ConnectionConfig::new()
        .with("host", "127.0.0.1")
        .with("port", port.to_string())
        .with("username", "etl");

    let err = registry.test_connection("maria", &config).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionError);
    assert_eq!(err.connector(), Some("maria"));
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn test_validation_fails_fast_without_network() {
    let registry = DriverRegistry::new(baseline_gate()).with_drivers(vec![tcp_driver("mysql")]);
    let config = ConnectionConfig::new().with("host", "db host").with("port", "99999");

    let err = registry
        .validate_connection_params("mysql", &config)
        .unwrap_err();
    assert_eq!(err.invalid_fields(), vec!["host", "port", "username"]);
    assert!(err.to_string().contains("'mysql'"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_dispatch_on_shared_registry() {
    let mysql = Arc::new(MockDriver::new("mysql").with_latency(Duration::from_millis(5)));
    let registry = Arc::new(registry_with(baseline_gate(), &[mysql.clone()]));

    let mut tasks = Vec::new();
    for i in 0..32 {
        let registry = Arc::clone(&registry);
        tasks.push(tokio::spawn(async move {
            let config = sample_config().with("attempt", i.to_string());
            registry.test_connection("mysql", &config).await
        }));
    }
    for task in tasks {
        assert!(task.await.unwrap().unwrap());
    }

    assert_eq!(mysql.test_calls(), 32);
    assert_eq!(mysql.open_connections(), 0);
}

#[tokio::test]
async fn test_registry_from_settings_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
edition = "baseline"
allow_list = ["postgresql", "indexbase"]
test_timeout_ms = 1500

[[extra_connectors]]
category = "other"
type_key = "indexbase"
display_name = "IndexBase"
protocols = ["https"]
"#
    )
    .unwrap();

    let settings = RegistrySettings::from_file(file.path()).unwrap();
    let mut registry = DriverRegistry::from_settings(&settings).unwrap();
    registry.initialize(vec![
        Arc::new(MockDriver::new("indexbase")) as Arc<dyn ConnectorDriver>,
        Arc::new(MockDriver::new("mysql")) as Arc<dyn ConnectorDriver>,
    ]);

    assert_eq!(registry.default_timeout(), Some(Duration::from_millis(1500)));
    assert!(registry
        .test_connection("IndexBase", &sample_config())
        .await
        .unwrap());

    // mysql has a driver but is not on this installation's allow-list
    let err = registry
        .test_connection("mysql", &sample_config())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectorNotLicensed);

    let err = registry
        .validate_connection_params("postgresql", &sample_config())
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedConnectorType);
}

#[test]
fn test_descriptors_never_leak_credentials() {
    let leaky = Arc::new(
        MockDriver::new("maria").with_template("jdbc:mariadb://root:toor@{host}:{port}?password=toor"),
    );
    let registry = registry_with(baseline_gate(), &[leaky]);

    for descriptor in registry.describe_all() {
        if let Some(template) = descriptor.url_template {
            assert!(!template.contains("toor"), "leaked: {template}");
        }
    }
}
