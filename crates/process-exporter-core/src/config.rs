//! Exporter configuration.

use crate::error::{ExporterError, Result};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 18000;
pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_NAMESPACE: &str = "process_exporter";
pub const DEFAULT_PROC_PATH: &str = "/proc";

/// Gap between the two `/proc/stat` reads of the host CPU probe.
pub const DEFAULT_CPU_SAMPLE_INTERVAL: Duration = Duration::from_millis(1);

/// Immutable settings of one exporter instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ExporterConfig {
    pub listen_address: SocketAddr,
    pub metrics_path: String,
    /// Status page of the scraped server. Carried for reference only.
    pub uri: String,
    /// Process whose `/proc/[pid]` entries are sampled.
    pub pid: u32,
    pub namespace: String,
    pub proc_path: String,
    pub cpu_sample_interval: Duration,
    /// Logs every pass at info level instead of debug.
    pub verbose: bool,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
            uri: String::new(),
            pid: 0,
            namespace: DEFAULT_NAMESPACE.to_string(),
            proc_path: DEFAULT_PROC_PATH.to_string(),
            cpu_sample_interval: DEFAULT_CPU_SAMPLE_INTERVAL,
            verbose: false,
        }
    }
}

impl ExporterConfig {
    pub fn with_listen_address(mut self, address: &str) -> Result<Self> {
        self.listen_address = parse_listen_address(address)?;
        Ok(self)
    }

    pub fn with_metrics_path(mut self, path: &str) -> Result<Self> {
        validate_metrics_path(path)?;
        self.metrics_path = path.to_string();
        Ok(self)
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_proc_path(mut self, proc_path: impl Into<String>) -> Self {
        self.proc_path = proc_path.into();
        self
    }

    pub fn with_cpu_sample_interval(mut self, interval: Duration) -> Self {
        self.cpu_sample_interval = interval;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Parses `host:port`, `[v6]:port` or the bare `:port` form.
///
/// `:port` listens on every IPv4 interface.
pub fn parse_listen_address(address: &str) -> Result<SocketAddr> {
    let invalid = |reason: String| ExporterError::InvalidListenAddress {
        address: address.to_string(),
        reason,
    };

    if let Some(port) = address.strip_prefix(':') {
        let port: u16 = port.parse().map_err(|e| invalid(format!("bad port: {}", e)))?;
        return Ok(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port));
    }

    address.parse().map_err(|e| invalid(format!("{}", e)))
}

pub fn validate_metrics_path(path: &str) -> Result<()> {
    if path.starts_with('/') {
        Ok(())
    } else {
        Err(ExporterError::InvalidMetricsPath(path.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExporterConfig::default();
        assert_eq!(config.listen_address.to_string(), "0.0.0.0:18000");
        assert_eq!(config.metrics_path, "/metrics");
        assert_eq!(config.namespace, "process_exporter");
        assert_eq!(config.pid, 0);
        assert_eq!(config.cpu_sample_interval, Duration::from_millis(1));
    }

    #[test]
    fn test_parse_listen_address_port_only() {
        let addr = parse_listen_address(":9256").unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:9256");
    }

    #[test]
    fn test_parse_listen_address_full() {
        assert_eq!(
            parse_listen_address("127.0.0.1:8080").unwrap().to_string(),
            "127.0.0.1:8080"
        );
        assert_eq!(parse_listen_address("[::1]:8080").unwrap().port(), 8080);
    }

    #[test]
    fn test_parse_listen_address_invalid() {
        for address in [":", ":http", ":70000", "localhost", "1.2.3.4"] {
            assert!(
                matches!(
                    parse_listen_address(address),
                    Err(ExporterError::InvalidListenAddress { .. })
                ),
                "{} should be rejected",
                address
            );
        }
    }

    #[test]
    fn test_metrics_path_must_be_absolute() {
        assert!(ExporterConfig::default().with_metrics_path("/stats").is_ok());
        assert!(matches!(
            ExporterConfig::default().with_metrics_path("metrics"),
            Err(ExporterError::InvalidMetricsPath(_))
        ));
    }

    #[test]
    fn test_builders() {
        let config = ExporterConfig::default()
            .with_pid(42)
            .with_namespace("test")
            .with_uri("http://localhost/status")
            .with_proc_path("/host/proc")
            .with_verbose(true);

        assert_eq!(config.pid, 42);
        assert_eq!(config.namespace, "test");
        assert_eq!(config.uri, "http://localhost/status");
        assert_eq!(config.proc_path, "/host/proc");
        assert!(config.verbose);
    }
}
