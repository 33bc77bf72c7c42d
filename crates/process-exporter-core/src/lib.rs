//! process-exporter-core: host and process metrics for Prometheus.
//!
//! Provides:
//! - `collector`: `/proc` probes, the sampler and the serialized [`Exporter`]
//! - `metrics`: descriptor table, metric batches, `prometheus` registry bridge
//! - `config`: [`ExporterConfig`] and address/path validation
//! - `error`: [`ExporterError`]
//!
//! ```
//! use std::sync::Arc;
//! use process_exporter_core::collector::{Exporter, MockFs};
//! use process_exporter_core::{ExporterConfig, metrics};
//!
//! let config = ExporterConfig::default().with_pid(4242);
//! let exporter = Arc::new(Exporter::new(MockFs::typical_system(), &config).unwrap());
//!
//! let registry = prometheus::Registry::new();
//! metrics::register(&registry, exporter).unwrap();
//! let text = metrics::encode(&registry).unwrap();
//! assert!(text.contains("process_exporter_total_connections 6"));
//! ```

pub mod collector;
pub mod config;
pub mod error;
pub mod metrics;

/// Crate version reported by the binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use collector::Exporter;
pub use config::ExporterConfig;
pub use error::{ExporterError, Result};
