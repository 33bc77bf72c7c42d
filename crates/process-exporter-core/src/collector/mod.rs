//! Host and process sampling over the Linux `/proc` filesystem.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Exporter (Mutex)                         │
//! │                  ┌──────────▼──────────┐                     │
//! │                  │       Sampler       │                     │
//! │  ┌───────────────┴─────┐   ┌───────────┴─────────────────┐   │
//! │  │  ProcessCollector   │   │     SystemCollector         │   │
//! │  │  - /proc/[pid]/*    │   │  - /proc/meminfo            │   │
//! │  │  - /proc/[pid]/net  │   │  - /proc/stat, loadavg      │   │
//! │  └──────────┬──────────┘   └──────────────┬──────────────┘   │
//! │             └──────────────┬──────────────┘                  │
//! │                     ┌──────▼──────┐                          │
//! │                     │  FileSystem │ (trait)                  │
//! │                     └──────┬──────┘                          │
//! └────────────────────────────┼─────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!       │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use process_exporter_core::collector::{Exporter, RealFs};
//! use process_exporter_core::ExporterConfig;
//!
//! let config = ExporterConfig::default().with_pid(std::process::id());
//! let exporter = Exporter::new(RealFs::new(), &config)?;
//! let batch = exporter.collect()?;
//! ```
//!
//! ```
//! use process_exporter_core::collector::{Exporter, MockFs};
//! use process_exporter_core::ExporterConfig;
//!
//! let config = ExporterConfig::default().with_namespace("demo").with_pid(4242);
//! let exporter = Exporter::new(MockFs::typical_system(), &config).unwrap();
//! let batch = exporter.collect().unwrap();
//! assert_eq!(batch.len(), exporter.describe().len());
//! assert_eq!(batch.get("demo_process_open_fds"), Some(12.0));
//! ```

pub mod connections;
pub mod exporter;
pub mod mock;
pub mod model;
pub mod procfs;
pub mod sampler;
mod traits;

pub use connections::{ConnectionCounts, ConnectionState};
pub use exporter::Exporter;
pub use mock::MockFs;
pub use procfs::{CollectError, ProcessCollector, SystemCollector};
pub use sampler::{ProbeOutcome, Readings, Sampler};
pub use traits::{FileSystem, RealFs};
