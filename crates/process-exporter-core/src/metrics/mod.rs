//! Metric vocabulary and its publication through the `prometheus` crate.

pub mod batch;
pub mod descriptor;
pub mod registry;

pub use batch::{MetricBatch, Sample};
pub use descriptor::{Descriptor, DescriptorTable, MetricId, Scope, ValueKind};
pub use registry::{ExporterCollector, encode, register};
