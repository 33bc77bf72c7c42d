//! Serialized collection passes over a fixed descriptor table.

use crate::collector::sampler::Sampler;
use crate::collector::traits::FileSystem;
use crate::config::ExporterConfig;
use crate::error::{ExporterError, Result};
use crate::metrics::{Descriptor, DescriptorTable, MetricBatch};
use std::sync::Mutex;
use std::time::Instant;
use tracing::{debug, info};

/// Samples the host and one target process on demand.
///
/// Concurrent calls to [`collect`](Exporter::collect) are serialized: a
/// pass holds the sampler lock from its first probe to its last sample.
pub struct Exporter<F: FileSystem> {
    pid: u32,
    table: DescriptorTable,
    sampler: Mutex<Sampler<F>>,
    verbose: bool,
}

impl<F: FileSystem + Clone> Exporter<F> {
    /// Builds the descriptor table and the sampler.
    ///
    /// # Errors
    /// Fails if the namespace is invalid or two metrics share a name.
    pub fn new(fs: F, config: &ExporterConfig) -> Result<Self> {
        let table = DescriptorTable::new(&config.namespace)?;
        let sampler = Sampler::new(fs, &config.proc_path, config.cpu_sample_interval);

        Ok(Self {
            pid: config.pid,
            table,
            sampler: Mutex::new(sampler),
            verbose: config.verbose,
        })
    }
}

impl<F: FileSystem> Exporter<F> {
    /// Every descriptor this exporter publishes, in publication order.
    pub fn describe(&self) -> &[Descriptor] {
        self.table.describe()
    }

    /// Runs one collection pass.
    ///
    /// Failed probes contribute zeros, so the batch always holds one sample
    /// per descriptor.
    ///
    /// # Errors
    /// `LockPoisoned` if an earlier pass panicked mid-way.
    pub fn collect(&self) -> Result<MetricBatch<'_>> {
        let sampler = self
            .sampler
            .lock()
            .map_err(|_| ExporterError::LockPoisoned)?;

        let started = Instant::now();
        let readings = sampler.sample(self.pid);

        let mut batch = MetricBatch::with_capacity(self.table.len());
        for descriptor in self.table.describe() {
            batch.push(descriptor, readings.value(descriptor.id()));
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        let failures = readings.failures();
        if self.verbose {
            info!(pid = self.pid, elapsed_ms, failures, "collection pass complete");
        } else {
            debug!(pid = self.pid, elapsed_ms, failures, "collection pass complete");
        }

        Ok(batch)
    }
}
