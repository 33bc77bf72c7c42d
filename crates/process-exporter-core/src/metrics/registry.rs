//! Bridge between [`Exporter`] and the `prometheus` crate.

use crate::collector::{Exporter, FileSystem};
use crate::error::Result;
use crate::metrics::batch::Sample;
use crate::metrics::descriptor::ValueKind;
use prometheus::core::{Collector, Desc};
use prometheus::proto::{Counter, Gauge, Metric, MetricFamily, MetricType};
use prometheus::{Encoder, Registry, TextEncoder};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;

/// Buffer capacity for one encoded scrape.
const BUFFER_CAP: usize = 8 * 1024;

/// Publishes one exporter pass per `Registry::gather`.
pub struct ExporterCollector<F: FileSystem> {
    exporter: Arc<Exporter<F>>,
    descs: Vec<Desc>,
}

impl<F: FileSystem> ExporterCollector<F> {
    pub fn new(exporter: Arc<Exporter<F>>) -> Result<Self> {
        let descs = exporter
            .describe()
            .iter()
            .map(|d| {
                Desc::new(
                    d.fq_name().to_string(),
                    d.help().to_string(),
                    vec![],
                    HashMap::new(),
                )
            })
            .collect::<prometheus::Result<Vec<_>>>()?;

        Ok(Self { exporter, descs })
    }
}

impl<F: FileSystem + 'static> Collector for ExporterCollector<F> {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        match self.exporter.collect() {
            Ok(batch) => batch.iter().map(to_family).collect(),
            Err(e) => {
                error!(error = %e, "collection pass failed, emitting nothing");
                Vec::new()
            }
        }
    }
}

fn to_family(sample: &Sample<'_>) -> MetricFamily {
    let mut metric = Metric::default();
    let field_type = match sample.kind {
        ValueKind::Counter => {
            let mut counter = Counter::default();
            counter.set_value(sample.value);
            metric.set_counter(counter);
            MetricType::COUNTER
        }
        ValueKind::Gauge => {
            let mut gauge = Gauge::default();
            gauge.set_value(sample.value);
            metric.set_gauge(gauge);
            MetricType::GAUGE
        }
    };

    let mut family = MetricFamily::default();
    family.set_name(sample.descriptor.fq_name().to_string());
    family.set_help(sample.descriptor.help().to_string());
    family.set_field_type(field_type);
    family.mut_metric().push(metric);
    family
}

/// Registers `exporter` in `registry`.
///
/// # Errors
/// Fails if any of the exporter's names is already registered.
pub fn register<F: FileSystem + 'static>(
    registry: &Registry,
    exporter: Arc<Exporter<F>>,
) -> Result<()> {
    let collector = ExporterCollector::new(exporter)?;
    registry.register(Box::new(collector))?;
    Ok(())
}

/// Gathers `registry` and renders it in the text exposition format.
pub fn encode(registry: &Registry) -> Result<String> {
    let families = registry.gather();
    let mut buffer = Vec::with_capacity(BUFFER_CAP);
    TextEncoder::new().encode(&families, &mut buffer)?;
    let text =
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockFs, TARGET_PID};
    use crate::config::ExporterConfig;
    use crate::error::ExporterError;
    use std::time::Duration;

    fn exporter(pid: u32) -> Arc<Exporter<MockFs>> {
        let config = ExporterConfig::default()
            .with_namespace("test")
            .with_pid(pid)
            .with_cpu_sample_interval(Duration::ZERO);
        Arc::new(Exporter::new(MockFs::typical_system(), &config).unwrap())
    }

    fn value_of(text: &str, name: &str) -> Option<f64> {
        text.lines()
            .filter(|line| !line.starts_with('#'))
            .find_map(|line| {
                let (metric, value) = line.split_once(' ')?;
                (metric == name).then(|| value.parse().ok()).flatten()
            })
    }

    #[test]
    fn test_gather_one_family_per_descriptor() {
        let registry = Registry::new();
        register(&registry, exporter(TARGET_PID)).unwrap();

        let families = registry.gather();

        assert_eq!(families.len(), 27);
        for family in &families {
            assert_eq!(family.get_field_type(), MetricType::COUNTER);
            assert_eq!(family.get_metric().len(), 1);
            assert!(family.get_name().starts_with("test_"));
        }
    }

    #[test]
    fn test_encode_text_format() {
        let registry = Registry::new();
        register(&registry, exporter(TARGET_PID)).unwrap();

        let text = encode(&registry).unwrap();

        assert!(text.contains("# HELP test_open_files Number of open files"));
        assert!(text.contains("# TYPE test_load1 counter"));
        assert_eq!(value_of(&text, "test_process_open_fds"), Some(12.0));
        assert_eq!(value_of(&text, "test_established_connections"), Some(2.0));
        assert_eq!(value_of(&text, "test_process_max_fds"), Some(65536.0));
    }

    #[test]
    fn test_encode_missing_process() {
        let registry = Registry::new();
        register(&registry, exporter(999_999)).unwrap();

        let text = encode(&registry).unwrap();

        assert_eq!(value_of(&text, "test_process_open_fds"), Some(0.0));
        assert_eq!(value_of(&text, "test_total_connections"), Some(0.0));
        assert_eq!(value_of(&text, "test_load5"), Some(0.1));
    }

    #[test]
    fn test_register_twice_fails() {
        let registry = Registry::new();
        let exporter = exporter(TARGET_PID);
        register(&registry, Arc::clone(&exporter)).unwrap();

        let result = register(&registry, exporter);

        assert!(matches!(result, Err(ExporterError::Prometheus(_))));
    }
}
