//! The fixed vocabulary of published metrics.

use crate::error::{ExporterError, Result};
use std::collections::HashSet;

/// Prometheus value type of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Counter,
    Gauge,
}

/// Whether a metric describes the host or the scraped process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Host,
    Process,
}

/// Identifies one published metric.
///
/// Variant order is the order of `describe` and of every collected batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricId {
    ProcessCpuSecondsTotal,
    ProcessOpenFds,
    ProcessMaxFds,
    ProcessVirtualMemoryBytes,
    ProcessVirtualMemoryMaxBytes,
    ProcessResidentMemoryBytes,
    MemoryPercent,
    MemoryTotal,
    MemoryFree,
    SwapPercent,
    SwapTotal,
    SwapFree,
    CpuPercent,
    NumThreads,
    NumCpus,
    Load1,
    Load5,
    Load15,
    ProcCpu,
    ProcMem,
    OpenFiles,
    TotalConnections,
    ListenConnections,
    EstablishedConnections,
    CloseWaitConnections,
    TimeWaitConnections,
    OtherConnections,
}

impl MetricId {
    pub const ALL: [MetricId; 27] = [
        MetricId::ProcessCpuSecondsTotal,
        MetricId::ProcessOpenFds,
        MetricId::ProcessMaxFds,
        MetricId::ProcessVirtualMemoryBytes,
        MetricId::ProcessVirtualMemoryMaxBytes,
        MetricId::ProcessResidentMemoryBytes,
        MetricId::MemoryPercent,
        MetricId::MemoryTotal,
        MetricId::MemoryFree,
        MetricId::SwapPercent,
        MetricId::SwapTotal,
        MetricId::SwapFree,
        MetricId::CpuPercent,
        MetricId::NumThreads,
        MetricId::NumCpus,
        MetricId::Load1,
        MetricId::Load5,
        MetricId::Load15,
        MetricId::ProcCpu,
        MetricId::ProcMem,
        MetricId::OpenFiles,
        MetricId::TotalConnections,
        MetricId::ListenConnections,
        MetricId::EstablishedConnections,
        MetricId::CloseWaitConnections,
        MetricId::TimeWaitConnections,
        MetricId::OtherConnections,
    ];

    /// Metric name without the namespace.
    pub fn name(self) -> &'static str {
        match self {
            MetricId::ProcessCpuSecondsTotal => "process_cpu_seconds_total",
            MetricId::ProcessOpenFds => "process_open_fds",
            MetricId::ProcessMaxFds => "process_max_fds",
            MetricId::ProcessVirtualMemoryBytes => "process_virtual_memory_bytes",
            MetricId::ProcessVirtualMemoryMaxBytes => "process_virtual_memory_max_bytes",
            MetricId::ProcessResidentMemoryBytes => "process_resident_memory_bytes",
            MetricId::MemoryPercent => "memory_percent",
            MetricId::MemoryTotal => "memory_total",
            MetricId::MemoryFree => "memory_free",
            MetricId::SwapPercent => "swap_percent",
            MetricId::SwapTotal => "swap_total",
            MetricId::SwapFree => "swap_free",
            MetricId::CpuPercent => "cpu_percent",
            MetricId::NumThreads => "num_threads",
            MetricId::NumCpus => "num_cpus",
            MetricId::Load1 => "load1",
            MetricId::Load5 => "load5",
            MetricId::Load15 => "load15",
            MetricId::ProcCpu => "proc_cpu",
            MetricId::ProcMem => "proc_mem",
            MetricId::OpenFiles => "open_files",
            MetricId::TotalConnections => "total_connections",
            MetricId::ListenConnections => "listen_connections",
            MetricId::EstablishedConnections => "established_connections",
            MetricId::CloseWaitConnections => "close_wait_connections",
            MetricId::TimeWaitConnections => "time_wait_connections",
            MetricId::OtherConnections => "other_connections",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            MetricId::ProcessCpuSecondsTotal => {
                "Total user and system CPU time spent in seconds (process collector)"
            }
            MetricId::ProcessOpenFds => "Number of open file descriptors (process collector)",
            MetricId::ProcessMaxFds => {
                "Maximum number of open file descriptors (process collector)"
            }
            MetricId::ProcessVirtualMemoryBytes => {
                "Virtual memory size in bytes (process collector)"
            }
            MetricId::ProcessVirtualMemoryMaxBytes => {
                "Maximum amount of virtual memory available in bytes (process collector)"
            }
            MetricId::ProcessResidentMemoryBytes => {
                "Resident memory size in bytes (process collector)"
            }
            MetricId::MemoryPercent => "Virtual memory usage of the server",
            MetricId::MemoryTotal => "Virtual total memory usage of the server",
            MetricId::MemoryFree => "Virtual free memory usage of the server",
            MetricId::SwapPercent => "Swap memory usage of the server",
            MetricId::SwapTotal => "Virtual total swap usage of the server",
            MetricId::SwapFree => "Virtual free swap usage of the server",
            MetricId::CpuPercent => "cpu percent of the server",
            MetricId::NumThreads => "Number of threads",
            MetricId::NumCpus => "Number of CPUs usable by the current process",
            MetricId::Load1 => "Load average in last 1m",
            MetricId::Load5 => "Load average in last 5m",
            MetricId::Load15 => "Load average in last 15m",
            MetricId::ProcCpu => "process CPU",
            MetricId::ProcMem => "process memory",
            MetricId::OpenFiles => "Number of open files",
            MetricId::TotalConnections => "Server TOTAL number of connections",
            MetricId::ListenConnections => "Server LISTEN number of connections",
            MetricId::EstablishedConnections => "Server ESTABLISHED number of connections",
            MetricId::CloseWaitConnections => "Server CLOSE_WAIT number of connections",
            MetricId::TimeWaitConnections => "Server TIME_WAIT number of connections",
            MetricId::OtherConnections => {
                "Server number of connections in any other state, including UDP and unix sockets"
            }
        }
    }

    /// Value type published on the wire.
    ///
    /// Every metric is a counter, percentages and load averages included.
    /// Scrapers already depend on these types, so they are kept as is.
    pub fn kind(self) -> ValueKind {
        ValueKind::Counter
    }

    pub fn scope(self) -> Scope {
        match self {
            MetricId::MemoryPercent
            | MetricId::MemoryTotal
            | MetricId::MemoryFree
            | MetricId::SwapPercent
            | MetricId::SwapTotal
            | MetricId::SwapFree
            | MetricId::CpuPercent
            | MetricId::NumCpus
            | MetricId::Load1
            | MetricId::Load5
            | MetricId::Load15 => Scope::Host,
            MetricId::ProcessCpuSecondsTotal
            | MetricId::ProcessOpenFds
            | MetricId::ProcessMaxFds
            | MetricId::ProcessVirtualMemoryBytes
            | MetricId::ProcessVirtualMemoryMaxBytes
            | MetricId::ProcessResidentMemoryBytes
            | MetricId::NumThreads
            | MetricId::ProcCpu
            | MetricId::ProcMem
            | MetricId::OpenFiles
            | MetricId::TotalConnections
            | MetricId::ListenConnections
            | MetricId::EstablishedConnections
            | MetricId::CloseWaitConnections
            | MetricId::TimeWaitConnections
            | MetricId::OtherConnections => Scope::Process,
        }
    }
}

/// Immutable metadata of one published metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    id: MetricId,
    namespace: String,
    fq_name: String,
}

impl Descriptor {
    pub fn new(id: MetricId, namespace: &str) -> Self {
        let fq_name = if namespace.is_empty() {
            id.name().to_string()
        } else {
            format!("{}_{}", namespace, id.name())
        };

        Self {
            id,
            namespace: namespace.to_string(),
            fq_name,
        }
    }

    pub fn id(&self) -> MetricId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    pub fn help(&self) -> &'static str {
        self.id.help()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn kind(&self) -> ValueKind {
        self.id.kind()
    }

    /// `<namespace>_<name>`, or just `<name>` for an empty namespace.
    pub fn fq_name(&self) -> &str {
        &self.fq_name
    }
}

/// All descriptors of one exporter, built once at startup.
#[derive(Debug, Clone)]
pub struct DescriptorTable {
    descriptors: Vec<Descriptor>,
}

impl DescriptorTable {
    /// Builds the table for `namespace`.
    ///
    /// # Errors
    /// `InvalidNamespace` if the namespace cannot prefix a metric name.
    pub fn new(namespace: &str) -> Result<Self> {
        if !is_valid_namespace(namespace) {
            return Err(ExporterError::InvalidNamespace(namespace.to_string()));
        }

        let descriptors = MetricId::ALL
            .iter()
            .map(|&id| Descriptor::new(id, namespace))
            .collect();
        Self::from_descriptors(descriptors)
    }

    /// Builds a table from explicit descriptors, rejecting duplicate names.
    pub(crate) fn from_descriptors(descriptors: Vec<Descriptor>) -> Result<Self> {
        let mut seen = HashSet::new();
        for descriptor in &descriptors {
            if !seen.insert(descriptor.fq_name()) {
                return Err(ExporterError::DuplicateDescriptor(
                    descriptor.fq_name().to_string(),
                ));
            }
        }
        Ok(Self { descriptors })
    }

    /// Every descriptor, in publication order.
    pub fn describe(&self) -> &[Descriptor] {
        &self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Empty, or `[a-zA-Z_:][a-zA-Z0-9_:]*`.
fn is_valid_namespace(namespace: &str) -> bool {
    let mut chars = namespace.chars();
    match chars.next() {
        None => true,
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_' || first == ':')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_names_are_unique() {
        for namespace in ["process_exporter", "test", "", "a:b"] {
            let table = DescriptorTable::new(namespace).unwrap();
            let names: HashSet<&str> = table.describe().iter().map(|d| d.fq_name()).collect();
            assert_eq!(names.len(), table.len());
            assert_eq!(table.len(), MetricId::ALL.len());
        }
    }

    #[test]
    fn test_describe_is_idempotent() {
        let table = DescriptorTable::new("test").unwrap();
        let first: Vec<Descriptor> = table.describe().to_vec();
        let second: Vec<Descriptor> = table.describe().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn test_describe_order_follows_metric_ids() {
        let table = DescriptorTable::new("test").unwrap();
        let ids: Vec<MetricId> = table.describe().iter().map(|d| d.id()).collect();
        assert_eq!(ids, MetricId::ALL.to_vec());
    }

    #[test]
    fn test_fq_name() {
        let d = Descriptor::new(MetricId::NumCpus, "test");
        assert_eq!(d.fq_name(), "test_num_cpus");
        assert_eq!(d.namespace(), "test");
        assert_eq!(d.name(), "num_cpus");

        let bare = Descriptor::new(MetricId::Load1, "");
        assert_eq!(bare.fq_name(), "load1");
    }

    #[test]
    fn test_all_metrics_are_counters() {
        assert!(MetricId::ALL.iter().all(|id| id.kind() == ValueKind::Counter));
    }

    #[test]
    fn test_process_scope() {
        let process: Vec<MetricId> = MetricId::ALL
            .iter()
            .copied()
            .filter(|id| id.scope() == Scope::Process)
            .collect();
        assert_eq!(process.len(), 16);
        assert!(process.contains(&MetricId::NumThreads));
        assert!(!process.contains(&MetricId::NumCpus));
    }

    #[test]
    fn test_duplicate_descriptor_rejected() {
        let descriptors = vec![
            Descriptor::new(MetricId::Load1, "test"),
            Descriptor::new(MetricId::Load5, "test"),
            Descriptor::new(MetricId::Load1, "test"),
        ];
        let err = DescriptorTable::from_descriptors(descriptors).unwrap_err();
        assert!(matches!(err, ExporterError::DuplicateDescriptor(name) if name == "test_load1"));
    }

    #[test]
    fn test_invalid_namespace_rejected() {
        for namespace in ["my-exporter", "1abc", "with space", "ünïcode"] {
            assert!(matches!(
                DescriptorTable::new(namespace),
                Err(ExporterError::InvalidNamespace(_))
            ));
        }
    }
}
