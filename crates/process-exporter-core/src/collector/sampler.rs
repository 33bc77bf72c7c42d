//! One sampling pass over every probe.

use crate::collector::connections::ConnectionCounts;
use crate::collector::model::{
    LoadAverage, MemoryUsage, ProcessStat, ProcessUsage, ResourceLimits,
};
use crate::collector::procfs::{CollectError, ProcessCollector, SystemCollector};
use crate::collector::traits::FileSystem;
use crate::metrics::MetricId;
use std::time::Duration;
use tracing::{debug, warn};

/// Result of one probe, degraded to `T::default()` on failure.
#[derive(Debug)]
pub struct ProbeOutcome<T> {
    pub value: T,
    pub error: Option<CollectError>,
}

impl<T: Default> ProbeOutcome<T> {
    /// Absorbs a probe result, logging the failure if there is one.
    ///
    /// A vanished process is expected between scrapes and is logged at
    /// debug level. Everything else is a warning.
    pub fn from_result(probe: &'static str, result: Result<T, CollectError>) -> Self {
        match result {
            Ok(value) => Self { value, error: None },
            Err(err) => {
                match &err {
                    CollectError::ProcessGone(pid) => {
                        debug!(probe, pid, "target process not found");
                    }
                    other => {
                        warn!(probe, error = %other, "probe failed, reporting zero");
                    }
                }
                Self {
                    value: T::default(),
                    error: Some(err),
                }
            }
        }
    }

    pub fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Raw facts of one pass, before they are mapped onto descriptors.
#[derive(Debug)]
pub struct Readings {
    pub virtual_memory: ProbeOutcome<MemoryUsage>,
    pub swap_memory: ProbeOutcome<MemoryUsage>,
    pub cpu_percent: ProbeOutcome<f64>,
    pub num_cpus: usize,
    pub load: ProbeOutcome<LoadAverage>,
    pub stat: ProbeOutcome<ProcessStat>,
    pub open_fds: ProbeOutcome<u64>,
    pub limits: ProbeOutcome<ResourceLimits>,
    pub threads: ProbeOutcome<u64>,
    pub usage: ProbeOutcome<ProcessUsage>,
    pub open_files: ProbeOutcome<u64>,
    pub connections: ProbeOutcome<ConnectionCounts>,
}

impl Readings {
    /// Value published for `id`.
    pub fn value(&self, id: MetricId) -> f64 {
        match id {
            MetricId::ProcessCpuSecondsTotal => self.stat.value.cpu_seconds,
            MetricId::ProcessOpenFds => self.open_fds.value as f64,
            MetricId::ProcessMaxFds => self.limits.value.max_open_files as f64,
            MetricId::ProcessVirtualMemoryBytes => self.stat.value.virtual_memory_bytes as f64,
            MetricId::ProcessVirtualMemoryMaxBytes => {
                self.limits.value.max_address_space as f64
            }
            MetricId::ProcessResidentMemoryBytes => self.stat.value.resident_memory_bytes as f64,
            MetricId::MemoryPercent => self.virtual_memory.value.used_percent,
            MetricId::MemoryTotal => self.virtual_memory.value.total as f64,
            MetricId::MemoryFree => self.virtual_memory.value.free as f64,
            MetricId::SwapPercent => self.swap_memory.value.used_percent,
            MetricId::SwapTotal => self.swap_memory.value.total as f64,
            MetricId::SwapFree => self.swap_memory.value.free as f64,
            MetricId::CpuPercent => self.cpu_percent.value,
            MetricId::NumThreads => self.threads.value as f64,
            MetricId::NumCpus => self.num_cpus as f64,
            MetricId::Load1 => self.load.value.load1,
            MetricId::Load5 => self.load.value.load5,
            MetricId::Load15 => self.load.value.load15,
            MetricId::ProcCpu => self.usage.value.cpu_percent,
            MetricId::ProcMem => self.usage.value.mem_percent,
            MetricId::OpenFiles => self.open_files.value as f64,
            MetricId::TotalConnections => self.connections.value.total() as f64,
            MetricId::ListenConnections => self.connections.value.listen as f64,
            MetricId::EstablishedConnections => self.connections.value.established as f64,
            MetricId::CloseWaitConnections => self.connections.value.close_wait as f64,
            MetricId::TimeWaitConnections => self.connections.value.time_wait as f64,
            MetricId::OtherConnections => self.connections.value.other as f64,
        }
    }

    /// Number of probes that failed in this pass.
    pub fn failures(&self) -> usize {
        [
            self.virtual_memory.failed(),
            self.swap_memory.failed(),
            self.cpu_percent.failed(),
            self.load.failed(),
            self.stat.failed(),
            self.open_fds.failed(),
            self.limits.failed(),
            self.threads.failed(),
            self.usage.failed(),
            self.open_files.failed(),
            self.connections.failed(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

/// Runs every probe against one filesystem.
pub struct Sampler<F: FileSystem> {
    system: SystemCollector<F>,
    process: ProcessCollector<F>,
    cpu_sample_interval: Duration,
}

impl<F: FileSystem + Clone> Sampler<F> {
    pub fn new(fs: F, proc_path: &str, cpu_sample_interval: Duration) -> Self {
        Self {
            system: SystemCollector::new(fs.clone(), proc_path),
            process: ProcessCollector::new(fs, proc_path),
            cpu_sample_interval,
        }
    }
}

impl<F: FileSystem> Sampler<F> {
    /// Host-wide probes first, then the probes of `pid`, in sequence.
    pub fn sample(&self, pid: u32) -> Readings {
        let system = &self.system;
        let process = &self.process;

        Readings {
            virtual_memory: ProbeOutcome::from_result(
                "virtual_memory",
                system.collect_virtual_memory(),
            ),
            swap_memory: ProbeOutcome::from_result("swap_memory", system.collect_swap_memory()),
            cpu_percent: ProbeOutcome::from_result(
                "cpu_percent",
                system.collect_cpu_percent(self.cpu_sample_interval),
            ),
            num_cpus: system.num_cpus(),
            load: ProbeOutcome::from_result("load_average", system.collect_loadavg()),
            stat: ProbeOutcome::from_result("process_stat", process.collect_stat(pid)),
            open_fds: ProbeOutcome::from_result("open_fds", process.count_open_fds(pid)),
            limits: ProbeOutcome::from_result("limits", process.collect_limits(pid)),
            threads: ProbeOutcome::from_result("threads", process.count_threads(pid)),
            usage: ProbeOutcome::from_result("process_usage", process.collect_usage(pid)),
            open_files: ProbeOutcome::from_result("open_files", process.count_open_files(pid)),
            connections: ProbeOutcome::from_result(
                "connections",
                process.collect_connections(pid),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::{MockFs, TARGET_PID};
    use crate::metrics::Scope;

    fn sampler(fs: MockFs) -> Sampler<MockFs> {
        Sampler::new(fs, "/proc", Duration::ZERO)
    }

    #[test]
    fn test_probe_outcome_ok() {
        let outcome = ProbeOutcome::from_result("test", Ok(7u64));
        assert_eq!(outcome.value, 7);
        assert!(!outcome.failed());
    }

    #[test]
    fn test_probe_outcome_failure_is_zero() {
        let outcome: ProbeOutcome<LoadAverage> =
            ProbeOutcome::from_result("test", Err(CollectError::ProcessGone(1)));
        assert_eq!(outcome.value, LoadAverage::default());
        assert!(outcome.failed());
    }

    #[test]
    fn test_sample_typical_system() {
        let readings = sampler(MockFs::typical_system()).sample(TARGET_PID);

        assert_eq!(readings.failures(), 0);
        assert_eq!(readings.value(MetricId::ProcessOpenFds), 12.0);
        assert_eq!(readings.value(MetricId::ProcessMaxFds), 65536.0);
        assert_eq!(readings.value(MetricId::ProcessVirtualMemoryMaxBytes), u64::MAX as f64);
        assert_eq!(readings.value(MetricId::ProcessCpuSecondsTotal), 20.0);
        assert_eq!(readings.value(MetricId::NumThreads), 8.0);
        assert_eq!(readings.value(MetricId::OpenFiles), 6.0);
        assert_eq!(readings.value(MetricId::TotalConnections), 6.0);
        assert_eq!(readings.value(MetricId::MemoryTotal), 16384000.0 * 1024.0);
        assert_eq!(readings.value(MetricId::MemoryPercent), 25.0);
        assert_eq!(readings.value(MetricId::SwapPercent), 25.0);
        assert_eq!(readings.value(MetricId::Load1), 0.15);
        assert_eq!(readings.value(MetricId::NumCpus), num_cpus::get() as f64);
    }

    #[test]
    fn test_sample_missing_process() {
        let readings = sampler(MockFs::typical_system()).sample(999_999);

        assert_eq!(readings.failures(), 7);
        for id in MetricId::ALL {
            if id.scope() == Scope::Process {
                assert_eq!(readings.value(id), 0.0, "{} should be zero", id.name());
            }
        }
        assert_eq!(readings.value(MetricId::Load15), 0.05);
    }

    #[test]
    fn test_sample_without_host_files() {
        let mut fs = MockFs::typical_system();
        fs.remove("/proc/meminfo");
        fs.remove("/proc/loadavg");

        let readings = sampler(fs).sample(TARGET_PID);

        assert!(readings.virtual_memory.failed());
        assert!(readings.swap_memory.failed());
        assert!(readings.load.failed());
        // proc_mem divides by MemTotal
        assert!(readings.usage.failed());
        assert_eq!(readings.value(MetricId::MemoryTotal), 0.0);
        assert_eq!(readings.value(MetricId::ProcessOpenFds), 12.0);
    }
}
