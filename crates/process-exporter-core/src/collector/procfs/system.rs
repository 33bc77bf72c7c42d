//! Host-wide probes over `/proc/`.

use crate::collector::model::{LoadAverage, MemoryUsage};
use crate::collector::procfs::parser::{
    CpuTimes, MemInfo, parse_cpu_times, parse_loadavg, parse_meminfo,
};
use crate::collector::procfs::process::CollectError;
use crate::collector::traits::FileSystem;
use std::path::Path;
use std::time::Duration;

/// Collects system-wide metrics from `/proc/`.
pub struct SystemCollector<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> SystemCollector<F> {
    /// Creates a new system collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    fn read_cpu_times(&self) -> Result<CpuTimes, CollectError> {
        let path = format!("{}/stat", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;
        Ok(parse_cpu_times(&content)?)
    }

    /// Collects RAM usage from `/proc/meminfo`.
    ///
    /// Used memory is `total - available`, so page cache counts as free.
    pub fn collect_virtual_memory(&self) -> Result<MemoryUsage, CollectError> {
        let info = read_meminfo(&self.fs, &self.proc_path)?;
        let total = info.mem_total * 1024;
        let available = info.mem_available * 1024;

        Ok(MemoryUsage {
            used_percent: percent(total.saturating_sub(available), total),
            total,
            free: info.mem_free * 1024,
        })
    }

    /// Collects swap usage from `/proc/meminfo`.
    pub fn collect_swap_memory(&self) -> Result<MemoryUsage, CollectError> {
        let info = read_meminfo(&self.fs, &self.proc_path)?;
        let total = info.swap_total * 1024;
        let free = info.swap_free * 1024;

        Ok(MemoryUsage {
            used_percent: percent(total.saturating_sub(free), total),
            total,
            free,
        })
    }

    /// Measures aggregate CPU utilisation over `interval`.
    ///
    /// Blocks the calling thread for `interval` between the two `/proc/stat`
    /// reads.
    pub fn collect_cpu_percent(&self, interval: Duration) -> Result<f64, CollectError> {
        let before = self.read_cpu_times()?;
        std::thread::sleep(interval);
        let after = self.read_cpu_times()?;
        Ok(busy_percent(&before, &after))
    }

    /// Collects load average from `/proc/loadavg`.
    pub fn collect_loadavg(&self) -> Result<LoadAverage, CollectError> {
        let path = format!("{}/loadavg", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;
        let info = parse_loadavg(&content)?;

        Ok(LoadAverage {
            load1: info.load1,
            load5: info.load5,
            load15: info.load15,
        })
    }

    /// Number of logical CPUs usable by this process.
    pub fn num_cpus(&self) -> usize {
        num_cpus::get()
    }
}

/// Reads `/proc/meminfo`. Shared with the per-process memory share.
pub(crate) fn read_meminfo<F: FileSystem>(
    fs: &F,
    proc_path: &str,
) -> Result<MemInfo, CollectError> {
    let path = format!("{}/meminfo", proc_path);
    let content = fs.read_to_string(Path::new(&path))?;
    Ok(parse_meminfo(&content)?)
}

/// `part / whole` in percent, 0 when `whole` is 0.
pub(crate) fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Busy share between two `/proc/stat` samples.
///
/// No busy ticks elapsed gives 0. Busy ticks without total ticks (counter
/// skew between cores) gives 100.
fn busy_percent(before: &CpuTimes, after: &CpuTimes) -> f64 {
    let (busy_before, busy_after) = (before.busy(), after.busy());
    if busy_after <= busy_before {
        return 0.0;
    }
    let (total_before, total_after) = (before.total(), after.total());
    if total_after <= total_before {
        return 100.0;
    }
    percent(busy_after - busy_before, total_after - total_before).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_collect_virtual_memory() {
        let fs = MockFs::typical_system();
        let collector = SystemCollector::new(fs, "/proc");

        let mem = collector.collect_virtual_memory().unwrap();

        assert_eq!(mem.total, 16384000 * 1024);
        assert_eq!(mem.free, 8192000 * 1024);
        // (16384000 - 12288000) / 16384000
        assert!((mem.used_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_collect_swap_memory() {
        let fs = MockFs::typical_system();
        let collector = SystemCollector::new(fs, "/proc");

        let swap = collector.collect_swap_memory().unwrap();

        assert_eq!(swap.total, 4096000 * 1024);
        assert_eq!(swap.free, 3072000 * 1024);
        assert!((swap.used_percent - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_collect_swap_memory_without_swap() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/meminfo",
            "MemTotal: 1000 kB\nMemFree: 500 kB\nMemAvailable: 700 kB\nSwapTotal: 0 kB\nSwapFree: 0 kB\n",
        );
        let collector = SystemCollector::new(fs, "/proc");

        let swap = collector.collect_swap_memory().unwrap();
        assert_eq!(swap, MemoryUsage::default());
    }

    #[test]
    fn test_collect_loadavg() {
        let fs = MockFs::typical_system();
        let collector = SystemCollector::new(fs, "/proc");

        let load = collector.collect_loadavg().unwrap();
        assert!((load.load1 - 0.15).abs() < 0.001);
        assert!((load.load5 - 0.10).abs() < 0.001);
        assert!((load.load15 - 0.05).abs() < 0.001);
    }

    #[test]
    fn test_collect_cpu_percent_static_counters() {
        // the mock never changes between reads, so nothing was busy
        let fs = MockFs::typical_system();
        let collector = SystemCollector::new(fs, "/proc");

        let pct = collector.collect_cpu_percent(Duration::ZERO).unwrap();
        assert_eq!(pct, 0.0);
    }

    #[test]
    fn test_busy_percent() {
        let before = CpuTimes {
            user: 100,
            system: 100,
            idle: 800,
            ..CpuTimes::default()
        };
        let after = CpuTimes {
            user: 150,
            system: 100,
            idle: 950,
            ..CpuTimes::default()
        };
        // 50 busy ticks out of 200
        assert!((busy_percent(&before, &after) - 25.0).abs() < 1e-9);
        assert_eq!(busy_percent(&after, &before), 0.0);
    }

    #[test]
    fn test_missing_files_are_io_errors() {
        let collector = SystemCollector::new(MockFs::new(), "/proc");

        assert!(matches!(
            collector.collect_virtual_memory(),
            Err(CollectError::Io(_))
        ));
        assert!(matches!(collector.collect_loadavg(), Err(CollectError::Io(_))));
        assert!(collector.collect_cpu_percent(Duration::ZERO).is_err());
    }

    #[test]
    fn test_num_cpus() {
        let collector = SystemCollector::new(MockFs::new(), "/proc");
        assert!(collector.num_cpus() >= 1);
    }
}
