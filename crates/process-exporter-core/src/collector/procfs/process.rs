//! Per-process probes over `/proc/[pid]/`.

use crate::collector::connections::{ConnectionCounts, ConnectionState};
use crate::collector::model::{ProcessStat, ProcessUsage, ResourceLimits};
use crate::collector::procfs::parser::{
    ParseError, ProcStat, ProcStatus, parse_limits, parse_proc_stat, parse_proc_status,
    parse_socket_inode, parse_socket_table, parse_unix_socket_table, parse_uptime,
};
use crate::collector::procfs::system::{percent, read_meminfo};
use crate::collector::traits::FileSystem;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// Clock ticks per second (USER_HZ). Standard value for Linux.
const CLK_TCK: u64 = 100;

/// Inet socket tables under `/proc/[pid]/net/`, and whether their `st`
/// column carries a TCP state.
const INET_SOCKET_TABLES: [(&str, bool); 4] =
    [("tcp", true), ("tcp6", true), ("udp", false), ("udp6", false)];

/// Error type for probe failures.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    /// Process does not exist, or disappeared during collection.
    #[error("process {0} not found")]
    ProcessGone(u32),
    /// I/O error reading `/proc` files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Collects metrics of a single process from `/proc/[pid]/` files.
pub struct ProcessCollector<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> ProcessCollector<F> {
    /// Creates a new process collector.
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

    fn pid_path(&self, pid: u32, file: &str) -> PathBuf {
        PathBuf::from(format!("{}/{}/{}", self.proc_path, pid, file))
    }

    /// Reads `/proc/[pid]/<file>`. A missing file means the process is gone.
    fn read(&self, pid: u32, file: &str) -> Result<String, CollectError> {
        self.fs
            .read_to_string(&self.pid_path(pid, file))
            .map_err(|e| gone_if_not_found(pid, e))
    }

    fn read_stat(&self, pid: u32) -> Result<ProcStat, CollectError> {
        let content = self.read(pid, "stat")?;
        Ok(parse_proc_stat(&content)?)
    }

    fn read_status(&self, pid: u32) -> Result<ProcStatus, CollectError> {
        Ok(parse_proc_status(&self.read(pid, "status")?))
    }

    /// Resident set size in bytes, from `VmRSS` in `/proc/[pid]/status`.
    ///
    /// The kernel reports it in kB, so no page size is assumed.
    fn resident_bytes(&self, pid: u32) -> Result<u64, CollectError> {
        Ok(self.read_status(pid)?.vm_rss * 1024)
    }

    /// Returns the link targets of every entry in `/proc/[pid]/fd`.
    ///
    /// Descriptors closed between listing and reading are skipped.
    fn fd_targets(&self, pid: u32) -> Result<Vec<PathBuf>, CollectError> {
        let entries = self
            .fs
            .read_dir(&self.pid_path(pid, "fd"))
            .map_err(|e| gone_if_not_found(pid, e))?;

        Ok(entries
            .iter()
            .filter_map(|entry| self.fs.read_link(entry).ok())
            .collect())
    }

    /// Collects CPU time and virtual size from `/proc/[pid]/stat` and
    /// resident size from `/proc/[pid]/status`.
    pub fn collect_stat(&self, pid: u32) -> Result<ProcessStat, CollectError> {
        let stat = self.read_stat(pid)?;

        Ok(ProcessStat {
            cpu_seconds: (stat.utime + stat.stime) as f64 / CLK_TCK as f64,
            virtual_memory_bytes: stat.vsize,
            resident_memory_bytes: self.resident_bytes(pid)?,
        })
    }

    /// Collects soft limits from `/proc/[pid]/limits`.
    pub fn collect_limits(&self, pid: u32) -> Result<ResourceLimits, CollectError> {
        let limits = parse_limits(&self.read(pid, "limits")?)?;

        Ok(ResourceLimits {
            max_open_files: limits.open_files,
            max_address_space: limits.address_space,
        })
    }

    /// Counts entries in `/proc/[pid]/fd`.
    pub fn count_open_fds(&self, pid: u32) -> Result<u64, CollectError> {
        let entries = self
            .fs
            .read_dir(&self.pid_path(pid, "fd"))
            .map_err(|e| gone_if_not_found(pid, e))?;
        Ok(entries.len() as u64)
    }

    /// Computes CPU and memory share of the process.
    ///
    /// CPU percent is total CPU time over wall time since the process started,
    /// so it is an average over the process lifetime, not an instant rate.
    pub fn collect_usage(&self, pid: u32) -> Result<ProcessUsage, CollectError> {
        let stat = self.read_stat(pid)?;

        let uptime_path = format!("{}/uptime", self.proc_path);
        let uptime = parse_uptime(&self.fs.read_to_string(Path::new(&uptime_path))?)?;

        let meminfo = read_meminfo(&self.fs, &self.proc_path)?;

        let cpu_seconds = (stat.utime + stat.stime) as f64 / CLK_TCK as f64;
        let running_for = uptime - stat.starttime as f64 / CLK_TCK as f64;
        let cpu_percent = if running_for > 0.0 {
            cpu_seconds / running_for * 100.0
        } else {
            0.0
        };

        let rss_bytes = self.resident_bytes(pid)?;

        Ok(ProcessUsage {
            cpu_percent,
            mem_percent: percent(rss_bytes, meminfo.mem_total * 1024),
        })
    }

    /// Reads the thread count from `/proc/[pid]/status`.
    pub fn count_threads(&self, pid: u32) -> Result<u64, CollectError> {
        self.read_status(pid)?
            .threads
            .ok_or_else(|| ParseError::new("missing Threads in status").into())
    }

    /// Counts descriptors that refer to files on disk.
    ///
    /// Sockets, pipes and anonymous inodes have non-path link targets and are
    /// not counted.
    pub fn count_open_files(&self, pid: u32) -> Result<u64, CollectError> {
        let targets = self.fd_targets(pid)?;
        Ok(targets.iter().filter(|target| target.is_absolute()).count() as u64)
    }

    /// Classifies the process's sockets by connection state.
    ///
    /// Socket inodes come from the `socket:[N]` links in `/proc/[pid]/fd` and
    /// are looked up in the process's own network namespace tables. A table
    /// that does not exist (IPv6 disabled, for example) is skipped.
    pub fn collect_connections(&self, pid: u32) -> Result<ConnectionCounts, CollectError> {
        let inodes: HashSet<u64> = self
            .fd_targets(pid)?
            .iter()
            .filter_map(|target| target.to_str().and_then(parse_socket_inode))
            .collect();

        let mut counts = ConnectionCounts::default();
        if inodes.is_empty() {
            return Ok(counts);
        }

        for (table, has_state) in INET_SOCKET_TABLES {
            let Some(content) = self.read_socket_table(pid, table)? else {
                continue;
            };
            for entry in parse_socket_table(&content)? {
                if inodes.contains(&entry.inode) {
                    counts.record(if has_state {
                        ConnectionState::from_tcp_state(entry.state)
                    } else {
                        ConnectionState::Other
                    });
                }
            }
        }

        if let Some(content) = self.read_socket_table(pid, "unix")? {
            for inode in parse_unix_socket_table(&content)? {
                if inodes.contains(&inode) {
                    counts.record(ConnectionState::Other);
                }
            }
        }

        Ok(counts)
    }

    fn read_socket_table(&self, pid: u32, table: &str) -> Result<Option<String>, CollectError> {
        match self.fs.read_to_string(&self.pid_path(pid, &format!("net/{}", table))) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

fn gone_if_not_found(pid: u32, e: io::Error) -> CollectError {
    if e.kind() == io::ErrorKind::NotFound {
        CollectError::ProcessGone(pid)
    } else {
        CollectError::Io(e)
    }
}
