//! Probe result records.
//!
//! Each record bundles the raw facts one probe produces. `Default` is the
//! all-zero value reported when the probe fails.

/// Memory usage of RAM or swap. Sizes are in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemoryUsage {
    pub used_percent: f64,
    pub total: u64,
    pub free: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadAverage {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
}

/// CPU time and memory of one process, from `/proc/[pid]/stat`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessStat {
    /// User plus system CPU time in seconds.
    pub cpu_seconds: f64,
    pub virtual_memory_bytes: u64,
    pub resident_memory_bytes: u64,
}

/// Soft limits of one process.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceLimits {
    pub max_open_files: u64,
    pub max_address_space: u64,
}

/// CPU and memory share of one process, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProcessUsage {
    /// CPU time over wall time since the process started.
    pub cpu_percent: f64,
    /// Resident memory over total RAM.
    pub mem_percent: f64,
}
