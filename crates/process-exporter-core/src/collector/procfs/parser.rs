//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions over file contents, so every edge case can be
//! tested with plain string fixtures.

use std::collections::HashMap;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

/// CPU and memory fields of `/proc/[pid]/stat`.
#[derive(Debug, Clone, Default)]
pub struct ProcStat {
    /// User-mode time in clock ticks.
    pub utime: u64,
    /// Kernel-mode time in clock ticks.
    pub stime: u64,
    /// Process start, in clock ticks after boot.
    pub starttime: u64,
    /// Virtual memory size in bytes.
    pub vsize: u64,
}

/// Parses `/proc/[pid]/stat` content.
///
/// The comm field can contain spaces and parentheses, so fields are counted
/// from the last `)`.
/// Format: pid (comm) state ppid pgrp session tty_nr ...
pub fn parse_proc_stat(content: &str) -> Result<ProcStat, ParseError> {
    let close_paren = content
        .rfind(')')
        .ok_or_else(|| ParseError::new("missing ')' in stat"))?;

    let fields: Vec<&str> = content[close_paren + 1..].split_whitespace().collect();

    if fields.len() < 21 {
        return Err(ParseError::new(format!(
            "not enough fields in stat: expected 21+, got {}",
            fields.len()
        )));
    }

    let parse_field = |idx: usize, name: &str| -> Result<u64, ParseError> {
        fields[idx]
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {}", name)))
    };

    Ok(ProcStat {
        utime: parse_field(11, "utime")?,
        stime: parse_field(12, "stime")?,
        starttime: parse_field(19, "starttime")?,
        vsize: parse_field(20, "vsize")?,
    })
}

/// Fields of `/proc/[pid]/status` used by the probes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcStatus {
    pub threads: Option<u64>,
    /// Resident set size in kB, 0 for kernel threads and zombies.
    pub vm_rss: u64,
}

/// Parses `/proc/[pid]/status` content.
///
/// Format is key:\tvalue pairs, one per line. Unknown keys are ignored.
pub fn parse_proc_status(content: &str) -> ProcStatus {
    let fields: HashMap<&str, &str> = content
        .lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim(), value.trim()))
        .collect();

    ProcStatus {
        threads: fields.get("Threads").and_then(|s| s.parse().ok()),
        vm_rss: fields
            .get("VmRSS")
            .and_then(|s| s.split_whitespace().next())
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
    }
}

/// Parsed data from `/proc/meminfo`. All values are in kB.
#[derive(Debug, Clone, Default)]
pub struct MemInfo {
    pub mem_total: u64,
    pub mem_free: u64,
    pub mem_available: u64,
    pub swap_total: u64,
    pub swap_free: u64,
}

/// Parses `/proc/meminfo` content.
pub fn parse_meminfo(content: &str) -> Result<MemInfo, ParseError> {
    let mut info = MemInfo::default();
    let mut seen_total = false;

    for line in content.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let value = rest
            .split_whitespace()
            .next()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        match key {
            "MemTotal" => {
                info.mem_total = value;
                seen_total = true;
            }
            "MemFree" => info.mem_free = value,
            "MemAvailable" => info.mem_available = value,
            "SwapTotal" => info.swap_total = value,
            "SwapFree" => info.swap_free = value,
            _ => {}
        }
    }

    if !seen_total {
        return Err(ParseError::new("missing MemTotal in meminfo"));
    }

    Ok(info)
}

/// Aggregate CPU times from the `cpu` line of `/proc/stat`, in clock ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
    pub guest: u64,
    pub guest_nice: u64,
}

impl CpuTimes {
    /// Total ticks across all states.
    ///
    /// `user` and `nice` already include guest time, so guest columns are
    /// subtracted to avoid counting them twice.
    pub fn total(&self) -> u64 {
        let user = self.user.saturating_sub(self.guest);
        let nice = self.nice.saturating_sub(self.guest_nice);
        user + nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
            + self.guest
            + self.guest_nice
    }

    /// Ticks spent doing work: everything except idle and iowait.
    pub fn busy(&self) -> u64 {
        self.total()
            .saturating_sub(self.idle)
            .saturating_sub(self.iowait)
    }
}

/// Parses the aggregate `cpu` line of `/proc/stat`.
///
/// Per-core lines (`cpu0`, `cpu1`, ...) and the other counters are ignored.
pub fn parse_cpu_times(content: &str) -> Result<CpuTimes, ParseError> {
    let line = content
        .lines()
        .find(|line| line.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| ParseError::new("missing aggregate cpu line in stat"))?;

    let values: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|s| s.parse().map_err(|_| ParseError::new("invalid cpu field")))
        .collect::<Result<_, _>>()?;

    if values.len() < 4 {
        return Err(ParseError::new(format!(
            "not enough cpu fields: expected 4+, got {}",
            values.len()
        )));
    }

    let get = |idx: usize| values.get(idx).copied().unwrap_or(0);

    Ok(CpuTimes {
        user: get(0),
        nice: get(1),
        system: get(2),
        idle: get(3),
        iowait: get(4),
        irq: get(5),
        softirq: get(6),
        steal: get(7),
        guest: get(8),
        guest_nice: get(9),
    })
}

/// Parsed data from `/proc/loadavg`.
#[derive(Debug, Clone, Default)]
pub struct LoadAvg {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
}

/// Parses `/proc/loadavg` content.
pub fn parse_loadavg(content: &str) -> Result<LoadAvg, ParseError> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(ParseError::new("invalid loadavg format"));
    }

    let load1 = parts[0]
        .parse()
        .map_err(|_| ParseError::new("invalid load1"))?;
    let load5 = parts[1]
        .parse()
        .map_err(|_| ParseError::new("invalid load5"))?;
    let load15 = parts[2]
        .parse()
        .map_err(|_| ParseError::new("invalid load15"))?;

    Ok(LoadAvg {
        load1,
        load5,
        load15,
    })
}

/// Parses `/proc/uptime` and returns the system uptime in seconds.
pub fn parse_uptime(content: &str) -> Result<f64, ParseError> {
    content
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new("empty uptime"))?
        .parse()
        .map_err(|_| ParseError::new("invalid uptime"))
}

/// Soft resource limits from `/proc/[pid]/limits`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcLimits {
    pub open_files: u64,
    /// Address space limit in bytes.
    pub address_space: u64,
}

/// Parses `/proc/[pid]/limits` content.
///
/// Only the soft limits are kept. `unlimited` is reported as `u64::MAX`.
pub fn parse_limits(content: &str) -> Result<ProcLimits, ParseError> {
    let soft_limit = |name: &str| -> Result<u64, ParseError> {
        let rest = content
            .lines()
            .find_map(|line| line.strip_prefix(name))
            .ok_or_else(|| ParseError::new(format!("missing '{}' in limits", name)))?;

        match rest.split_whitespace().next() {
            Some("unlimited") => Ok(u64::MAX),
            Some(value) => value
                .parse()
                .map_err(|_| ParseError::new(format!("invalid '{}' value", name))),
            None => Err(ParseError::new(format!("empty '{}' value", name))),
        }
    };

    Ok(ProcLimits {
        open_files: soft_limit("Max open files")?,
        address_space: soft_limit("Max address space")?,
    })
}

/// One row of `/proc/net/{tcp,tcp6,udp,udp6}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketEntry {
    pub inode: u64,
    /// Kernel socket state (`st` column), e.g. `0x0A` for LISTEN.
    pub state: u8,
}

/// Parses an inet socket table such as `/proc/net/tcp`.
///
/// The first line is a header. Columns are:
/// `sl local_address rem_address st tx_queue:rx_queue tr:tm->when retrnsmt uid timeout inode ...`
pub fn parse_socket_table(content: &str) -> Result<Vec<SocketEntry>, ParseError> {
    let mut entries = Vec::new();

    for line in content.lines().skip(1) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() < 10 {
            return Err(ParseError::new(format!(
                "not enough fields in socket table: expected 10+, got {}",
                fields.len()
            )));
        }

        let state = u8::from_str_radix(fields[3], 16)
            .map_err(|_| ParseError::new(format!("invalid socket state '{}'", fields[3])))?;
        let inode = fields[9]
            .parse()
            .map_err(|_| ParseError::new(format!("invalid socket inode '{}'", fields[9])))?;

        entries.push(SocketEntry { inode, state });
    }

    Ok(entries)
}

/// Parses `/proc/net/unix` and returns the socket inodes.
///
/// Columns: `Num RefCount Protocol Flags Type St Inode Path`.
pub fn parse_unix_socket_table(content: &str) -> Result<Vec<u64>, ParseError> {
    content
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_whitespace()
                .nth(6)
                .ok_or_else(|| ParseError::new("missing inode in unix socket table"))?
                .parse()
                .map_err(|_| ParseError::new("invalid unix socket inode"))
        })
        .collect()
}

/// Extracts the inode from an fd link target of the form `socket:[12345]`.
pub fn parse_socket_inode(target: &str) -> Option<u64> {
    target
        .strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}
