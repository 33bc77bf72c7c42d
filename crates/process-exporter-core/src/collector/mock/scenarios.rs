//! Pre-built mock filesystem scenarios for testing.

use super::filesystem::MockFs;

/// PID of the scraped process in [`MockFs::typical_system`].
pub const TARGET_PID: u32 = 4242;

const TCP_HEADER: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode\n";
const UNIX_HEADER: &str = "Num       RefCount Protocol Flags    Type St Inode Path\n";

const DEFAULT_LIMITS: &str = "\
Limit                     Soft Limit           Hard Limit           Units
Max cpu time              unlimited            unlimited            seconds
Max file size             unlimited            unlimited            bytes
Max data size             unlimited            unlimited            bytes
Max stack size            8388608              unlimited            bytes
Max processes             63304                63304                processes
Max open files            65536                65536                files
Max address space         unlimited            unlimited            bytes
";

impl MockFs {
    /// Creates a host with an init process and an nginx worker at
    /// [`TARGET_PID`].
    ///
    /// The worker holds 12 descriptors: three on `/dev/null`, three regular
    /// files and six sockets (1 LISTEN, 2 ESTABLISHED, 1 CLOSE_WAIT, 1 UDP,
    /// 1 unix).
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_file("/proc/uptime", "12345.67 98765.43\n");
        fs.add_file("/proc/loadavg", "0.15 0.10 0.05 1/150 4242\n");
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12288000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
SwapTotal:       4096000 kB
SwapFree:        3072000 kB
",
        );
        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );

        fs.add_process(
            1,
            "1 (systemd) S 0 1 1 0 -1 4194560 50000 1000000 100 500 1000 500 5000 2000 20 0 1 0 1 170000000 3000 18446744073709551615 1 1 0 0 0 0 671173123 4096 1260 0 0 0 17 0 0 0 0 0 0",
            "Name:\tsystemd\nPid:\t1\nPPid:\t0\nVmRSS:\t   12000 kB\nThreads:\t1\n",
            DEFAULT_LIMITS,
        );
        fs.add_fd(1, 0, "/dev/null");

        let pid = TARGET_PID;
        fs.add_process(
            pid,
            "4242 (nginx) S 1 4242 4242 0 -1 4194560 2000 0 0 0 1500 500 0 0 20 0 8 0 234567 104857600 5000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0",
            "Name:\tnginx\nUmask:\t0022\nState:\tS (sleeping)\nPid:\t4242\nPPid:\t1\nVmRSS:\t   20000 kB\nThreads:\t8\n",
            DEFAULT_LIMITS,
        );

        fs.add_fd(pid, 0, "/dev/null");
        fs.add_fd(pid, 1, "/dev/null");
        fs.add_fd(pid, 2, "/dev/null");
        fs.add_fd(pid, 3, "/var/log/nginx/access.log");
        fs.add_fd(pid, 4, "/var/log/nginx/error.log");
        fs.add_fd(pid, 5, "socket:[10001]");
        fs.add_fd(pid, 6, "socket:[10002]");
        fs.add_fd(pid, 7, "socket:[10003]");
        fs.add_fd(pid, 8, "socket:[10004]");
        fs.add_fd(pid, 9, "socket:[10005]");
        fs.add_fd(pid, 10, "socket:[10006]");
        fs.add_fd(pid, 11, "/srv/data/cache.db");

        // 20001 and 20002 belong to other processes in the same namespace
        fs.add_file(
            format!("/proc/{}/net/tcp", pid),
            format!(
                "{}{}{}{}{}",
                TCP_HEADER,
                "   0: 00000000:0050 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 10002 1 0000000000000000 100 0 0 10 0\n",
                "   1: 0100007F:0050 0100007F:D431 01 00000000:00000000 00:00000000 00000000     0        0 10001 1 0000000000000000 20 4 30 10 -1\n",
                "   2: 0100007F:0050 0100007F:D432 08 00000000:00000000 00:00000000 00000000     0        0 10004 1 0000000000000000 20 4 30 10 -1\n",
                "   3: 0100007F:1F90 0100007F:D433 06 00000000:00000000 03:00000D2B 00000000     0        0 20001 1 0000000000000000 20 4 30 10 -1\n",
            ),
        );
        fs.add_file(
            format!("/proc/{}/net/tcp6", pid),
            format!(
                "{}{}",
                TCP_HEADER,
                "   0: 00000000000000000000000001000000:0050 00000000000000000000000001000000:D434 01 00000000:00000000 00:00000000 00000000     0        0 10003 1 0000000000000000 20 4 30 10 -1\n",
            ),
        );
        fs.add_file(
            format!("/proc/{}/net/udp", pid),
            format!(
                "{}{}",
                TCP_HEADER,
                "  53: 00000000:0202 00000000:0000 07 00000000:00000000 00:00000000 00000000     0        0 10005 2 0000000000000000 0\n",
            ),
        );
        fs.add_file(format!("/proc/{}/net/udp6", pid), TCP_HEADER);
        fs.add_file(
            format!("/proc/{}/net/unix", pid),
            format!(
                "{}{}{}",
                UNIX_HEADER,
                "0000000000000000: 00000002 00000000 00010000 0001 01 10006 /run/nginx.sock\n",
                "0000000000000000: 00000003 00000000 00000000 0001 03 20002 /run/systemd/notify\n",
            ),
        );

        fs
    }

    /// Creates a system with a zombie process at PID 4000.
    ///
    /// Zombies keep their `/proc` entry but have no memory and no descriptors.
    pub fn with_zombie_process() -> Self {
        let mut fs = Self::typical_system();

        fs.add_process(
            4000,
            "4000 (defunct) Z 1000 4000 1000 0 -1 4194308 0 0 0 0 0 0 0 0 20 0 1 0 400000 0 0 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 -1 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "Name:\tdefunct\nState:\tZ (zombie)\nPid:\t4000\nPPid:\t1000\nThreads:\t1\n",
            DEFAULT_LIMITS,
        );

        fs
    }
}
