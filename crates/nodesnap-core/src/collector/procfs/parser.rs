//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions over file contents, so every format quirk is
//! covered by string-input tests below.

use std::collections::BTreeMap;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
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

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

fn parse_field<T: std::str::FromStr>(value: &str, what: &str) -> Result<T, ParseError> {
    value
        .parse()
        .map_err(|_| ParseError::new(format!("invalid {what}: {value:?}")))
}

// ============ Load Average ============

/// Parsed data from `/proc/loadavg`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadAvg {
    pub load1: f64,
    pub load5: f64,
    pub load15: f64,
}

/// Parses `/proc/loadavg` content.
///
/// Format: `0.15 0.10 0.05 1/150 1234`; only the three averages are used.
pub fn parse_loadavg(content: &str) -> Result<LoadAvg, ParseError> {
    let parts: Vec<&str> = content.split_whitespace().collect();
    if parts.len() < 3 {
        return Err(ParseError::new(format!(
            "unexpected loadavg content: {:?}",
            content.trim()
        )));
    }

    Ok(LoadAvg {
        load1: parse_field(parts[0], "load1")?,
        load5: parse_field(parts[1], "load5")?,
        load15: parse_field(parts[2], "load15")?,
    })
}

// ============ Memory ============

/// Parses `/proc/meminfo` into field name -> value.
///
/// Values carrying a `kB` unit are converted to bytes; unit-less values
/// (e.g. `HugePages_Total`) are kept as-is.
pub fn parse_meminfo(content: &str) -> Result<BTreeMap<String, u64>, ParseError> {
    let mut fields = BTreeMap::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((key, rest)) = line.split_once(':') else {
            return Err(ParseError::new(format!("invalid meminfo line: {line:?}")));
        };

        let mut parts = rest.split_whitespace();
        let value: u64 = match parts.next() {
            Some(v) => parse_field(v, key)?,
            None => return Err(ParseError::new(format!("missing value for {key}"))),
        };
        let value = match parts.next() {
            Some("kB") => value * 1024,
            Some(unit) => {
                return Err(ParseError::new(format!("unknown unit {unit:?} for {key}")));
            }
            None => value,
        };

        fields.insert(key.trim().to_string(), value);
    }

    if fields.is_empty() {
        return Err(ParseError::new("meminfo is empty"));
    }
    Ok(fields)
}

// ============ Kernel/System Statistics ============

/// Per-CPU time counters from `/proc/stat`, in USER_HZ ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuTimes {
    pub cpu: u32,
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTimes {
    /// Mode label and tick count pairs, in exposition order.
    pub fn modes(&self) -> [(&'static str, u64); 8] {
        [
            ("idle", self.idle),
            ("iowait", self.iowait),
            ("irq", self.irq),
            ("nice", self.nice),
            ("softirq", self.softirq),
            ("steal", self.steal),
            ("system", self.system),
            ("user", self.user),
        ]
    }
}

/// Parsed data from `/proc/stat`.
///
/// The aggregate `cpu` line is skipped; only per-CPU lines are kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KernelStat {
    pub cpus: Vec<CpuTimes>,
    pub intr: u64,
    pub ctxt: u64,
    pub btime: u64,
    pub processes: u64,
    pub procs_running: u64,
    pub procs_blocked: u64,
}

/// Parses `/proc/stat` content.
pub fn parse_stat(content: &str) -> Result<KernelStat, ParseError> {
    let mut stat = KernelStat::default();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&key, values)) = parts.split_first() else {
            continue;
        };

        let first = || -> Result<u64, ParseError> {
            match values.first() {
                Some(v) => parse_field(v, key),
                None => Err(ParseError::new(format!("missing value for {key}"))),
            }
        };

        match key {
            "cpu" => {}
            "intr" => stat.intr = first()?,
            "ctxt" => stat.ctxt = first()?,
            "btime" => stat.btime = first()?,
            "processes" => stat.processes = first()?,
            "procs_running" => stat.procs_running = first()?,
            "procs_blocked" => stat.procs_blocked = first()?,
            _ => {
                let Some(id) = key.strip_prefix("cpu") else {
                    continue;
                };
                if values.len() < 8 {
                    return Err(ParseError::new(format!("short cpu line: {line:?}")));
                }
                let tick = |idx: usize| parse_field::<u64>(values[idx], key);
                stat.cpus.push(CpuTimes {
                    cpu: parse_field(id, "cpu id")?,
                    user: tick(0)?,
                    nice: tick(1)?,
                    system: tick(2)?,
                    idle: tick(3)?,
                    iowait: tick(4)?,
                    irq: tick(5)?,
                    softirq: tick(6)?,
                    steal: tick(7)?,
                });
            }
        }
    }

    Ok(stat)
}

// ============ Network Devices ============

/// Per-interface counters from `/proc/net/dev`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetDevStats {
    pub interface: String,
    pub rx_bytes: u64,
    pub rx_packets: u64,
    pub rx_errs: u64,
    pub rx_drop: u64,
    pub tx_bytes: u64,
    pub tx_packets: u64,
    pub tx_errs: u64,
    pub tx_drop: u64,
}

/// Parses `/proc/net/dev` content.
///
/// The two header lines contain `|` separators and are skipped. Each data line
/// is `iface: <8 receive columns> <8 transmit columns>`.
pub fn parse_net_dev(content: &str) -> Result<Vec<NetDevStats>, ParseError> {
    let mut devices = Vec::new();

    for line in content.lines() {
        if line.contains('|') || line.trim().is_empty() {
            continue;
        }

        let Some((interface, counters)) = line.split_once(':') else {
            return Err(ParseError::new(format!("invalid net/dev line: {line:?}")));
        };
        let values: Vec<&str> = counters.split_whitespace().collect();
        if values.len() < 16 {
            return Err(ParseError::new(format!(
                "expected 16 counters for {}, got {}",
                interface.trim(),
                values.len()
            )));
        }
        let counter = |idx: usize| parse_field::<u64>(values[idx], interface.trim());

        devices.push(NetDevStats {
            interface: interface.trim().to_string(),
            rx_bytes: counter(0)?,
            rx_packets: counter(1)?,
            rx_errs: counter(2)?,
            rx_drop: counter(3)?,
            tx_bytes: counter(8)?,
            tx_packets: counter(9)?,
            tx_errs: counter(10)?,
            tx_drop: counter(11)?,
        });
    }

    Ok(devices)
}

// ============ Block Devices ============

/// Per-device counters from `/proc/diskstats`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiskStats {
    pub device: String,
    pub reads: u64,
    pub reads_merged: u64,
    pub read_sectors: u64,
    pub read_time_ms: u64,
    pub writes: u64,
    pub writes_merged: u64,
    pub write_sectors: u64,
    pub write_time_ms: u64,
    pub io_in_progress: u64,
    pub io_time_ms: u64,
    pub io_weighted_time_ms: u64,
}

/// Parses `/proc/diskstats` content.
///
/// Format: `major minor name` followed by at least eleven counters; the
/// discard and flush columns of newer kernels are ignored. Lines with fewer
/// columns (old partition format) are skipped.
pub fn parse_diskstats(content: &str) -> Result<Vec<DiskStats>, ParseError> {
    let mut disks = Vec::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 14 {
            continue;
        }
        let device = parts[2];
        let counter = |idx: usize| parse_field::<u64>(parts[idx], device);

        disks.push(DiskStats {
            device: device.to_string(),
            reads: counter(3)?,
            reads_merged: counter(4)?,
            read_sectors: counter(5)?,
            read_time_ms: counter(6)?,
            writes: counter(7)?,
            writes_merged: counter(8)?,
            write_sectors: counter(9)?,
            write_time_ms: counter(10)?,
            io_in_progress: counter(11)?,
            io_time_ms: counter(12)?,
            io_weighted_time_ms: counter(13)?,
        });
    }

    Ok(disks)
}

// ============ Virtual Memory ============

/// Parses `/proc/vmstat` into key -> value.
pub fn parse_vmstat(content: &str) -> Result<BTreeMap<String, u64>, ParseError> {
    let mut fields = BTreeMap::new();

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        fields.insert(key.to_string(), parse_field(value, key)?);
    }

    Ok(fields)
}

// ============ Pressure Stall Information ============

/// One `some` or `full` line of a pressure file.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PressureLine {
    pub avg10: f64,
    pub avg60: f64,
    pub avg300: f64,
    /// Total stall time in microseconds.
    pub total: u64,
}

/// Parsed data from `/proc/pressure/{cpu,memory,io}`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PressureStats {
    pub some: Option<PressureLine>,
    /// Absent for CPU on older kernels.
    pub full: Option<PressureLine>,
}

/// Parses `/proc/pressure/*` content.
///
/// Format:
/// some avg10=0.00 avg60=0.00 avg300=0.00 total=0
/// full avg10=0.00 avg60=0.00 avg300=0.00 total=0
pub fn parse_psi(content: &str) -> Result<PressureStats, ParseError> {
    let mut stats = PressureStats::default();

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let kind = match parts.next() {
            Some(kind @ ("some" | "full")) => kind,
            Some(other) => return Err(ParseError::new(format!("unknown pressure line {other:?}"))),
            None => continue,
        };

        let mut psi = PressureLine::default();
        for part in parts {
            let Some((key, value)) = part.split_once('=') else {
                return Err(ParseError::new(format!("malformed pressure field {part:?}")));
            };
            match key {
                "avg10" => psi.avg10 = parse_field(value, key)?,
                "avg60" => psi.avg60 = parse_field(value, key)?,
                "avg300" => psi.avg300 = parse_field(value, key)?,
                "total" => psi.total = parse_field(value, key)?,
                _ => {}
            }
        }

        if kind == "some" {
            stats.some = Some(psi);
        } else {
            stats.full = Some(psi);
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_loadavg() {
        let avg = parse_loadavg("0.15 0.10 0.05 1/150 1234\n").unwrap();
        assert_eq!(
            avg,
            LoadAvg {
                load1: 0.15,
                load5: 0.10,
                load15: 0.05
            }
        );
    }

    #[test]
    fn test_parse_loadavg_rejects_garbage() {
        assert!(parse_loadavg("").is_err());
        let err = parse_loadavg("x 0.10 0.05 1/150 1234").unwrap_err();
        assert!(err.message.contains("load1"));
    }

    #[test]
    fn test_parse_meminfo_scales_kb() {
        let fields = parse_meminfo(
            "\
MemTotal:       16384 kB
MemFree:         8192 kB
HugePages_Total:    4
",
        )
        .unwrap();

        assert_eq!(fields["MemTotal"], 16384 * 1024);
        assert_eq!(fields["MemFree"], 8192 * 1024);
        assert_eq!(fields["HugePages_Total"], 4);
    }

    #[test]
    fn test_parse_meminfo_errors() {
        assert!(parse_meminfo("").is_err());
        assert!(parse_meminfo("MemTotal 16384 kB\n").is_err());
        assert!(parse_meminfo("MemTotal: lots kB\n").is_err());
        assert!(parse_meminfo("MemTotal: 1 MB\n").is_err());
    }

    #[test]
    fn test_parse_stat() {
        let stat = parse_stat(
            "\
cpu  200 10 60 1600 20 4 2 0 0 0
cpu0 100 5 30 800 10 2 1 0 0 0
cpu1 100 5 30 800 10 2 1 0 0 0
intr 1000000 50 0 0
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 1
softirq 123 1 2 3
",
        )
        .unwrap();

        assert_eq!(stat.cpus.len(), 2);
        assert_eq!(stat.cpus[1].cpu, 1);
        assert_eq!(stat.cpus[1].user, 100);
        assert_eq!(stat.cpus[1].idle, 800);
        assert_eq!(stat.intr, 1_000_000);
        assert_eq!(stat.ctxt, 500_000);
        assert_eq!(stat.btime, 1_700_000_000);
        assert_eq!(stat.processes, 10_000);
        assert_eq!(stat.procs_running, 2);
        assert_eq!(stat.procs_blocked, 1);
    }

    #[test]
    fn test_parse_stat_short_cpu_line() {
        assert!(parse_stat("cpu0 1 2 3\n").is_err());
    }

    #[test]
    fn test_cpu_modes_sorted() {
        let modes = CpuTimes::default().modes();
        let names: Vec<&str> = modes.iter().map(|(m, _)| *m).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_parse_net_dev() {
        let devices = parse_net_dev(
            "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1000     10    0    0    0     0          0         0 1000     10    0    0    0     0       0          0
  eth0: 9876   54    5   10    0     0          0       100 1234   45    2    3    0     0       0          0
",
        )
        .unwrap();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[1].interface, "eth0");
        assert_eq!(devices[1].rx_bytes, 9876);
        assert_eq!(devices[1].rx_drop, 10);
        assert_eq!(devices[1].tx_packets, 45);
        assert_eq!(devices[1].tx_drop, 3);
    }

    #[test]
    fn test_parse_net_dev_short_line() {
        assert!(parse_net_dev("eth0: 1 2 3\n").is_err());
    }

    #[test]
    fn test_parse_diskstats() {
        let disks = parse_diskstats(
            "\
   8       0 sda 12345 100 987654 5000 6789 50 456789 3000 0 4000 8000 0 0 0 0
   8       1 sda1 100 0 200
",
        )
        .unwrap();

        assert_eq!(disks.len(), 1);
        let sda = &disks[0];
        assert_eq!(sda.device, "sda");
        assert_eq!(sda.reads, 12345);
        assert_eq!(sda.read_sectors, 987654);
        assert_eq!(sda.write_time_ms, 3000);
        assert_eq!(sda.io_weighted_time_ms, 8000);
    }

    #[test]
    fn test_parse_vmstat() {
        let fields = parse_vmstat("pgpgin 10\npgpgout 20\n\n").unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["pgpgout"], 20);
        assert!(parse_vmstat("pgpgin ten\n").is_err());
    }

    #[test]
    fn test_parse_psi() {
        let stats = parse_psi(
            "\
some avg10=1.50 avg60=1.00 avg300=0.80 total=5000000
full avg10=0.50 avg60=0.30 avg300=0.20 total=1000000
",
        )
        .unwrap();

        let some = stats.some.unwrap();
        assert_eq!(some.avg10, 1.5);
        assert_eq!(some.total, 5_000_000);
        assert_eq!(stats.full.unwrap().total, 1_000_000);
    }

    #[test]
    fn test_parse_psi_cpu_without_full() {
        let stats = parse_psi("some avg10=0.00 avg60=0.00 avg300=0.00 total=42\n").unwrap();
        assert_eq!(stats.some.unwrap().total, 42);
        assert!(stats.full.is_none());
    }

    #[test]
    fn test_parse_psi_malformed() {
        assert!(parse_psi("sometimes avg10=0.00\n").is_err());
        assert!(parse_psi("some avg10\n").is_err());
    }
}
