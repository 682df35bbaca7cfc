//! Pre-built mock filesystem scenarios for testing.

use super::filesystem::MockFs;

impl MockFs {
    /// A typical four-CPU host with every file the default collectors read.
    pub fn typical_system() -> Self {
        let mut fs = Self::bare_system();

        fs.add_file(
            "/proc/pressure/cpu",
            "some avg10=0.50 avg60=0.30 avg300=0.20 total=1234567\n",
        );
        fs.add_file(
            "/proc/pressure/memory",
            "\
some avg10=0.10 avg60=0.08 avg300=0.05 total=500000
full avg10=0.02 avg60=0.01 avg300=0.01 total=100000
",
        );
        fs.add_file(
            "/proc/pressure/io",
            "\
some avg10=1.50 avg60=1.00 avg300=0.80 total=5000000
full avg10=0.50 avg60=0.30 avg300=0.20 total=1000000
",
        );

        fs
    }

    /// A host running a kernel without pressure stall information.
    pub fn bare_system() -> Self {
        let mut fs = Self::new();

        fs.add_file("/proc/loadavg", "0.15 0.10 0.05 1/150 1234\n");
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
Active:          4096000 kB
Inactive:        2048000 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
Dirty:              1024 kB
Writeback:             0 kB
AnonPages:       3000000 kB
Mapped:           400000 kB
Shmem:             65536 kB
Slab:             512000 kB
SReclaimable:     256000 kB
SUnreclaim:       256000 kB
HugePages_Total:       0
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
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );
        fs.add_file(
            "/proc/diskstats",
            "\
   8       0 sda 12345 100 987654 5000 6789 50 456789 3000 0 4000 8000 0 0 0 0
   8       1 sda1 10000 80 800000 4000 5000 40 400000 2500 0 3500 6500 0 0 0 0
   7       0 loop0 40 0 800 4 0 0 0 0 0 8 4 0 0 0 0
 259       0 nvme0n1 50000 200 2000000 10000 30000 150 1500000 8000 5 15000 18000 0 0 0 0
",
        );
        fs.add_file(
            "/proc/net/dev",
            "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 12345678     9876    0    0    0     0          0         0 12345678     9876    0    0    0     0       0          0
  eth0: 987654321   654321    5   10    0     0          0       100 123456789   456789    2    5    0     0       0          0
",
        );
        fs.add_file(
            "/proc/vmstat",
            "\
nr_free_pages 2048000
pgpgin 123456
pgpgout 654321
pswpin 100
pswpout 200
pgfault 999999
pgmajfault 1234
pgsteal_kswapd 5000
oom_kill 0
",
        );

        fs
    }
}
