//! Host telemetry for the system performance panel.
//!
//! Reads straight from the Linux procfs/statvfs surfaces. On other
//! platforms, or when any read fails, `sample` returns `None` and the panel
//! shows an unavailable notice instead of bars.

/// One telemetry snapshot. CPU/memory/disk are percentages in [0,100];
/// network is cumulative traffic in MB since boot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemStats {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
    pub network_mb: f64,
}

/// Stateful sampler; CPU load needs a delta between consecutive reads.
#[derive(Debug, Default)]
pub struct SystemMonitor {
    #[cfg(target_os = "linux")]
    prev_cpu: Option<(u64, u64)>,
}

impl SystemMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of logical CPUs, for the panel header.
    pub fn cpu_count(&self) -> usize {
        num_cpus::get()
    }

    #[cfg(target_os = "linux")]
    pub fn sample(&mut self) -> Option<SystemStats> {
        let (busy, total) = read_cpu_times()?;
        let cpu_percent = match self.prev_cpu.replace((busy, total)) {
            Some((prev_busy, prev_total)) if total > prev_total => {
                100.0 * (busy - prev_busy) as f64 / (total - prev_total) as f64
            }
            _ => 0.0,
        };

        Some(SystemStats {
            cpu_percent: cpu_percent.clamp(0.0, 100.0),
            memory_percent: read_memory_percent()?,
            disk_percent: read_disk_percent()?,
            network_mb: read_network_mb()?,
        })
    }

    #[cfg(not(target_os = "linux"))]
    pub fn sample(&mut self) -> Option<SystemStats> {
        None
    }
}

#[cfg(target_os = "linux")]
fn read_cpu_times() -> Option<(u64, u64)> {
    let stat = std::fs::read_to_string("/proc/stat").ok()?;
    let line = stat.lines().next()?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .filter_map(|f| f.parse().ok())
        .collect();
    if fields.len() < 4 {
        return None;
    }
    let idle = fields[3] + fields.get(4).copied().unwrap_or(0);
    let total: u64 = fields.iter().sum();
    Some((total - idle, total))
}

#[cfg(target_os = "linux")]
fn read_memory_percent() -> Option<f64> {
    parse_meminfo(&std::fs::read_to_string("/proc/meminfo").ok()?)
}

/// Lines that do not carry a key and a value are skipped, not fatal; only a
/// missing MemTotal/MemAvailable pair fails the sample.
#[cfg(target_os = "linux")]
fn parse_meminfo(meminfo: &str) -> Option<f64> {
    let mut total = None;
    let mut available = None;
    for line in meminfo.lines() {
        let mut parts = line.split_whitespace();
        let (Some(key), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        match key {
            "MemTotal:" => total = value.parse::<f64>().ok(),
            "MemAvailable:" => available = value.parse::<f64>().ok(),
            _ => {}
        }
        if total.is_some() && available.is_some() {
            break;
        }
    }
    let total = total?;
    let available = available?;
    if total <= 0.0 {
        return None;
    }
    Some((100.0 * (total - available) / total).clamp(0.0, 100.0))
}

#[cfg(target_os = "linux")]
fn read_disk_percent() -> Option<f64> {
    let path = std::ffi::CString::new("/").ok()?;
    let mut stats: libc::statvfs = unsafe { std::mem::zeroed() };
    let rc = unsafe { libc::statvfs(path.as_ptr(), &mut stats) };
    if rc != 0 || stats.f_blocks == 0 {
        return None;
    }
    let used = stats.f_blocks.saturating_sub(stats.f_bfree) as f64;
    Some((100.0 * used / stats.f_blocks as f64).clamp(0.0, 100.0))
}

#[cfg(target_os = "linux")]
fn read_network_mb() -> Option<f64> {
    let dev = std::fs::read_to_string("/proc/net/dev").ok()?;
    let mut bytes = 0u64;
    for line in dev.lines().skip(2) {
        let Some((_, rest)) = line.split_once(':') else {
            continue;
        };
        let fields: Vec<&str> = rest.split_whitespace().collect();
        // Field 0 is rx bytes, field 8 is tx bytes.
        let rx: u64 = fields.first().and_then(|f| f.parse().ok()).unwrap_or(0);
        let tx: u64 = fields.get(8).and_then(|f| f.parse().ok()).unwrap_or(0);
        bytes = bytes.saturating_add(rx).saturating_add(tx);
    }
    Some(bytes as f64 / (1024.0 * 1024.0))
}
