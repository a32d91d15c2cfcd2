use chrono::{DateTime, Local};
use serde::Serialize;

pub const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn bytes_to_gb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GB
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Raw free/total byte counts of a volume
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskBytes {
    pub free: u64,
    pub total: u64,
}

impl DiskBytes {
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiskUsage {
    pub used_gb: f64,
    pub total_gb: f64,
    /// `used / total * 100`, already rounded to two decimals
    pub percent: f64,
}

impl DiskUsage {
    pub fn from_bytes(bytes: DiskBytes) -> Self {
        let used = bytes.used();
        let percent = if bytes.total > 0 {
            round2(used as f64 / bytes.total as f64 * 100.0)
        } else {
            0.0
        };

        Self {
            used_gb: bytes_to_gb(used),
            total_gb: bytes_to_gb(bytes.total),
            percent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Uptime {
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Uptime {
    pub fn from_secs(total: u64) -> Self {
        Self {
            hours: total / 3600,
            minutes: (total % 3600) / 60,
            seconds: total % 60,
        }
    }
}

/// Utilization of one selected core.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoreUsage {
    /// Position in the logical CPU list reported by the OS
    pub logical_index: usize,
    /// Fraction in `[0, 1]`
    pub usage: f64,
}

/// One cycle's worth of host metrics. Built fresh each cycle, never shared.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSnapshot {
    /// Aggregate utilization as a fraction in `[0, 1]`
    pub cpu_usage: f64,
    pub total_memory_gb: f64,
    pub free_memory_gb: f64,
    pub disk: DiskUsage,
    pub uptime_secs: u64,
    pub os_type: String,
    pub os_release: String,
    pub os_arch: String,
    pub cpu_model: String,
    /// One entry per selected core, in selection order
    pub per_core: Vec<CoreUsage>,
    pub captured_at: DateTime<Local>,
}

impl MetricSnapshot {
    pub fn cpu_usage_percent(&self) -> f64 {
        self.cpu_usage * 100.0
    }

    pub fn used_memory_gb(&self) -> f64 {
        self.total_memory_gb - self.free_memory_gb
    }

    pub fn uptime(&self) -> Uptime {
        Uptime::from_secs(self.uptime_secs)
    }
}
