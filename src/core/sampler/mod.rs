//! Host metric sampling.
//!
//! Every cycle builds one [`MetricSnapshot`] from fresh OS reads. A failing
//! read aborts the whole snapshot; there is no partial result.

pub mod cpu;
pub mod disk;
pub mod host;
pub mod memory;
mod snapshot;

pub use disk::{parse_space_report, DiskProbe};
pub use snapshot::{
    bytes_to_gb, round2, CoreUsage, DiskBytes, DiskUsage, MetricSnapshot, Uptime, BYTES_PER_GB,
};

use std::future::Future;
use std::time::Duration;

use crate::core::config::Config;
use crate::error::Result;

/// Anything able to produce a snapshot for the publisher.
pub trait SnapshotSource: Send + Sync {
    fn snapshot(&self) -> impl Future<Output = Result<MetricSnapshot>> + Send;
}

#[derive(Debug, Clone)]
pub struct SamplerConfig {
    pub cpu_window: Duration,
    pub disk: DiskProbe,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            cpu_window: Duration::from_secs(1),
            disk: DiskProbe::default(),
        }
    }
}

impl SamplerConfig {
    pub fn from_config(config: &Config) -> Self {
        let disk = match &config.disk_command {
            Some(argv) => DiskProbe::Command { argv: argv.clone() },
            None => DiskProbe::Native {
                volume: config.volume.clone().unwrap_or_else(disk::system_volume),
            },
        };

        Self {
            cpu_window: config.cpu_window(),
            disk,
        }
    }
}

/// Reads the OS counters that make up a [`MetricSnapshot`].
pub struct MetricSampler {
    config: SamplerConfig,
}

impl MetricSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub async fn sample(&self) -> Result<MetricSnapshot> {
        // The CPU windows and the disk probe are independent and overlap
        let (cpu_usage, per_core, disk_bytes) = tokio::try_join!(
            cpu::sample_cpu_usage(self.config.cpu_window),
            cpu::sample_per_physical_core_usage(self.config.cpu_window),
            disk::sample_disk_usage(&self.config.disk),
        )?;

        let memory = memory::sample_memory()?;
        let cpu_model = cpu::sample_cpu_model()?;
        let os = host::sample_os_identity();

        Ok(MetricSnapshot {
            cpu_usage,
            total_memory_gb: bytes_to_gb(memory.total),
            free_memory_gb: bytes_to_gb(memory.free),
            disk: DiskUsage::from_bytes(disk_bytes),
            uptime_secs: host::sample_uptime(),
            os_type: os.os_type,
            os_release: os.release,
            os_arch: os.arch,
            cpu_model,
            per_core,
            captured_at: chrono::Local::now(),
        })
    }
}

impl SnapshotSource for MetricSampler {
    fn snapshot(&self) -> impl Future<Output = Result<MetricSnapshot>> + Send {
        self.sample()
    }
}
