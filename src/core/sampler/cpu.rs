//! CPU utilization sampling.
//!
//! Utilization is a busy/idle delta, so every measurement holds its own
//! `sysinfo::System` across a sampling window and refreshes it at both ends.

use futures_util::future::try_join_all;
use std::future::Future;
use std::time::Duration;
use sysinfo::{CpuRefreshKind, RefreshKind, System, MINIMUM_CPU_UPDATE_INTERVAL};

use super::snapshot::CoreUsage;
use crate::error::{RelayError, Result};

fn cpu_system() -> System {
    System::new_with_specifics(
        RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing().with_cpu_usage()),
    )
}

/// sysinfo needs at least `MINIMUM_CPU_UPDATE_INTERVAL` between refreshes.
pub fn effective_window(window: Duration) -> Duration {
    window.max(MINIMUM_CPU_UPDATE_INTERVAL)
}

fn to_fraction(percent: f32) -> f64 {
    (f64::from(percent) / 100.0).clamp(0.0, 1.0)
}

/// Aggregate CPU utilization over `window`, as a fraction in `[0, 1]`.
pub async fn sample_cpu_usage(window: Duration) -> Result<f64> {
    let mut system = cpu_system();
    if system.cpus().is_empty() {
        return Err(RelayError::sampling_unavailable(
            "platform exposes no CPU counters",
        ));
    }

    tokio::time::sleep(effective_window(window)).await;
    system.refresh_cpu_usage();

    Ok(to_fraction(system.global_cpu_usage()))
}

/// Utilization of one logical CPU over `window`.
async fn sample_core_usage(logical_index: usize, window: Duration) -> Result<CoreUsage> {
    let mut system = cpu_system();

    tokio::time::sleep(effective_window(window)).await;
    system.refresh_cpu_usage();

    let cpu = system.cpus().get(logical_index).ok_or_else(|| {
        RelayError::sampling_unavailable(format!("logical CPU {} disappeared", logical_index))
    })?;

    Ok(CoreUsage {
        logical_index,
        usage: to_fraction(cpu.cpu_usage()),
    })
}

/// Indices treated as physical cores: every even position of the logical list.
///
/// Assumes 2-way SMT where siblings are listed adjacently. Hosts without
/// hyperthreading, or with another threads-per-core ratio, get a wrong selection.
pub fn select_physical_cores(logical_count: usize) -> Vec<usize> {
    (0..logical_count).step_by(2).collect()
}

/// Per-physical-core utilization, in selection order.
///
/// All measurements run concurrently with overlapping windows; the call
/// returns once every one has finished, or fails as soon as any one fails.
pub async fn sample_per_physical_core_usage(window: Duration) -> Result<Vec<CoreUsage>> {
    let logical_count = cpu_system().cpus().len();
    if logical_count == 0 {
        return Err(RelayError::sampling_unavailable(
            "platform reports an empty CPU list",
        ));
    }

    let selected = select_physical_cores(logical_count);
    log::debug!(
        "Sampling {} of {} logical CPUs as physical cores",
        selected.len(),
        logical_count
    );

    measure_cores(selected, window, sample_core_usage).await
}

/// Start one `measure` per selected core at once and wait for all of them.
async fn measure_cores<F, Fut>(
    selected: Vec<usize>,
    window: Duration,
    measure: F,
) -> Result<Vec<CoreUsage>>
where
    F: Fn(usize, Duration) -> Fut,
    Fut: Future<Output = Result<CoreUsage>>,
{
    try_join_all(selected.into_iter().map(|index| measure(index, window))).await
}

/// Model name of the first logical processor.
pub fn sample_cpu_model() -> Result<String> {
    let system = System::new_with_specifics(
        RefreshKind::nothing().with_cpu(CpuRefreshKind::everything()),
    );

    system
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .ok_or_else(|| RelayError::sampling_unavailable("platform reports an empty CPU list"))
}
