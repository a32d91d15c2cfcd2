use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use crate::error::{RelayError, Result};

/// Raw RAM counters in bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBytes {
    /// Memory available for new allocations (`MemAvailable` on Linux)
    pub free: u64,
    pub total: u64,
}

pub fn sample_memory() -> Result<MemoryBytes> {
    let refresh = RefreshKind::nothing().with_memory(MemoryRefreshKind::nothing().with_ram());
    let system = System::new_with_specifics(refresh);

    let total = system.total_memory();
    if total == 0 {
        return Err(RelayError::sampling_unavailable(
            "platform reports zero total memory",
        ));
    }

    Ok(MemoryBytes {
        free: system.available_memory().min(total),
        total,
    })
}
