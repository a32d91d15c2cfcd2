//! Disk space of the reported volume.
//!
//! The native probe asks the OS through `sysinfo::Disks`. The command probe
//! runs an external utility whose output is a header line followed by a row
//! starting with `<free bytes> <total bytes>`, e.g.
//! `wmic logicaldisk where "DeviceID='C:'" get FreeSpace,Size`.

use std::path::{Path, PathBuf};
use sysinfo::Disks;
use tokio::process::Command;

use super::snapshot::DiskBytes;
use crate::error::{RelayError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiskProbe {
    Native { volume: PathBuf },
    Command { argv: Vec<String> },
}

impl Default for DiskProbe {
    fn default() -> Self {
        DiskProbe::Native {
            volume: system_volume(),
        }
    }
}

/// Root of the volume the OS runs from
pub fn system_volume() -> PathBuf {
    #[cfg(windows)]
    {
        let drive = std::env::var("SystemDrive").unwrap_or_else(|_| "C:".to_string());
        PathBuf::from(format!("{}\\", drive))
    }

    #[cfg(not(windows))]
    {
        PathBuf::from("/")
    }
}

pub async fn sample_disk_usage(probe: &DiskProbe) -> Result<DiskBytes> {
    let bytes = match probe {
        DiskProbe::Native { volume } => query_native(volume)?,
        DiskProbe::Command { argv } => query_command(argv).await?,
    };

    check_bytes(bytes)
}

fn check_bytes(bytes: DiskBytes) -> Result<DiskBytes> {
    if bytes.total == 0 {
        return Err(RelayError::disk_query_failed("volume reports zero total size"));
    }
    if bytes.free > bytes.total {
        return Err(RelayError::disk_query_failed(format!(
            "free space {} exceeds total size {}",
            bytes.free, bytes.total
        )));
    }
    Ok(bytes)
}

fn query_native(volume: &Path) -> Result<DiskBytes> {
    let disks = Disks::new_with_refreshed_list();
    let mounts: Vec<&Path> = disks.iter().map(|disk| disk.mount_point()).collect();

    let index = best_mount(volume, &mounts).ok_or_else(|| {
        RelayError::disk_query_failed(format!("no mounted disk contains {:?}", volume))
    })?;

    let disk = &disks.list()[index];
    log::debug!(
        "Volume {:?} resolved to disk {:?} mounted at {:?}",
        volume,
        disk.name(),
        disk.mount_point()
    );

    Ok(DiskBytes {
        free: disk.available_space(),
        total: disk.total_space(),
    })
}

/// Index of the mount point that is the longest prefix of `volume`.
pub fn best_mount(volume: &Path, mounts: &[&Path]) -> Option<usize> {
    mounts
        .iter()
        .enumerate()
        .filter(|(_, mount)| volume.starts_with(mount))
        .max_by_key(|(_, mount)| mount.components().count())
        .map(|(index, _)| index)
}

async fn query_command(argv: &[String]) -> Result<DiskBytes> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| RelayError::disk_query_failed("empty disk probe command"))?;

    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| RelayError::disk_query_failed(format!("failed to run `{}`: {}", program, e)))?;

    if !output.status.success() {
        return Err(RelayError::disk_query_failed(format!(
            "`{}` exited with {}: {}",
            program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return Err(RelayError::disk_query_failed(format!(
            "`{}` wrote to stderr: {}",
            program,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if stdout.trim().is_empty() {
        return Err(RelayError::disk_query_failed(format!(
            "`{}` produced no output",
            program
        )));
    }

    parse_space_report(&stdout)
}

/// Parse a header line followed by a data row of `free total`.
pub fn parse_space_report(output: &str) -> Result<DiskBytes> {
    let row = output
        .lines()
        .skip(1)
        .map(str::trim)
        .find(|line| !line.is_empty())
        .ok_or_else(|| RelayError::disk_query_failed("no data row after the header"))?;

    let mut tokens = row.split_whitespace();
    let free = parse_bytes(tokens.next(), "free space", row)?;
    let total = parse_bytes(tokens.next(), "total size", row)?;

    check_bytes(DiskBytes { free, total })
}

fn parse_bytes(token: Option<&str>, what: &str, row: &str) -> Result<u64> {
    let token = token.ok_or_else(|| {
        RelayError::disk_query_failed(format!("missing {} in row {:?}", what, row))
    })?;

    token.parse::<u64>().map_err(|_| {
        RelayError::disk_query_failed(format!("invalid {} {:?} in row {:?}", what, token, row))
    })
}
