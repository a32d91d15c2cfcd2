//! Display-ready report built from a [`MetricSnapshot`].
//!
//! The layout (titles, units, decimals) is consumed by people reading the
//! channel and by anything scraping it, so the formats here are fixed.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::core::sampler::{CoreUsage, DiskUsage, MetricSnapshot, Uptime};

pub const REPORT_TITLE: &str = "System Information 🖥️";
pub const REPORT_COLOR: u32 = 0x1E90FF;

/// Longest field value accepted by the chat platform
pub const MAX_FIELD_VALUE_CHARS: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl ReportField {
    fn new(name: &str, value: String, inline: bool) -> Self {
        Self {
            name: name.to_string(),
            value: truncate_value(value),
            inline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub title: String,
    pub color: u32,
    pub fields: Vec<ReportField>,
    pub footer: String,
}

impl Report {
    pub fn from_snapshot(snapshot: &MetricSnapshot) -> Self {
        let fields = vec![
            ReportField::new("💻 CPU Usage", format_percent(snapshot.cpu_usage), true),
            ReportField::new(
                "🧠 Memory Usage",
                format_gb_pair(snapshot.used_memory_gb(), snapshot.total_memory_gb),
                true,
            ),
            ReportField::new("💾 Disk Usage", format_disk(&snapshot.disk), true),
            ReportField::new("⏱️ Uptime", format_uptime(snapshot.uptime()), true),
            ReportField::new(
                "🖥️ OS",
                format_os(&snapshot.os_type, &snapshot.os_release, &snapshot.os_arch),
                true,
            ),
            ReportField::new("🧑‍💻 CPU Model", snapshot.cpu_model.clone(), true),
            ReportField::new("🧑‍💻 CPU Cores Usage", format_cores(&snapshot.per_core), false),
        ];

        Self {
            title: REPORT_TITLE.to_string(),
            color: REPORT_COLOR,
            fields,
            footer: format!("Last updated: {}", format_timestamp(&snapshot.captured_at)),
        }
    }

    pub fn field(&self, name: &str) -> Option<&ReportField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// `0.4567` -> `"45.67%"`
pub fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// `"{used} GB / {total} GB"`
pub fn format_gb_pair(used_gb: f64, total_gb: f64) -> String {
    format!("{:.2} GB / {:.2} GB", used_gb, total_gb)
}

pub fn format_disk(disk: &DiskUsage) -> String {
    format!(
        "{} ({:.2}%)",
        format_gb_pair(disk.used_gb, disk.total_gb),
        disk.percent
    )
}

pub fn format_uptime(uptime: Uptime) -> String {
    format!("{}h {}m {}s", uptime.hours, uptime.minutes, uptime.seconds)
}

pub fn format_os(os_type: &str, release: &str, arch: &str) -> String {
    format!("{} {} {}", os_type, release, arch)
}

/// One `Core {n}: {pct}%` line per core, 1-based in selection order.
pub fn format_cores(cores: &[CoreUsage]) -> String {
    cores
        .iter()
        .enumerate()
        .map(|(position, core)| format!("Core {}: {}", position + 1, format_percent(core.usage)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// en-US style local date-time, e.g. `10/16/2026, 3:04:05 PM`
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

fn truncate_value(value: String) -> String {
    if value.chars().count() <= MAX_FIELD_VALUE_CHARS {
        return value;
    }

    let mut truncated: String = value.chars().take(MAX_FIELD_VALUE_CHARS - 1).collect();
    truncated.push('…');
    truncated
}
