use super::common::fixed_snapshot;

use sysrelay::core::report::{Report, REPORT_COLOR, REPORT_TITLE};
use sysrelay::core::sampler::cpu::select_physical_cores;
use sysrelay::core::sampler::CoreUsage;

fn value<'a>(report: &'a Report, name: &str) -> &'a str {
    &report.field(name).unwrap().value
}

#[test]
fn test_report_layout() {
    let report = Report::from_snapshot(&fixed_snapshot());

    assert_eq!(report.title, REPORT_TITLE);
    assert_eq!(report.color, REPORT_COLOR);
    assert_eq!(value(&report, "💻 CPU Usage"), "45.67%");
    assert_eq!(value(&report, "🧠 Memory Usage"), "3.10 GB / 16.00 GB");
    assert_eq!(value(&report, "💾 Disk Usage"), "0.90 GB / 1.00 GB (90.23%)");
    assert_eq!(value(&report, "⏱️ Uptime"), "26h 3m 4s");
    assert_eq!(value(&report, "🖥️ OS"), "Linux 6.8.0-45-generic x86_64");
    assert_eq!(
        value(&report, "🧑‍💻 CPU Model"),
        "AMD Ryzen 7 5800X 8-Core Processor"
    );
    assert_eq!(
        value(&report, "🧑‍💻 CPU Cores Usage"),
        "Core 1: 10.00%\nCore 2: 25.50%"
    );
    assert_eq!(report.footer, "Last updated: 10/16/2026, 9:05:07 AM");
}

#[test]
fn test_only_cores_field_is_block() {
    let report = Report::from_snapshot(&fixed_snapshot());

    let block: Vec<&str> = report
        .fields
        .iter()
        .filter(|f| !f.inline)
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(block, vec!["🧑‍💻 CPU Cores Usage"]);
    assert_eq!(report.fields.len(), 7);
}

#[test]
fn test_eight_logical_cpus_report_four_cores() {
    let mut snapshot = fixed_snapshot();
    snapshot.per_core = select_physical_cores(8)
        .into_iter()
        .map(|logical_index| CoreUsage {
            logical_index,
            usage: 0.5,
        })
        .collect();

    let report = Report::from_snapshot(&snapshot);
    let lines: Vec<&str> = value(&report, "🧑‍💻 CPU Cores Usage").lines().collect();

    assert_eq!(
        lines,
        vec![
            "Core 1: 50.00%",
            "Core 2: 50.00%",
            "Core 3: 50.00%",
            "Core 4: 50.00%"
        ]
    );
}
