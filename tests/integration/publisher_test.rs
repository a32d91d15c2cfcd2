use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use super::common::fixed_snapshot;

use sysrelay::chat::{ChannelHandle, ChatClient};
use sysrelay::core::{CycleOutcome, MetricSnapshot, Publisher, Report, SnapshotSource};
use sysrelay::{RelayError, Result};

#[derive(Clone, Default)]
struct FakeChat {
    missing_channel: bool,
    reject_sends: bool,
    lookups: Arc<Mutex<usize>>,
    sent: Arc<Mutex<Vec<(ChannelHandle, Report)>>>,
}

impl ChatClient for FakeChat {
    async fn resolve_channel(&self, channel_id: &str) -> Result<ChannelHandle> {
        *self.lookups.lock().unwrap() += 1;
        if self.missing_channel {
            return Err(RelayError::channel_not_found(channel_id));
        }
        Ok(ChannelHandle {
            id: channel_id.to_string(),
            name: Some("status".to_string()),
        })
    }

    async fn send(&self, channel: &ChannelHandle, report: &Report) -> Result<()> {
        if self.reject_sends {
            return Err(RelayError::send_failed("503 Service Unavailable"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel.clone(), report.clone()));
        Ok(())
    }
}

/// Records when it was asked for a snapshot; fails on the listed calls (0-based).
#[derive(Clone, Default)]
struct ScriptedSampler {
    failing_calls: HashSet<usize>,
    calls: Arc<Mutex<Vec<Instant>>>,
}

impl ScriptedSampler {
    fn failing_on(calls: &[usize]) -> Self {
        Self {
            failing_calls: calls.iter().copied().collect(),
            ..Default::default()
        }
    }
}

impl SnapshotSource for ScriptedSampler {
    async fn snapshot(&self) -> Result<MetricSnapshot> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Instant::now());
            calls.len() - 1
        };

        if self.failing_calls.contains(&call) {
            return Err(RelayError::disk_query_failed("probe exited with 1"));
        }
        Ok(fixed_snapshot())
    }
}

#[tokio::test(start_paused = true)]
async fn test_fires_immediately_then_every_interval() {
    let chat = FakeChat::default();
    let sampler = ScriptedSampler::failing_on(&[1]);
    let calls = sampler.calls.clone();
    let sent = chat.sent.clone();

    let publisher = Publisher::new(chat, sampler, "123", Duration::from_secs(60));
    let start = Instant::now();
    let handle = tokio::spawn(async move { publisher.run().await });

    tokio::time::sleep(Duration::from_secs(150)).await;
    handle.abort();

    let offsets: Vec<u64> = calls
        .lock()
        .unwrap()
        .iter()
        .map(|at| at.duration_since(start).as_secs())
        .collect();

    // The failed second cycle does not disturb the schedule
    assert_eq!(offsets, vec![0, 60, 120]);
    assert_eq!(sent.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_successful_cycle_sends_formatted_report() {
    let chat = FakeChat::default();
    let sent = chat.sent.clone();
    let publisher = Publisher::new(
        chat,
        ScriptedSampler::default(),
        "987",
        Duration::from_secs(60),
    );

    assert_eq!(publisher.run_cycle(1).await, CycleOutcome::Sent);

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (channel, report) = &sent[0];
    assert_eq!(channel.id, "987");
    assert_eq!(report.field("💻 CPU Usage").unwrap().value, "45.67%");
    assert_eq!(
        report.field("🧠 Memory Usage").unwrap().value,
        "3.10 GB / 16.00 GB"
    );
}

#[tokio::test]
async fn test_failed_sampling_sends_nothing() {
    let chat = FakeChat::default();
    let sent = chat.sent.clone();
    let publisher = Publisher::new(
        chat,
        ScriptedSampler::failing_on(&[0]),
        "1",
        Duration::from_secs(60),
    );

    assert!(matches!(
        publisher.publish_once().await,
        Err(RelayError::DiskQueryFailed(_))
    ));
    assert!(sent.lock().unwrap().is_empty());

    // Next cycle is unaffected
    assert_eq!(publisher.run_cycle(2).await, CycleOutcome::Sent);
    assert_eq!(sent.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_channel_skips_sampling() {
    let chat = FakeChat {
        missing_channel: true,
        ..Default::default()
    };
    let sampler = ScriptedSampler::default();
    let calls = sampler.calls.clone();
    let publisher = Publisher::new(chat, sampler, "404", Duration::from_secs(60));

    assert!(matches!(
        publisher.publish_once().await,
        Err(RelayError::ChannelNotFound(_))
    ));
    assert_eq!(publisher.run_cycle(2).await, CycleOutcome::Aborted);
    assert!(calls.lock().unwrap().is_empty());
    assert_eq!(*publisher.client().lookups.lock().unwrap(), 2);
}

#[tokio::test]
async fn test_send_failure_is_contained() {
    let chat = FakeChat {
        reject_sends: true,
        ..Default::default()
    };
    let publisher = Publisher::new(
        chat,
        ScriptedSampler::default(),
        "1",
        Duration::from_secs(60),
    );

    assert!(matches!(
        publisher.publish_once().await,
        Err(RelayError::SendFailed(_))
    ));
    assert_eq!(publisher.run_cycle(2).await, CycleOutcome::Aborted);
    assert_eq!(publisher.run_cycle(3).await, CycleOutcome::Aborted);
    assert_eq!(publisher.sampler().calls.lock().unwrap().len(), 3);
}
