//! Recurring sample-and-publish loop.
//!
//! Cycles are serialized: the next tick is awaited only after the current
//! cycle finished, and ticks missed meanwhile are skipped so firings stay on
//! the `interval` grid. Every failure is local to its cycle.

use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::chat::ChatClient;
use crate::core::report::Report;
use crate::core::sampler::SnapshotSource;
use crate::error::{RelayError, Result};

/// Result of one cycle, as seen by the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Sent,
    Aborted,
}

pub struct Publisher<C, S> {
    client: C,
    sampler: S,
    channel_id: String,
    interval: Duration,
}

impl<C: ChatClient, S: SnapshotSource> Publisher<C, S> {
    pub fn new(client: C, sampler: S, channel_id: impl Into<String>, interval: Duration) -> Self {
        Self {
            client,
            sampler,
            channel_id: channel_id.into(),
            interval,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// Publish now, then every `interval`, for as long as the future is polled.
    pub async fn run(&self) {
        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut cycle: u64 = 0;
        loop {
            ticker.tick().await;
            cycle += 1;
            self.run_cycle(cycle).await;
        }
    }

    /// One cycle with every error logged and swallowed.
    pub async fn run_cycle(&self, cycle: u64) -> CycleOutcome {
        match self.publish_once().await {
            Ok(()) => {
                log::info!("System information sent successfully.");
                CycleOutcome::Sent
            }
            Err(e) => {
                log_cycle_error(cycle, &e);
                CycleOutcome::Aborted
            }
        }
    }

    /// Resolve the channel, sample, format and send. Any failure ends the
    /// cycle before anything is sent.
    pub async fn publish_once(&self) -> Result<()> {
        let channel = self.client.resolve_channel(&self.channel_id).await?;
        let snapshot = self.sampler.snapshot().await?;
        let report = Report::from_snapshot(&snapshot);

        self.client.send(&channel, &report).await
    }
}

fn log_cycle_error(cycle: u64, error: &RelayError) {
    match error {
        RelayError::ChannelNotFound(_) => {
            log::error!("Cycle {}: {}", cycle, error);
        }
        RelayError::SamplingUnavailable(_) | RelayError::DiskQueryFailed(_) => {
            log::error!("Cycle {}: sampling aborted, no report sent: {}", cycle, error);
        }
        RelayError::SendFailed(_) => {
            log::error!("Cycle {}: failed to send system information: {}", cycle, error);
        }
        _ => {
            log::error!("Cycle {}: aborted: {}", cycle, error);
        }
    }
}
