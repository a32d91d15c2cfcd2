//! Outbound messaging.
//!
//! The publisher only sees [`ChatClient`]; the Discord implementation lives in
//! [`discord`] and tests substitute their own.

pub mod discord;

use std::future::Future;

use crate::core::report::Report;
use crate::error::Result;

/// A resolved destination that reports can be sent to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHandle {
    pub id: String,
    pub name: Option<String>,
}

pub trait ChatClient: Send + Sync {
    /// Look a channel up by id. Fails with `ChannelNotFound` when it cannot be resolved.
    fn resolve_channel(&self, channel_id: &str)
        -> impl Future<Output = Result<ChannelHandle>> + Send;

    /// Deliver one report. Fails with `SendFailed` when delivery is rejected or times out.
    fn send(&self, channel: &ChannelHandle, report: &Report)
        -> impl Future<Output = Result<()>> + Send;
}
