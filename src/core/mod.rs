// Core business logic module

pub mod config;
pub mod publisher;
pub mod report;
pub mod sampler;

// Re-export commonly used items
pub use config::Config;
pub use publisher::{CycleOutcome, Publisher};
pub use report::{Report, ReportField};
pub use sampler::{MetricSampler, MetricSnapshot, SamplerConfig, SnapshotSource};
