pub mod alertmanager;
pub mod config;
pub mod format;
pub mod metrics;
pub mod notifier;
pub mod sinks;

use thiserror::Error;

pub use alertmanager::{fetch_alerts, Alert, AlertListResponse, AlertStatus, AlertmanagerClient};
pub use format::{escape, format_alert, AlertFormatter, CompactHumanizer, Humanize, WordHumanizer};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Sink error: {0}")]
    Sink(String),
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
