pub mod stdout;

pub use stdout::StdoutSink;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::alertmanager::AlertStatus;
use crate::{Error, Result};

/// A rendered alert ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub alertname: String,
    pub status: AlertStatus,
    pub message: String,
}

/// Delivery channel for notifications.
#[async_trait]
pub trait Sink: Send + Sync {
    fn name(&self) -> &str;
    async fn send(&self, notification: &Notification) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The rendered message only
    #[default]
    Text,
    /// One JSON object per notification
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(Error::Config(format!(
                "Invalid output format: {}. Must be 'text' or 'json'",
                other
            ))),
        }
    }
}
