use async_trait::async_trait;
use std::io::Write;

use super::{Notification, OutputFormat, Sink};
use crate::{Error, Result};

#[derive(Debug)]
pub struct StdoutSink {
    name: String,
    format: OutputFormat,
    pretty: bool, // For JSON output
}

impl StdoutSink {
    pub fn new(name_override: Option<String>, format: OutputFormat, pretty: bool) -> Self {
        let name = name_override.unwrap_or_else(|| "stdout".to_string());
        Self { name, format, pretty }
    }

    pub fn render(&self, notification: &Notification) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(notification.message.clone()),
            OutputFormat::Json if self.pretty => {
                let mut json = serde_json::to_string_pretty(notification)
                    .map_err(|e| Error::Sink(format!("Failed to serialize notification: {}", e)))?;
                json.push('\n');
                Ok(json)
            }
            OutputFormat::Json => {
                let mut json = serde_json::to_string(notification)
                    .map_err(|e| Error::Sink(format!("Failed to serialize notification: {}", e)))?;
                json.push('\n');
                Ok(json)
            }
        }
    }

    /// Render `notification` into `writer` and flush it.
    pub fn write_to<W: Write>(&self, writer: &mut W, notification: &Notification) -> Result<()> {
        let output = self.render(notification)?;
        writer
            .write_all(output.as_bytes())
            .and_then(|_| writer.flush())
            .map_err(|e| Error::Sink(format!("Failed to write notification: {}", e)))
    }
}

#[async_trait]
impl Sink for StdoutSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        self.write_to(&mut std::io::stdout().lock(), notification)
    }
}
