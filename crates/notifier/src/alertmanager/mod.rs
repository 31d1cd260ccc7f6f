mod client;
mod models;
mod transport;

pub use client::{decode_alerts, fetch_alerts, AlertmanagerClient, ALERTS_PATH};
pub use models::{Alert, AlertListResponse, AlertStatus, ALERTNAME_LABEL, SUMMARY_ANNOTATION};
pub use transport::{RetryPolicy, RetryingTransport, Transport};

#[cfg(test)]
pub use transport::MockTransport;
