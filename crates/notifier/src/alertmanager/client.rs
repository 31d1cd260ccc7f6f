use std::sync::Arc;
use tracing::{debug, info};

use super::models::{Alert, AlertListResponse};
use super::transport::Transport;
use crate::{metrics, Result};

pub const ALERTS_PATH: &str = "/api/v1/alerts";

/// Fetch the current alerts from the Alertmanager at `base_url`.
///
/// Returns every alert in the response or an error, never a partial list.
pub async fn fetch_alerts<T>(transport: &T, base_url: &str) -> Result<Vec<Alert>>
where
    T: Transport + ?Sized,
{
    let url = alerts_url(base_url);
    debug!(%url, "fetching alerts");
    metrics::FETCHES_TOTAL.inc();

    let result = match transport.get(&url).await {
        Ok(body) => decode_alerts(&body),
        Err(e) => Err(e),
    };

    match result {
        Ok(alerts) => {
            info!(%url, count = alerts.len(), "fetched alerts");
            Ok(alerts)
        }
        Err(e) => {
            metrics::FETCH_FAILURES_TOTAL.inc();
            Err(e)
        }
    }
}

pub fn decode_alerts(body: &[u8]) -> Result<Vec<Alert>> {
    let response: AlertListResponse = serde_json::from_slice(body)?;
    Ok(response.alerts)
}

fn alerts_url(base_url: &str) -> String {
    format!("{}{}", base_url.strip_suffix('/').unwrap_or(base_url), ALERTS_PATH)
}

/// An Alertmanager endpoint paired with the transport used to reach it.
#[derive(Clone)]
pub struct AlertmanagerClient {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl AlertmanagerClient {
    pub fn new(base_url: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: base_url.into(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn list_alerts(&self) -> Result<Vec<Alert>> {
        fetch_alerts(self.transport.as_ref(), &self.base_url).await
    }
}
