//! Fetch, render and deliver alerts.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::alertmanager::{AlertStatus, AlertmanagerClient};
use crate::format::AlertFormatter;
use crate::metrics;
use crate::sinks::{Notification, Sink};
use crate::Result;

/// Which alerts a cycle delivers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Firing,
    Resolved,
}

impl StatusFilter {
    pub fn matches(&self, status: AlertStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Firing => status == AlertStatus::Firing,
            StatusFilter::Resolved => status == AlertStatus::Resolved,
        }
    }
}

/// Outcome of a single cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub sent: usize,
    pub failed: usize,
}

pub struct Notifier {
    client: AlertmanagerClient,
    formatter: AlertFormatter,
    sink: Arc<dyn Sink>,
    filter: StatusFilter,
}

impl Notifier {
    pub fn new(client: AlertmanagerClient, formatter: AlertFormatter, sink: Arc<dyn Sink>) -> Self {
        Self {
            client,
            formatter,
            sink,
            filter: StatusFilter::All,
        }
    }

    pub fn with_filter(mut self, filter: StatusFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Fetch once and deliver every matching alert.
    ///
    /// A fetch error fails the cycle. A failed delivery is logged and counted
    /// but does not stop the remaining alerts.
    pub async fn run_once(&self) -> Result<CycleReport> {
        let alerts = self.client.list_alerts().await?;
        let now = Utc::now();
        let mut report = CycleReport {
            fetched: alerts.len(),
            ..Default::default()
        };

        for alert in &alerts {
            let status = alert.status_at(now);
            if !self.filter.matches(status) {
                continue;
            }

            let notification = Notification {
                alertname: alert.name().to_string(),
                status,
                message: self.formatter.format_at(alert, now),
            };

            match self.sink.send(&notification).await {
                Ok(()) => {
                    metrics::NOTIFICATIONS_SENT_TOTAL.inc();
                    report.sent += 1;
                }
                Err(e) => {
                    warn!(
                        sink = self.sink.name(),
                        alertname = %notification.alertname,
                        error = %e,
                        "failed to deliver notification"
                    );
                    report.failed += 1;
                }
            }
        }

        info!(
            fetched = report.fetched,
            sent = report.sent,
            failed = report.failed,
            "notification cycle finished"
        );
        Ok(report)
    }

    /// Run a cycle every `interval`, skipping cycles whose fetch fails.
    pub async fn run(&self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        // A slow cycle pushes the next one back instead of bunching catch-up cycles.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = self.run_once().await {
                error!(
                    alertmanager = self.client.base_url(),
                    error = %e,
                    "failed to fetch alerts, skipping cycle"
                );
            }
            match metrics::gather_metrics() {
                Ok(text) => debug!(metrics = %text, "cycle metrics"),
                Err(e) => warn!(error = %e, "failed to gather metrics"),
            }
        }
    }
}
