//! Rendering of alerts into markdown-flavored chat messages.

mod humanize;

pub use humanize::{CompactHumanizer, Humanize, WordHumanizer};

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::alertmanager::{Alert, AlertStatus, ALERTNAME_LABEL, SUMMARY_ANNOTATION};

/// Renders alerts using a pluggable duration humanizer.
#[derive(Clone)]
pub struct AlertFormatter {
    humanizer: Arc<dyn Humanize>,
}

impl Default for AlertFormatter {
    fn default() -> Self {
        Self::new(WordHumanizer::new())
    }
}

impl AlertFormatter {
    pub fn new(humanizer: impl Humanize + 'static) -> Self {
        Self {
            humanizer: Arc::new(humanizer),
        }
    }

    pub fn format(&self, alert: &Alert) -> String {
        self.format_at(alert, Utc::now())
    }

    /// Render `alert` as seen at `now`.
    ///
    /// The message looks like:
    ///
    /// ```text
    /// 🔥 *FIRING* 🔥 *HighCPU*
    /// CPU high
    ///
    /// job: api
    ///
    /// *Started*: 1 hour 30 minutes ago
    /// ```
    ///
    /// `alertname` and `summary` head the message and are left out of the
    /// label and annotation listings. The alert itself is never modified.
    pub fn format_at(&self, alert: &Alert, now: DateTime<Utc>) -> String {
        let (status, duration) = match alert.status_at(now) {
            AlertStatus::Firing => (
                format!("🔥 *{}* 🔥", AlertStatus::Firing.as_str().to_uppercase()),
                format!(
                    "*Started*: {} ago",
                    self.humanizer.humanize(elapsed(alert.starts_at, now))
                ),
            ),
            AlertStatus::Resolved => {
                // status_at only reports Resolved when ends_at is set
                let ends_at = alert.ends_at.unwrap_or(now);
                (
                    format!("*{}*", AlertStatus::Resolved.as_str().to_uppercase()),
                    format!(
                        "*Ended*: {} ago\n*Duration*: {}",
                        self.humanizer.humanize(elapsed(ends_at, now)),
                        self.humanizer.humanize(elapsed(alert.starts_at, ends_at)),
                    ),
                )
            }
        };

        let labels = render_entries(&alert.labels, ALERTNAME_LABEL);
        let annotations = render_entries(&alert.annotations, SUMMARY_ANNOTATION);

        format!(
            "{} *{}*\n{}\n\n{}{}\n{}\n",
            status,
            alert.name(),
            alert.summary(),
            labels,
            annotations,
            duration,
        )
    }
}

/// Format `alert` with the default humanizer as of now.
pub fn format_alert(alert: &Alert) -> String {
    AlertFormatter::default().format(alert)
}

/// Escape underscores so chat markdown does not read them as emphasis.
pub fn escape(value: &str) -> String {
    value.replace('_', "\\_")
}

fn render_entries(entries: &BTreeMap<String, String>, skip: &str) -> String {
    entries
        .iter()
        .filter(|(key, _)| key.as_str() != skip)
        .map(|(key, value)| format!("{}: {}\n", key, escape(value)))
        .collect()
}

/// Time from `from` to `to`, clamped at zero.
fn elapsed(from: DateTime<Utc>, to: DateTime<Utc>) -> Duration {
    (to - from).to_std().unwrap_or(Duration::ZERO)
}
