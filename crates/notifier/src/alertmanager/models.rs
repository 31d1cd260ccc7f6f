use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Label carrying the alert's name.
pub const ALERTNAME_LABEL: &str = "alertname";
/// Annotation carrying the one-line description.
pub const SUMMARY_ANNOTATION: &str = "summary";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Firing,
    Resolved,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Firing => "firing",
            AlertStatus::Resolved => "resolved",
        }
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single alert as reported by `GET /api/v1/alerts`.
///
/// Labels and annotations are kept sorted by key so that anything rendered
/// from them is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    pub starts_at: DateTime<Utc>,
    /// `None` when the field is absent, `null`, or Go's zero time.
    #[serde(
        default,
        deserialize_with = "deserialize_ends_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub ends_at: Option<DateTime<Utc>>,
    #[serde(
        rename = "generatorURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub generator_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl Alert {
    /// Status as of now.
    pub fn status(&self) -> AlertStatus {
        self.status_at(Utc::now())
    }

    /// An alert is resolved once its end time has passed; an alert without an
    /// end time, or with one in the future, is still firing.
    pub fn status_at(&self, now: DateTime<Utc>) -> AlertStatus {
        match self.ends_at {
            Some(ends_at) if ends_at <= now => AlertStatus::Resolved,
            _ => AlertStatus::Firing,
        }
    }

    pub fn name(&self) -> &str {
        self.labels
            .get(ALERTNAME_LABEL)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn summary(&self) -> &str {
        self.annotations
            .get(SUMMARY_ANNOTATION)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Envelope returned by the Alertmanager v1 API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertListResponse {
    #[serde(default)]
    pub status: String,
    #[serde(
        rename = "data",
        default,
        deserialize_with = "deserialize_alerts",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub alerts: Vec<Alert>,
}

fn deserialize_ends_at<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    // Alertmanager serializes an unset time as 0001-01-01T00:00:00Z.
    let ends_at = Option::<DateTime<Utc>>::deserialize(deserializer)?;
    Ok(ends_at.filter(|t| t.year() > 1))
}

fn deserialize_alerts<'de, D>(deserializer: D) -> Result<Vec<Alert>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Alert>>::deserialize(deserializer)?.unwrap_or_default())
}
