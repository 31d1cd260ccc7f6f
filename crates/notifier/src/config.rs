use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::alertmanager::RetryPolicy;
use crate::format::{AlertFormatter, CompactHumanizer, WordHumanizer};
use crate::sinks::OutputFormat;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DurationStyle {
    /// "1 hour 30 minutes"
    #[default]
    Words,
    /// "1h 30m"
    Compact,
}

impl FromStr for DurationStyle {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "words" => Ok(DurationStyle::Words),
            "compact" => Ok(DurationStyle::Compact),
            other => Err(crate::Error::Config(format!(
                "Invalid duration style: {}. Must be 'words' or 'compact'",
                other
            ))),
        }
    }
}

impl DurationStyle {
    pub fn formatter(&self) -> AlertFormatter {
        match self {
            DurationStyle::Words => AlertFormatter::new(WordHumanizer::new()),
            DurationStyle::Compact => AlertFormatter::new(CompactHumanizer),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub alertmanager: AlertmanagerConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Seconds between cycles; `None` runs a single cycle.
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertmanagerConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 200,
            max_backoff_ms: 5000,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub pretty: bool,
    #[serde(default)]
    pub duration_style: DurationStyle,
}

impl Config {
    pub fn load() -> crate::Result<Self> {
        // Load environment variables from .env file if it exists
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from `lookup`, falling back to defaults for unset keys.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let parse_or = |key: &str, default: u64| {
            lookup(key).and_then(|s| s.parse().ok()).unwrap_or(default)
        };

        let config = Config {
            alertmanager: AlertmanagerConfig {
                url: lookup("ALERTMANAGER_URL").unwrap_or(defaults.alertmanager.url),
                timeout_secs: parse_or("HTTP_TIMEOUT_SECS", defaults.alertmanager.timeout_secs),
            },
            retry: RetryConfig {
                max_attempts: lookup("RETRY_MAX_ATTEMPTS")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.retry.max_attempts),
                initial_backoff_ms: parse_or(
                    "RETRY_INITIAL_BACKOFF_MS",
                    defaults.retry.initial_backoff_ms,
                ),
                max_backoff_ms: parse_or("RETRY_MAX_BACKOFF_MS", defaults.retry.max_backoff_ms),
            },
            output: OutputConfig {
                format: match lookup("OUTPUT_FORMAT") {
                    Some(format) => format.parse()?,
                    None => OutputFormat::Text,
                },
                pretty: lookup("OUTPUT_PRETTY")
                    .map(|s| matches!(s.to_lowercase().as_str(), "1" | "true" | "yes"))
                    .unwrap_or(false),
                duration_style: match lookup("DURATION_STYLE") {
                    Some(style) => style.parse()?,
                    None => DurationStyle::Words,
                },
            },
            poll_interval_secs: lookup("POLL_INTERVAL_SECS").and_then(|s| s.parse().ok()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> crate::Result<()> {
        let url = Url::parse(&self.alertmanager.url).map_err(|e| {
            crate::Error::Config(format!(
                "ALERTMANAGER_URL '{}' is not a valid URL: {}",
                self.alertmanager.url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(crate::Error::Config(format!(
                "ALERTMANAGER_URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if self.alertmanager.timeout_secs == 0 {
            return Err(crate::Error::Config(
                "HTTP_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(crate::Error::Config(
                "RETRY_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        if self.retry.initial_backoff_ms > self.retry.max_backoff_ms {
            tracing::warn!(
                initial_backoff_ms = self.retry.initial_backoff_ms,
                max_backoff_ms = self.retry.max_backoff_ms,
                "initial backoff exceeds maximum; retries will wait the maximum"
            );
        }
        if self.poll_interval_secs == Some(0) {
            return Err(crate::Error::Config(
                "POLL_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.alertmanager.timeout_secs)
    }

    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval_secs.map(Duration::from_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alertmanager: AlertmanagerConfig {
                url: "http://localhost:9093".to_string(),
                timeout_secs: 10,
            },
            retry: RetryConfig::default(),
            output: OutputConfig::default(),
            poll_interval_secs: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> crate::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_vars(&[]).unwrap();
        assert_eq!(config.alertmanager.url, "http://localhost:9093");
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.retry.policy(), RetryPolicy::default());
        assert_eq!(config.output.format, OutputFormat::Text);
        assert_eq!(config.output.duration_style, DurationStyle::Words);
        assert_eq!(config.poll_interval(), None);
    }

    #[test]
    fn test_overrides() {
        let config = from_vars(&[
            ("ALERTMANAGER_URL", "https://am.example.com/"),
            ("HTTP_TIMEOUT_SECS", "3"),
            ("RETRY_MAX_ATTEMPTS", "2"),
            ("RETRY_INITIAL_BACKOFF_MS", "50"),
            ("RETRY_MAX_BACKOFF_MS", "400"),
            ("OUTPUT_FORMAT", "json"),
            ("OUTPUT_PRETTY", "true"),
            ("DURATION_STYLE", "compact"),
            ("POLL_INTERVAL_SECS", "60"),
        ])
        .unwrap();

        assert_eq!(config.alertmanager.url, "https://am.example.com/");
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(
            config.retry.policy(),
            RetryPolicy {
                max_attempts: 2,
                initial_backoff: Duration::from_millis(50),
                max_backoff: Duration::from_millis(400),
            }
        );
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.pretty);
        assert_eq!(config.output.duration_style, DurationStyle::Compact);
        assert_eq!(config.poll_interval(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_unparseable_numbers_fall_back_to_defaults() {
        let config = from_vars(&[("HTTP_TIMEOUT_SECS", "soon"), ("RETRY_MAX_ATTEMPTS", "-1")]).unwrap();
        assert_eq!(config.alertmanager.timeout_secs, 10);
        assert_eq!(config.retry.max_attempts, 5);
    }

    #[test]
    fn test_invalid_url() {
        assert!(from_vars(&[("ALERTMANAGER_URL", "not a url")]).is_err());
        assert!(from_vars(&[("ALERTMANAGER_URL", "ftp://am:9093")]).is_err());
    }

    #[test]
    fn test_invalid_values() {
        assert!(from_vars(&[("RETRY_MAX_ATTEMPTS", "0")]).is_err());
        assert!(from_vars(&[("OUTPUT_FORMAT", "xml")]).is_err());
        assert!(from_vars(&[("POLL_INTERVAL_SECS", "0")]).is_err());
        assert!(from_vars(&[("HTTP_TIMEOUT_SECS", "0")]).is_err());
        assert!(from_vars(&[("DURATION_STYLE", "verbose")]).is_err());
    }

    #[test]
    fn test_duration_style_from_str() {
        assert_eq!("Compact".parse::<DurationStyle>().unwrap(), DurationStyle::Compact);
        assert_eq!("words".parse::<DurationStyle>().unwrap(), DurationStyle::Words);
        assert!(matches!(
            "verbose".parse::<DurationStyle>(),
            Err(crate::Error::Config(_))
        ));
    }
}
