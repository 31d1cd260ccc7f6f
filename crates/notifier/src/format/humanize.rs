use std::time::Duration;

/// Turns a duration into a phrase such as "2 hours 15 minutes".
pub trait Humanize: Send + Sync {
    fn humanize(&self, duration: Duration) -> String;
}

impl<F> Humanize for F
where
    F: Fn(Duration) -> String + Send + Sync,
{
    fn humanize(&self, duration: Duration) -> String {
        self(duration)
    }
}

const UNITS: [(&str, u64); 5] = [
    ("week", 7 * 24 * 60 * 60),
    ("day", 24 * 60 * 60),
    ("hour", 60 * 60),
    ("minute", 60),
    ("second", 1),
];

/// Spelled-out units, largest first, skipping empty ones. Sub-second
/// precision is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordHumanizer {
    max_units: Option<usize>,
}

impl WordHumanizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the `max_units` largest non-zero units.
    pub fn with_max_units(mut self, max_units: usize) -> Self {
        self.max_units = Some(max_units.max(1));
        self
    }
}

impl Humanize for WordHumanizer {
    fn humanize(&self, duration: Duration) -> String {
        let mut remaining = duration.as_secs();
        let mut parts = Vec::new();

        for (unit, size) in UNITS {
            let count = remaining / size;
            remaining %= size;
            if count == 0 {
                continue;
            }
            parts.push(if count == 1 {
                format!("1 {}", unit)
            } else {
                format!("{} {}s", count, unit)
            });
        }

        if let Some(max_units) = self.max_units {
            parts.truncate(max_units);
        }

        if parts.is_empty() {
            "0 seconds".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// humantime's compact notation, e.g. "1h 30m".
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactHumanizer;

impl Humanize for CompactHumanizer {
    fn humanize(&self, duration: Duration) -> String {
        humantime::format_duration(Duration::from_secs(duration.as_secs())).to_string()
    }
}
