//! Auto-refresh interval: a literal millisecond count or a symbolic period

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Interval used when a symbolic value is not recognised
pub const FALLBACK_INTERVAL_MS: u64 = 30_000;

/// Symbolic intervals and their millisecond equivalents
const NAMED_INTERVALS: [(&str, u64); 6] = [
    ("5s", 5_000),
    ("30s", 30_000),
    ("1m", 60_000),
    ("5m", 5 * 60 * 1_000),
    ("30m", 30 * 60 * 1_000),
    ("1h", 60 * 60 * 1_000),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AutoRefreshInterval {
    Millis(u64),
    Named(String),
}

impl AutoRefreshInterval {
    pub fn named(name: &str) -> Self {
        AutoRefreshInterval::Named(name.to_string())
    }

    /// Whether a symbolic value is one of the known periods
    pub fn is_recognised(&self) -> bool {
        match self {
            AutoRefreshInterval::Millis(_) => true,
            AutoRefreshInterval::Named(name) => {
                NAMED_INTERVALS.iter().any(|(known, _)| known == name)
            }
        }
    }

    pub fn as_millis(&self) -> u64 {
        match self {
            AutoRefreshInterval::Millis(ms) => *ms,
            AutoRefreshInterval::Named(name) => NAMED_INTERVALS
                .iter()
                .find(|(known, _)| known == name)
                .map(|(_, ms)| *ms)
                .unwrap_or(FALLBACK_INTERVAL_MS),
        }
    }

    /// An empty symbolic value, treated like no interval at all
    pub fn is_blank(&self) -> bool {
        matches!(self, AutoRefreshInterval::Named(name) if name.trim().is_empty())
    }

    /// Timer period, or `None` when the interval disables refreshing (zero or blank)
    pub fn period(&self) -> Option<Duration> {
        if self.is_blank() {
            return None;
        }
        match self.as_millis() {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

impl From<u64> for AutoRefreshInterval {
    fn from(ms: u64) -> Self {
        AutoRefreshInterval::Millis(ms)
    }
}

impl From<&str> for AutoRefreshInterval {
    fn from(name: &str) -> Self {
        AutoRefreshInterval::named(name)
    }
}

impl fmt::Display for AutoRefreshInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutoRefreshInterval::Millis(ms) => write!(f, "{ms}ms"),
            AutoRefreshInterval::Named(name) => write!(f, "{name}"),
        }
    }
}
