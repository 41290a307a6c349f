//! Server settings from the environment: HOST, PORT, INACTIVITY_TIMEOUT_HOURS,
//! CLEANUP_INTERVAL_MINUTES. Blank or unparsable values fall back to defaults.

use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_INACTIVITY_HOURS: u64 = 12;
pub const DEFAULT_CLEANUP_MINUTES: u64 = 30;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Tournaments not accessed for this long are removed.
    pub inactivity_timeout: Duration,
    /// How often the cleanup task runs.
    pub cleanup_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            inactivity_timeout: Duration::from_secs(DEFAULT_INACTIVITY_HOURS * 3600),
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_MINUTES * 60),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup (the process environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();
        let positive = |key: &str| value(key).and_then(|v| v.parse::<u64>().ok()).filter(|n| *n > 0);
        Self {
            host: value("HOST").unwrap_or(defaults.host),
            port: value("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            inactivity_timeout: positive("INACTIVITY_TIMEOUT_HOURS")
                .map(|h| Duration::from_secs(h * 3600))
                .unwrap_or(defaults.inactivity_timeout),
            cleanup_interval: positive("CLEANUP_INTERVAL_MINUTES")
                .map(|m| Duration::from_secs(m * 60))
                .unwrap_or(defaults.cleanup_interval),
        }
    }
}
