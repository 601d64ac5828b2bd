//! Poller configuration
//!
//! Defines the tunables of a job poller: how often it polls, whether it
//! fetches categories, how it treats cancellation and when it gives up.

use std::time::Duration;

use crate::error::{PollerError, Result};

/// Default delay between two status fetches
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Intervals at or above this no longer feel live
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Poller configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// How often to fetch the job status
    pub interval: Duration,

    /// Fetch categories while the job is producing them
    pub fetch_categories: bool,

    /// Keep polling after a successful cancel request until the backend
    /// reports a terminal state, instead of stopping right away
    pub await_cancel_confirmation: bool,

    /// Stop after this many consecutive failed status fetches.
    /// `None` keeps trying forever.
    pub give_up_after: Option<u32>,
}

impl PollerConfig {
    /// Creates a configuration with defaults
    pub fn new() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            fetch_categories: true,
            await_cancel_confirmation: false,
            give_up_after: None,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Recognized environment variables (all optional, unparsable values
    /// fall back to the default):
    /// - GEO_POLL_INTERVAL_MS (default: 3000)
    /// - GEO_FETCH_CATEGORIES (default: true)
    /// - GEO_AWAIT_CANCEL_CONFIRMATION (default: false)
    /// - GEO_GIVE_UP_AFTER (default: unset, never give up)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::new();

        let interval = lookup("GEO_POLL_INTERVAL_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.interval);

        let fetch_categories = lookup("GEO_FETCH_CATEGORIES")
            .and_then(|s| parse_bool(&s))
            .unwrap_or(defaults.fetch_categories);

        let await_cancel_confirmation = lookup("GEO_AWAIT_CANCEL_CONFIRMATION")
            .and_then(|s| parse_bool(&s))
            .unwrap_or(defaults.await_cancel_confirmation);

        let give_up_after = lookup("GEO_GIVE_UP_AFTER")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .or(defaults.give_up_after);

        let config = Self {
            interval,
            fetch_categories,
            await_cancel_confirmation,
            give_up_after,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_categories(mut self, fetch: bool) -> Self {
        self.fetch_categories = fetch;
        self
    }

    pub fn with_cancel_confirmation(mut self, wait: bool) -> Self {
        self.await_cancel_confirmation = wait;
        self
    }

    pub fn with_give_up_after(mut self, failures: Option<u32>) -> Self {
        self.give_up_after = failures;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(PollerError::InvalidConfig(
                "poll interval must be greater than 0".to_string(),
            ));
        }

        if self.interval >= MAX_POLL_INTERVAL {
            return Err(PollerError::InvalidConfig(format!(
                "poll interval must be below {:?}, got {:?}",
                MAX_POLL_INTERVAL, self.interval
            )));
        }

        if self.give_up_after == Some(0) {
            return Err(PollerError::InvalidConfig(
                "give_up_after must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = PollerConfig::default();
        assert_eq!(config.interval, Duration::from_secs(3));
        assert!(config.fetch_categories);
        assert!(!config.await_cancel_confirmation);
        assert_eq!(config.give_up_after, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = PollerConfig::default();

        config.interval = Duration::ZERO;
        assert!(config.validate().is_err());

        config.interval = Duration::from_secs(10);
        assert!(config.validate().is_err());

        config.interval = Duration::from_millis(9_999);
        assert!(config.validate().is_ok());

        config.give_up_after = Some(0);
        assert!(config.validate().is_err());

        config.give_up_after = Some(5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let config = PollerConfig::from_lookup(lookup_from(&[
            ("GEO_POLL_INTERVAL_MS", "1500"),
            ("GEO_FETCH_CATEGORIES", "no"),
            ("GEO_AWAIT_CANCEL_CONFIRMATION", "TRUE"),
            ("GEO_GIVE_UP_AFTER", "20"),
        ]))
        .unwrap();

        assert_eq!(config.interval, Duration::from_millis(1500));
        assert!(!config.fetch_categories);
        assert!(config.await_cancel_confirmation);
        assert_eq!(config.give_up_after, Some(20));
    }

    #[test]
    fn test_from_lookup_ignores_garbage() {
        let config = PollerConfig::from_lookup(lookup_from(&[
            ("GEO_POLL_INTERVAL_MS", "soon"),
            ("GEO_FETCH_CATEGORIES", "maybe"),
        ]))
        .unwrap();

        assert_eq!(config, PollerConfig::default());
    }

    #[test]
    fn test_from_lookup_rejects_slow_interval() {
        let result = PollerConfig::from_lookup(lookup_from(&[("GEO_POLL_INTERVAL_MS", "60000")]));
        assert!(matches!(result, Err(PollerError::InvalidConfig(_))));
    }

    #[test]
    fn test_builder_methods() {
        let config = PollerConfig::new()
            .with_interval(Duration::from_secs(1))
            .with_categories(false)
            .with_cancel_confirmation(true)
            .with_give_up_after(Some(3));

        assert_eq!(config.interval, Duration::from_secs(1));
        assert!(!config.fetch_categories);
        assert!(config.await_cancel_confirmation);
        assert_eq!(config.give_up_after, Some(3));
    }
}
