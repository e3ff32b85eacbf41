//! Service configuration loaded from environment variables.

use std::time::Duration;

/// Time budgets for the bounded steps of a command.
///
/// Reads from environment variables:
/// - `ORDER_FETCH_TIMEOUT_MS` (default: `5000`)
/// - `ORDER_PERSIST_TIMEOUT_MS` (default: `5000`)
/// - `ORDER_PUBLISH_TIMEOUT_MS` (default: `10000`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    pub fetch_timeout: Duration,
    pub persist_timeout: Duration,
    pub publish_timeout: Duration,
}

impl ServiceConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            fetch_timeout: millis_from_env("ORDER_FETCH_TIMEOUT_MS", defaults.fetch_timeout),
            persist_timeout: millis_from_env("ORDER_PERSIST_TIMEOUT_MS", defaults.persist_timeout),
            publish_timeout: millis_from_env("ORDER_PUBLISH_TIMEOUT_MS", defaults.publish_timeout),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(5),
            persist_timeout: Duration::from_secs(5),
            publish_timeout: Duration::from_secs(10),
        }
    }
}

fn millis_from_env(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ServiceConfig::default();
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.persist_timeout, Duration::from_secs(5));
        assert_eq!(config.publish_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_unset_variable_uses_default() {
        let value = millis_from_env("ORDER_TEST_UNSET_TIMEOUT_MS", Duration::from_millis(42));
        assert_eq!(value, Duration::from_millis(42));
    }
}
