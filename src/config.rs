//! Configuration types.

use std::time::Duration;

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot name for identification.
    pub name: String,
    /// Sliding window size for the per-actor rate limiter.
    pub rate_limit_window: Duration,
    /// Maximum admitted events per actor within the window.
    pub rate_limit_max_requests: usize,
    /// Session idle timeout (sessions are swept after this duration).
    pub session_idle_timeout: Duration,
    /// Sweep timer period. Same as the idle timeout: expiry resolution is
    /// coarse, a late sweep only costs memory, never correctness.
    pub sweep_interval: Duration,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "growth-assist".to_string(),
            rate_limit_window: Duration::from_secs(60),
            rate_limit_max_requests: 10,
            session_idle_timeout: Duration::from_secs(3600), // 1 hour
            sweep_interval: Duration::from_secs(3600),
        }
    }
}

impl BotConfig {
    /// Build a config from the environment, falling back to defaults.
    ///
    /// Recognized variables: `GROWTH_ASSIST_RATE_WINDOW_SECS`,
    /// `GROWTH_ASSIST_RATE_MAX`, `GROWTH_ASSIST_IDLE_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let rate_limit_window =
            env_secs("GROWTH_ASSIST_RATE_WINDOW_SECS").unwrap_or(defaults.rate_limit_window);
        let rate_limit_max_requests = std::env::var("GROWTH_ASSIST_RATE_MAX")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.rate_limit_max_requests);
        let session_idle_timeout =
            env_secs("GROWTH_ASSIST_IDLE_TIMEOUT_SECS").unwrap_or(defaults.session_idle_timeout);

        Self {
            rate_limit_window,
            rate_limit_max_requests,
            session_idle_timeout,
            sweep_interval: session_idle_timeout,
            ..defaults
        }
    }
}

fn env_secs(key: &str) -> Option<Duration> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_flow_requirements() {
        let config = BotConfig::default();
        assert_eq!(config.rate_limit_window, Duration::from_secs(60));
        assert_eq!(config.rate_limit_max_requests, 10);
        assert_eq!(config.session_idle_timeout, Duration::from_secs(3600));
        assert_eq!(config.sweep_interval, config.session_idle_timeout);
    }
}
