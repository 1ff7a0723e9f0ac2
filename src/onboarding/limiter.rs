//! Per-actor sliding-window rate limiter.
//!
//! Gates inbound events before they reach the flow engine. Purely a boolean
//! gate: a rejected event is never recorded, so a flooding actor regains
//! capacity as soon as older requests age out of the window.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

/// Sliding-window request counter keyed by actor.
pub struct RateLimiter {
    windows: RwLock<HashMap<String, Vec<DateTime<Utc>>>>,
    window: Duration,
    max_requests: usize,
}

impl RateLimiter {
    /// Create a limiter admitting up to `max_requests` events per `window`.
    pub fn new(window: std::time::Duration, max_requests: usize) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            window: Duration::from_std(window).unwrap_or_else(|_| Duration::seconds(60)),
            max_requests,
        }
    }

    /// Admit or reject an event for `actor` at `now`.
    ///
    /// Entries older than the window are dropped before counting, which also
    /// bounds per-actor memory to at most `max_requests` timestamps. A
    /// rejected attempt is not recorded.
    pub async fn admit(&self, actor: &str, now: DateTime<Utc>) -> bool {
        let mut windows = self.windows.write().await;
        let requests = windows.entry(actor.to_string()).or_default();

        let cutoff = now - self.window;
        requests.retain(|t| *t > cutoff);

        if requests.len() >= self.max_requests {
            debug!(actor, count = requests.len(), "Rate limit exceeded");
            return false;
        }

        requests.push(now);
        true
    }

    /// Drop windows whose every entry has aged out.
    ///
    /// Windows for actors who send one message and vanish would otherwise
    /// accumulate forever; this runs on the session sweep timer.
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - self.window;
        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, requests| requests.iter().any(|t| *t > cutoff));
        let swept = before - windows.len();
        if swept > 0 {
            debug!(swept, "Swept idle rate-limit windows");
        }
        swept
    }

    /// Number of actors currently tracked.
    pub async fn tracked_actors(&self) -> usize {
        self.windows.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(std::time::Duration::from_secs(60), 10)
    }

    #[tokio::test]
    async fn admits_up_to_the_cap() {
        let limiter = limiter();
        let now = Utc::now();
        for i in 0..10 {
            assert!(
                limiter.admit("U1", now + Duration::seconds(i)).await,
                "event {i} should be admitted"
            );
        }
        // 11th within the same window is rejected.
        assert!(!limiter.admit("U1", now + Duration::seconds(30)).await);
    }

    #[tokio::test]
    async fn capacity_returns_after_the_window() {
        let limiter = limiter();
        let now = Utc::now();
        for _ in 0..10 {
            assert!(limiter.admit("U1", now).await);
        }
        assert!(!limiter.admit("U1", now + Duration::seconds(59)).await);
        // Past the window the old entries age out.
        assert!(limiter.admit("U1", now + Duration::seconds(61)).await);
    }

    #[tokio::test]
    async fn rejected_attempts_are_not_recorded() {
        let limiter = limiter();
        let now = Utc::now();
        for _ in 0..10 {
            limiter.admit("U1", now).await;
        }
        // Hammering while limited must not extend the lockout.
        for i in 0..100 {
            limiter.admit("U1", now + Duration::seconds(i % 50)).await;
        }
        assert!(limiter.admit("U1", now + Duration::seconds(61)).await);
    }

    #[tokio::test]
    async fn actors_are_independent() {
        let limiter = limiter();
        let now = Utc::now();
        for _ in 0..10 {
            assert!(limiter.admit("U1", now).await);
        }
        assert!(!limiter.admit("U1", now).await);
        assert!(limiter.admit("U2", now).await);
    }

    #[tokio::test]
    async fn sweep_drops_idle_windows() {
        let limiter = limiter();
        let now = Utc::now();
        limiter.admit("gone", now).await;
        limiter.admit("active", now + Duration::seconds(90)).await;
        assert_eq!(limiter.tracked_actors().await, 2);

        let swept = limiter.sweep(now + Duration::seconds(120)).await;
        assert_eq!(swept, 1);
        assert_eq!(limiter.tracked_actors().await, 1);
    }
}
