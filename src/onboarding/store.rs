//! In-memory session store with inactivity eviction.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::limiter::RateLimiter;
use super::model::{ActorProfile, Session};
use crate::config::BotConfig;

/// Mapping from actor id to session record.
///
/// Sessions live for the duration of one process run, bounded by inactivity.
/// There is no persistence: the flow is a short conversation and a crashed
/// process simply restarts onboarding on the next join event.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    idle_timeout: chrono::Duration,
}

impl SessionStore {
    /// Create a store that sweeps sessions idle longer than `idle_timeout`.
    pub fn new(idle_timeout: std::time::Duration) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: chrono::Duration::from_std(idle_timeout)
                .unwrap_or_else(|_| chrono::Duration::hours(1)),
        })
    }

    /// Insert a fresh session for `actor` at the first step.
    ///
    /// An existing session is overwritten: a repeat join restarts onboarding
    /// from the top with a cleared answer set.
    pub async fn create(&self, actor: &str, profile: ActorProfile, now: DateTime<Utc>) -> Session {
        let session = Session::new(actor, profile, now);
        let mut sessions = self.sessions.write().await;
        if sessions.insert(actor.to_string(), session.clone()).is_some() {
            info!(actor, "Existing session overwritten, onboarding restarted");
        } else {
            info!(actor, "Session created");
        }
        session
    }

    /// Fetch a snapshot of the actor's session. Absence means the actor is
    /// not onboarding.
    pub async fn get(&self, actor: &str) -> Option<Session> {
        self.sessions.read().await.get(actor).cloned()
    }

    /// Update the session's last-activity timestamp.
    pub async fn touch(&self, actor: &str, now: DateTime<Utc>) {
        if let Some(session) = self.sessions.write().await.get_mut(actor) {
            session.touch(now);
        }
    }

    /// Apply `f` to the actor's session under the write lock.
    ///
    /// The whole read-decide-write of a transition runs inside `f` while the
    /// lock is held, so a duplicate event for the same actor observes either
    /// the state before or after the transition, never a torn middle. `f`
    /// must not block or await.
    ///
    /// Returns `None` when the actor has no session.
    pub async fn commit<F, T>(&self, actor: &str, f: F) -> Option<T>
    where
        F: FnOnce(&mut Session) -> T,
    {
        let mut sessions = self.sessions.write().await;
        sessions.get_mut(actor).map(f)
    }

    /// Remove every session idle longer than the timeout. Returns the number
    /// of sessions removed.
    pub async fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|actor, session| {
            let keep = !session.is_idle(now, self.idle_timeout);
            if !keep {
                debug!(actor, step = %session.step, "Session expired");
            }
            keep
        });
        let swept = before - sessions.len();
        if swept > 0 {
            info!(swept, remaining = sessions.len(), "Swept idle sessions");
        }
        swept
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Spawn a background task that periodically sweeps idle sessions and stale
/// rate-limit windows.
pub fn spawn_sweep_task(
    store: Arc<SessionStore>,
    limiter: Arc<RateLimiter>,
    config: &BotConfig,
) -> tokio::task::JoinHandle<()> {
    let period = config.sweep_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick fires immediately; skip it so a fresh boot does not
        // log an empty sweep.
        interval.tick().await;
        loop {
            interval.tick().await;
            let now = Utc::now();
            store.sweep(now).await;
            limiter.sweep(now).await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onboarding::step::Step;

    fn store() -> Arc<SessionStore> {
        SessionStore::new(std::time::Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn create_and_get() {
        let store = store();
        let now = Utc::now();
        store.create("U1", ActorProfile::default(), now).await;

        let session = store.get("U1").await.expect("session should exist");
        assert_eq!(session.actor, "U1");
        assert_eq!(session.step, Step::Goals);
        assert!(store.get("U2").await.is_none());
    }

    #[tokio::test]
    async fn create_overwrites_existing_session() {
        let store = store();
        let now = Utc::now();
        store.create("U1", ActorProfile::default(), now).await;
        store
            .commit("U1", |s| {
                s.step = Step::Offer;
                s.answers.audience = Some("founders".into());
            })
            .await;

        store.create("U1", ActorProfile::default(), now).await;
        let session = store.get("U1").await.unwrap();
        assert_eq!(session.step, Step::Goals);
        assert!(session.answers.audience.is_none());
    }

    #[tokio::test]
    async fn commit_on_absent_actor_is_none() {
        let store = store();
        let result = store.commit("ghost", |s| s.step).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn sweep_removes_only_idle_sessions() {
        let store = store();
        let t0 = Utc::now();
        store.create("idle", ActorProfile::default(), t0).await;
        store.create("busy", ActorProfile::default(), t0).await;

        let later = t0 + chrono::Duration::minutes(50);
        store.touch("busy", later).await;

        // 70 minutes after t0: "idle" is past the hour, "busy" is not.
        let swept = store.sweep(t0 + chrono::Duration::minutes(70)).await;
        assert_eq!(swept, 1);
        assert!(store.get("idle").await.is_none());
        assert!(store.get("busy").await.is_some());
    }

    #[tokio::test]
    async fn touch_keeps_a_session_alive_through_sweep() {
        let store = store();
        let t0 = Utc::now();
        store.create("U1", ActorProfile::default(), t0).await;
        store.touch("U1", t0 + chrono::Duration::minutes(55)).await;

        store.sweep(t0 + chrono::Duration::minutes(90)).await;
        assert!(store.get("U1").await.is_some());

        store.sweep(t0 + chrono::Duration::minutes(200)).await;
        assert!(store.get("U1").await.is_none());
    }
}
