//! Event processor — wires the rate limiter, session store, flow engine and
//! dispatcher together.
//!
//! **Order matters**: the step transition commits under the store lock before
//! any outbound send is issued. A dispatch failure therefore never loses the
//! transition; redelivering the prompt is enough, the business logic does not
//! re-run.

use std::sync::Arc;

use chrono::Utc;
use futures::StreamExt;
use tracing::{debug, error, info, warn};

use super::engine::{FlowEngine, Outcome};
use super::limiter::RateLimiter;
use super::model::ActorProfile;
use super::prompts;
use super::store::SessionStore;
use crate::channels::{Dispatcher, EventStream, ProfileSource};
use crate::error::Result;
use crate::events::InboundEvent;

/// Drives inbound events through the onboarding flow.
pub struct OnboardingProcessor {
    engine: FlowEngine,
    sessions: Arc<SessionStore>,
    limiter: Arc<RateLimiter>,
    dispatcher: Arc<dyn Dispatcher>,
    profiles: Arc<dyn ProfileSource>,
}

impl OnboardingProcessor {
    pub fn new(
        sessions: Arc<SessionStore>,
        limiter: Arc<RateLimiter>,
        dispatcher: Arc<dyn Dispatcher>,
        profiles: Arc<dyn ProfileSource>,
    ) -> Self {
        Self {
            engine: FlowEngine::new(),
            sessions,
            limiter,
            dispatcher,
            profiles,
        }
    }

    /// Consume an event stream until it ends.
    ///
    /// Handler errors are logged and never propagate: a failed event leaves
    /// the session at its last committed state and processing continues.
    pub async fn run(&self, mut events: EventStream) {
        info!("Onboarding processor started");
        while let Some(event) = events.next().await {
            if let Err(e) = self.handle_event(event).await {
                error!(error = %e, "Event handling failed");
            }
        }
        info!("Event stream ended, onboarding processor stopping");
    }

    /// Handle a single inbound event.
    pub async fn handle_event(&self, event: InboundEvent) -> Result<()> {
        let now = Utc::now();
        debug!(actor = event.actor(), kind = event.label(), "Inbound event");

        match &event {
            InboundEvent::UserJoined { actor } => {
                if !self.limiter.admit(actor, now).await {
                    self.notify_rate_limited(actor).await;
                    return Ok(());
                }
                self.start_onboarding(actor).await
            }
            InboundEvent::Message { actor, .. } => {
                if !self.limiter.admit(actor, now).await {
                    self.notify_rate_limited(actor).await;
                    return Ok(());
                }
                self.apply(&event).await
            }
            // Selections come from our own closed option sets and each click
            // is acknowledged by the platform, so they bypass the limiter.
            InboundEvent::Selection { .. } => self.apply(&event).await,
        }
    }

    /// Create (or reset) the actor's session and send the welcome prompt.
    async fn start_onboarding(&self, actor: &str) -> Result<()> {
        let profile = match self.profiles.fetch(actor).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(actor, error = %e, "Profile lookup failed, using empty defaults");
                ActorProfile::default()
            }
        };

        self.sessions.create(actor, profile, Utc::now()).await;

        for prompt in self.engine.welcome() {
            self.dispatcher.send(actor, &prompt).await?;
        }
        Ok(())
    }

    /// Run one event through the engine and dispatch the resulting prompts.
    async fn apply(&self, event: &InboundEvent) -> Result<()> {
        let actor = event.actor().to_string();
        let now = Utc::now();

        // Read, decide and write under the store's per-actor commit; no await
        // inside, so a duplicate event sees either the old or the new step.
        let outcome = self
            .sessions
            .commit(&actor, |session| {
                session.touch(now);
                self.engine.handle(session, event)
            })
            .await;

        let Some(outcome) = outcome else {
            // No session: the actor is not onboarding. Normal, not an error.
            debug!(actor, "Event for actor without session, ignored");
            return Ok(());
        };

        if matches!(outcome, Outcome::Ignored) {
            return Ok(());
        }

        for prompt in outcome.prompts() {
            self.dispatcher.send(&actor, prompt).await?;
        }
        Ok(())
    }

    /// Best-effort "slow down" notice; a failed send is only logged.
    async fn notify_rate_limited(&self, actor: &str) {
        info!(actor, "Rate limit exceeded, event dropped");
        let prompt = prompts::rate_limited(actor);
        if let Err(e) = self.dispatcher.send(actor, &prompt).await {
            warn!(actor, error = %e, "Failed to deliver rate-limit notice");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChannelError;
    use crate::events::{ActionId, Attachment, Prompt};
    use crate::onboarding::step::Step;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Dispatcher that records everything it is asked to send.
    #[derive(Default)]
    struct RecordingDispatcher {
        sent: Mutex<Vec<(String, Prompt)>>,
        fail: std::sync::atomic::AtomicBool,
    }

    impl RecordingDispatcher {
        fn sent(&self) -> Vec<(String, Prompt)> {
            self.sent.lock().unwrap().clone()
        }

        fn set_failing(&self, failing: bool) {
            self.fail
                .store(failing, std::sync::atomic::Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Dispatcher for RecordingDispatcher {
        fn name(&self) -> &str {
            "recording"
        }

        async fn send(&self, actor: &str, prompt: &Prompt) -> std::result::Result<(), ChannelError> {
            if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                return Err(ChannelError::SendFailed {
                    name: "recording".into(),
                    reason: "synthetic failure".into(),
                });
            }
            self.sent
                .lock()
                .unwrap()
                .push((actor.to_string(), prompt.clone()));
            Ok(())
        }
    }

    struct StaticProfiles;

    #[async_trait]
    impl ProfileSource for StaticProfiles {
        async fn fetch(&self, _actor: &str) -> std::result::Result<ActorProfile, ChannelError> {
            Ok(ActorProfile {
                display_name: "Dana Cruz".into(),
                email: "dana@example.com".into(),
            })
        }
    }

    fn processor() -> (OnboardingProcessor, Arc<RecordingDispatcher>, Arc<SessionStore>) {
        let sessions = SessionStore::new(std::time::Duration::from_secs(3600));
        let limiter = Arc::new(RateLimiter::new(std::time::Duration::from_secs(60), 10));
        let dispatcher = Arc::new(RecordingDispatcher::default());
        let proc = OnboardingProcessor::new(
            Arc::clone(&sessions),
            limiter,
            dispatcher.clone(),
            Arc::new(StaticProfiles),
        );
        (proc, dispatcher, sessions)
    }

    fn join(actor: &str) -> InboundEvent {
        InboundEvent::UserJoined {
            actor: actor.into(),
        }
    }

    fn text(actor: &str, msg: &str) -> InboundEvent {
        InboundEvent::Message {
            actor: actor.into(),
            text: msg.into(),
            attachments: vec![],
        }
    }

    fn select(actor: &str, action: ActionId, value: &str) -> InboundEvent {
        InboundEvent::Selection {
            actor: actor.into(),
            action,
            value: value.into(),
        }
    }

    #[tokio::test]
    async fn join_creates_a_session_and_sends_the_welcome() {
        let (proc, dispatcher, sessions) = processor();
        proc.handle_event(join("U1")).await.unwrap();

        let session = sessions.get("U1").await.expect("session created");
        assert_eq!(session.step, Step::Goals);
        assert_eq!(session.profile.display_name, "Dana Cruz");

        let sent = dispatcher.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "U1");
        assert!(sent[0].1.text.contains("Step 1"));
    }

    #[tokio::test]
    async fn events_without_a_session_are_ignored() {
        let (proc, dispatcher, sessions) = processor();

        proc.handle_event(text("ghost", "hello")).await.unwrap();
        proc.handle_event(select("ghost", ActionId::GoalSelected, "meetings"))
            .await
            .unwrap();

        assert!(sessions.is_empty().await);
        assert!(dispatcher.sent().is_empty());
    }

    #[tokio::test]
    async fn full_flow_through_the_processor() {
        let (proc, dispatcher, sessions) = processor();

        proc.handle_event(join("U1")).await.unwrap();
        proc.handle_event(select("U1", ActionId::GoalSelected, "meetings"))
            .await
            .unwrap();
        proc.handle_event(text("U1", "founders")).await.unwrap();
        proc.handle_event(text("U1", "NY")).await.unwrap();
        proc.handle_event(text("U1", "we sell X")).await.unwrap();
        proc.handle_event(select("U1", ActionId::OutreachNo, "no"))
            .await
            .unwrap();
        proc.handle_event(select("U1", ActionId::SelectTone, "Friendly"))
            .await
            .unwrap();
        proc.handle_event(select("U1", ActionId::ToneOk, "tone_ok"))
            .await
            .unwrap();

        let session = sessions.get("U1").await.unwrap();
        assert_eq!(session.step, Step::SignatureName);
        assert_eq!(session.answers.audience.as_deref(), Some("founders"));

        // One prompt per accepted event.
        assert_eq!(dispatcher.sent().len(), 8);
    }

    #[tokio::test]
    async fn rejoin_restarts_the_flow() {
        let (proc, _dispatcher, sessions) = processor();

        proc.handle_event(join("U1")).await.unwrap();
        proc.handle_event(select("U1", ActionId::GoalSelected, "meetings"))
            .await
            .unwrap();
        proc.handle_event(text("U1", "founders")).await.unwrap();
        assert_eq!(sessions.get("U1").await.unwrap().step, Step::Locations);

        proc.handle_event(join("U1")).await.unwrap();
        let session = sessions.get("U1").await.unwrap();
        assert_eq!(session.step, Step::Goals);
        assert!(session.answers.goal.is_none());
        assert!(session.answers.audience.is_none());
    }

    #[tokio::test]
    async fn flooding_actor_gets_the_excessive_use_notice() {
        let (proc, dispatcher, sessions) = processor();

        proc.handle_event(join("U1")).await.unwrap();
        proc.handle_event(select("U1", ActionId::GoalSelected, "meetings"))
            .await
            .unwrap();

        // Join consumed one admit; nine more messages fill the window.
        for i in 0..9 {
            proc.handle_event(text("U1", &format!("spam {i}")))
                .await
                .unwrap();
        }
        let step_before = sessions.get("U1").await.unwrap().step;

        proc.handle_event(text("U1", "one more")).await.unwrap();

        let sent = dispatcher.sent();
        let last = &sent.last().unwrap().1;
        assert!(last.text.contains("used excessively"));
        // The limited event never reached the engine.
        assert_eq!(sessions.get("U1").await.unwrap().step, step_before);
    }

    #[tokio::test]
    async fn dispatch_failure_does_not_lose_the_transition() {
        let (proc, dispatcher, sessions) = processor();
        proc.handle_event(join("U1")).await.unwrap();

        dispatcher.set_failing(true);
        let result = proc
            .handle_event(select("U1", ActionId::GoalSelected, "meetings"))
            .await;
        assert!(result.is_err());

        // State committed before the send was attempted.
        let session = sessions.get("U1").await.unwrap();
        assert_eq!(session.step, Step::Audience);
        assert_eq!(
            session.answers.goal,
            Some(crate::onboarding::model::Goal::Meetings)
        );
    }

    #[tokio::test]
    async fn logo_rejection_reprompts_through_the_dispatcher() {
        let (proc, dispatcher, sessions) = processor();
        proc.handle_event(join("U1")).await.unwrap();

        // Jump the session to the logo step directly.
        sessions
            .commit("U1", |s| {
                s.signature = Some(crate::onboarding::model::SignatureData::from_profile(
                    &s.profile,
                ));
                s.step = Step::SignatureLogo;
            })
            .await;

        proc.handle_event(InboundEvent::Message {
            actor: "U1".into(),
            text: String::new(),
            attachments: vec![Attachment {
                mime_type: "text/plain".into(),
                url: "https://files.example/notes.txt".into(),
                name: None,
            }],
        })
        .await
        .unwrap();

        assert_eq!(sessions.get("U1").await.unwrap().step, Step::SignatureLogo);
        let sent = dispatcher.sent();
        assert!(sent.last().unwrap().1.text.contains("valid image file"));
    }
}
