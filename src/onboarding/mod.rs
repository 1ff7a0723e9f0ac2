//! Onboarding system — the conversational campaign-setup flow.
//!
//! A new user is walked through a fixed sequence of questions (goal,
//! audience, locations, offer, tooling, tone, signature, launch) driven by
//! platform events. The per-actor session tracks the current step; the flow
//! engine owns the transition table; the rate limiter and inactivity sweep
//! protect the process from floods and abandoned sessions.

pub mod engine;
pub mod limiter;
pub mod model;
pub mod processor;
pub mod prompts;
pub mod step;
pub mod store;

pub use engine::{FlowEngine, Outcome};
pub use limiter::RateLimiter;
pub use model::{
    ActorProfile, Answers, Goal, NotificationPreference, OutreachTool, Session, SignatureData,
    Tone,
};
pub use processor::OnboardingProcessor;
pub use step::Step;
pub use store::{spawn_sweep_task, SessionStore};
