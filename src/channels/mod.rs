//! Channel abstraction for event I/O.
//!
//! The onboarding core consumes [`InboundEvent`]s and emits [`Prompt`]s; the
//! traits here are the only surface a platform integration implements.

pub mod cli;
pub mod slack;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;
use crate::events::{InboundEvent, Prompt};
use crate::onboarding::model::ActorProfile;

pub use cli::CliChannel;
pub use slack::{SlackChannel, SlackConfig};

/// Stream of inbound events produced by a channel.
pub type EventStream = Pin<Box<dyn Stream<Item = InboundEvent> + Send>>;

/// Source of inbound platform events.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Channel name (e.g. "slack", "cli").
    fn name(&self) -> &str;

    /// Start the channel and return its event stream.
    async fn start(&self) -> Result<EventStream, ChannelError>;
}

/// Platform-specific prompt sender.
///
/// Receives abstract descriptors; rendering (Block Kit, plain text, terminal
/// output) is entirely the dispatcher's business.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Channel name, used in error reporting.
    fn name(&self) -> &str;

    /// Deliver one prompt to one actor.
    async fn send(&self, actor: &str, prompt: &Prompt) -> Result<(), ChannelError>;
}

/// Lookup of an actor's platform profile (display name, email).
///
/// Used once per session, at creation, to seed signature defaults.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch(&self, actor: &str) -> Result<ActorProfile, ChannelError>;
}

/// Profile source for platforms without profile data. Returns empty defaults,
/// so signature name/email start blank and the user types them in.
pub struct NoProfile;

#[async_trait]
impl ProfileSource for NoProfile {
    async fn fetch(&self, _actor: &str) -> Result<ActorProfile, ChannelError> {
        Ok(ActorProfile::default())
    }
}
