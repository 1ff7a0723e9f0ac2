//! Flow engine — the onboarding transition table.
//!
//! A deterministic state machine over [`Step`]. Each (step, event kind) pair
//! has at most one transition; everything else falls through to a single
//! drop path. The guard (session exists, and is at the step the handler
//! owns) is what makes duplicated button clicks and stale platform
//! callbacks harmless.

use tracing::{debug, warn};

use super::model::{Goal, NotificationPreference, OutreachTool, Session, SignatureData, Tone};
use super::prompts;
use super::step::Step;
use crate::events::{ActionId, Attachment, InboundEvent, Prompt};

/// Result of feeding one event to the engine.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Event did not match the session's current step. Dropped, session
    /// unchanged.
    Ignored,
    /// Session advanced; deliver these prompts.
    Advanced { prompts: Vec<Prompt> },
    /// Input rejected with a re-prompt; step unchanged (logo validation).
    Rejected { prompts: Vec<Prompt> },
}

impl Outcome {
    fn advance(session: &mut Session, next: Step, prompt: Prompt) -> Self {
        debug!(actor = %session.actor, from = %session.step, to = %next, "Step transition");
        session.step = next;
        Self::Advanced {
            prompts: vec![prompt],
        }
    }

    /// The prompts to dispatch, if any.
    pub fn prompts(&self) -> &[Prompt] {
        match self {
            Self::Ignored => &[],
            Self::Advanced { prompts } | Self::Rejected { prompts } => prompts,
        }
    }
}

/// The transition table and guard logic.
///
/// Stateless: reads and mutates the session it is handed, produces prompt
/// descriptors, performs no I/O. Callers run `handle` inside the store's
/// per-actor commit so the read-decide-write is serialized.
pub struct FlowEngine;

impl FlowEngine {
    pub fn new() -> Self {
        Self
    }

    /// Prompts for a freshly created session (the join greeting).
    pub fn welcome(&self) -> Vec<Prompt> {
        vec![prompts::welcome()]
    }

    /// Apply one event to a session.
    pub fn handle(&self, session: &mut Session, event: &InboundEvent) -> Outcome {
        match event {
            // Joins create sessions upstream; an engine-level join is a no-op.
            InboundEvent::UserJoined { .. } => Outcome::Ignored,
            InboundEvent::Message {
                text, attachments, ..
            } => self.handle_message(session, text.trim(), attachments),
            InboundEvent::Selection { action, value, .. } => {
                self.handle_selection(session, *action, value)
            }
        }
    }

    /// Free-text and attachment transitions.
    fn handle_message(
        &self,
        session: &mut Session,
        text: &str,
        attachments: &[Attachment],
    ) -> Outcome {
        match session.step {
            Step::GoalOtherInput => {
                session.answers.goal = Some(Goal::parse(text));
                Outcome::advance(session, Step::Audience, prompts::audience())
            }
            Step::Audience => {
                session.answers.audience = Some(text.to_string());
                Outcome::advance(session, Step::Locations, prompts::locations())
            }
            Step::Locations => {
                session.answers.locations = Some(text.to_string());
                Outcome::advance(session, Step::Offer, prompts::offer())
            }
            Step::Offer => {
                session.answers.offer = Some(text.to_string());
                Outcome::advance(session, Step::OutreachNow, prompts::outreach_now())
            }
            Step::OtherTool => {
                session.answers.tool = Some(OutreachTool::parse(text));
                Outcome::advance(
                    session,
                    Step::CrmIntegrationQuestion,
                    prompts::crm_question(),
                )
            }
            Step::ToneOtherInput => {
                let tone = Tone::parse(text);
                let preview = prompts::tone_preview(&tone, &session.actor);
                session.answers.tone = Some(tone);
                Outcome::advance(session, Step::TonePreview, preview)
            }
            Step::SignatureName => self.with_signature(session, |sig| {
                if !text.eq_ignore_ascii_case("default") {
                    sig.full_name = text.to_string();
                }
                let prompt = prompts::signature_email(&sig.email);
                (Step::SignatureEmail, prompt)
            }),
            Step::SignatureNameOtherInput => self.with_signature(session, |sig| {
                sig.full_name = text.to_string();
                let prompt = prompts::signature_email(&sig.email);
                (Step::SignatureEmail, prompt)
            }),
            Step::SignatureEmail => self.with_signature(session, |sig| {
                if !text.eq_ignore_ascii_case("default") {
                    sig.email = text.to_string();
                }
                (Step::SignatureCompany, prompts::signature_company())
            }),
            Step::SignatureEmailOtherInput => self.with_signature(session, |sig| {
                sig.email = text.to_string();
                (Step::SignatureCompany, prompts::signature_company())
            }),
            Step::SignatureCompany => self.with_signature(session, |sig| {
                sig.company = Some(text.to_string());
                (Step::SignatureTitle, prompts::signature_title())
            }),
            Step::SignatureTitle => self.with_signature(session, |sig| {
                sig.title = Some(text.to_string());
                (Step::SignatureWebsite, prompts::signature_website())
            }),
            Step::SignatureWebsite => self.with_signature(session, |sig| {
                sig.website = Some(text.to_string());
                (Step::SignaturePhone, prompts::signature_phone())
            }),
            Step::SignaturePhone => self.with_signature(session, |sig| {
                sig.phone = Some(text.to_string());
                (Step::SignatureLinkedin, prompts::signature_social())
            }),
            Step::SignatureLinkedin => self.with_signature(session, |sig| {
                sig.social = Some(text.to_string());
                (Step::SignatureLogo, prompts::signature_logo())
            }),
            Step::SignatureLogo => self.handle_logo(session, attachments),
            _ => self.drop_event(session, "message"),
        }
    }

    /// Logo upload: the only attachment transition. Non-image or missing
    /// attachments re-prompt without advancing.
    fn handle_logo(&self, session: &mut Session, attachments: &[Attachment]) -> Outcome {
        let image = attachments.first().filter(|a| a.is_image());
        let Some(image) = image else {
            debug!(actor = %session.actor, "Logo upload rejected, re-prompting");
            return Outcome::Rejected {
                prompts: vec![prompts::logo_rejected()],
            };
        };

        let url = image.url.clone();
        self.with_signature(session, |sig| {
            sig.logo = Some(url);
            let prompt = prompts::signature_preview(sig);
            (Step::SignaturePreview, prompt)
        })
    }

    /// Selection transitions. The guard is a single comparison against the
    /// step that owns the action id.
    fn handle_selection(&self, session: &mut Session, action: ActionId, value: &str) -> Outcome {
        if session.step != Step::for_action(action) {
            return self.drop_event(session, action.as_str());
        }

        match action {
            ActionId::GoalSelected => {
                if value == "other" {
                    Outcome::advance(session, Step::GoalOtherInput, prompts::goal_other_input())
                } else {
                    session.answers.goal = Some(Goal::parse(value));
                    Outcome::advance(session, Step::Audience, prompts::audience())
                }
            }
            ActionId::OutreachYes => {
                Outcome::advance(session, Step::SelectTool, prompts::select_tool())
            }
            ActionId::OutreachNo => {
                session.answers.outreach = Some(false);
                Outcome::advance(session, Step::Tone, prompts::tone())
            }
            ActionId::ToolSelected => {
                if value == "other" {
                    return Outcome::advance(session, Step::OtherTool, prompts::other_tool_input());
                }
                let tool = OutreachTool::parse(value);
                let crm_capable = tool.is_crm_capable();
                session.answers.tool = Some(tool);
                if crm_capable {
                    Outcome::advance(
                        session,
                        Step::CrmIntegrationQuestion,
                        prompts::crm_question(),
                    )
                } else {
                    Outcome::advance(session, Step::Tone, prompts::tone())
                }
            }
            ActionId::CrmYes | ActionId::CrmNo => {
                session.answers.crm_sync = Some(action == ActionId::CrmYes);
                Outcome::advance(session, Step::Tone, prompts::tone())
            }
            ActionId::SelectTone => {
                if value == "Other" {
                    Outcome::advance(session, Step::ToneOtherInput, prompts::tone_other_input())
                } else {
                    let tone = Tone::parse(value);
                    let preview = prompts::tone_preview(&tone, &session.actor);
                    session.answers.tone = Some(tone);
                    Outcome::advance(session, Step::TonePreview, preview)
                }
            }
            ActionId::ChangeTone => Outcome::advance(session, Step::Tone, prompts::tone_reselect()),
            ActionId::ToneOk => {
                // Entering the signature sub-flow: seed from platform profile.
                session.signature = Some(SignatureData::from_profile(&session.profile));
                Outcome::advance(session, Step::SignatureName, prompts::signature_name())
            }
            ActionId::SignatureNameDefault => self.with_signature(session, |sig| {
                let prompt = prompts::signature_email(&sig.email);
                (Step::SignatureEmail, prompt)
            }),
            ActionId::SignatureNameOther => Outcome::advance(
                session,
                Step::SignatureNameOtherInput,
                prompts::signature_name_input(),
            ),
            ActionId::SignatureEmailDefault => {
                Outcome::advance(session, Step::SignatureCompany, prompts::signature_company())
            }
            ActionId::SignatureEmailOther => Outcome::advance(
                session,
                Step::SignatureEmailOtherInput,
                prompts::signature_email_input(),
            ),
            ActionId::SignaturePhoneSkip => {
                Outcome::advance(session, Step::SignatureLinkedin, prompts::signature_social())
            }
            ActionId::SignatureSocialSkip => {
                Outcome::advance(session, Step::SignatureLogo, prompts::signature_logo())
            }
            ActionId::SignatureOk => {
                Outcome::advance(session, Step::ReviewSequence, prompts::review_sequence())
            }
            ActionId::SignatureEdit => {
                Outcome::advance(session, Step::SignatureName, prompts::signature_name_edit())
            }
            ActionId::ReviewYes | ActionId::ReviewNo => {
                session.answers.review = Some(action == ActionId::ReviewYes);
                Outcome::advance(session, Step::Notifications, prompts::notifications())
            }
            ActionId::NotifySelected => {
                // The option set is closed; an unknown value is treated like
                // a step mismatch rather than an error.
                let Some(preference) = NotificationPreference::parse(value) else {
                    return self.drop_event(session, action.as_str());
                };
                session.answers.notification = Some(preference);
                let summary = prompts::launch_confirmation(&session.answers);
                Outcome::advance(session, Step::LaunchConfirmation, summary)
            }
            ActionId::BookCall => {
                let prompt = prompts::book_call_done(&session.actor);
                Outcome::advance(session, Step::Complete, prompt)
            }
            ActionId::LaunchNow => {
                let prompt = prompts::launch_now_done(&session.actor);
                Outcome::advance(session, Step::Complete, prompt)
            }
        }
    }

    /// Run a transition that needs the signature sub-record.
    ///
    /// The record is created when the tone preview is accepted, so it must
    /// exist by the time any signature step is reachable. If it does not,
    /// something upstream violated the flow; drop the event instead of
    /// crashing.
    fn with_signature<F>(&self, session: &mut Session, f: F) -> Outcome
    where
        F: FnOnce(&mut SignatureData) -> (Step, Prompt),
    {
        let actor = session.actor.clone();
        let current = session.step;
        match session.signature.as_mut() {
            Some(sig) => {
                let (next, prompt) = f(sig);
                Outcome::advance(session, next, prompt)
            }
            None => {
                warn!(actor = %actor, step = %current, "Signature step without signature record, dropping event");
                Outcome::Ignored
            }
        }
    }

    fn drop_event(&self, session: &Session, kind: &str) -> Outcome {
        debug!(actor = %session.actor, step = %session.step, event = kind, "Event does not match step, dropped");
        Outcome::Ignored
    }
}

impl Default for FlowEngine {
    fn default() -> Self {
        Self::new()
    }
}
