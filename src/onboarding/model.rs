//! Session and answer data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::step::Step;

/// Platform profile defaults for an actor (display name, email).
///
/// Captured when the session is created and used to seed the signature
/// sub-record once the user accepts their tone preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorProfile {
    pub display_name: String,
    pub email: String,
}

/// The user's outreach goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Goal {
    Meetings,
    Calls,
    Leads,
    Referrals,
    Custom(String),
}

impl Goal {
    /// Parse a selection value or free-text goal. Total: unknown values
    /// become `Custom`.
    pub fn parse(s: &str) -> Self {
        match s {
            "meetings" => Self::Meetings,
            "calls" => Self::Calls,
            "leads" => Self::Leads,
            "referrals" => Self::Referrals,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for Goal {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Goal> for String {
    fn from(g: Goal) -> String {
        match g {
            Goal::Custom(s) => s,
            named => named.to_string(),
        }
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Meetings => write!(f, "meetings"),
            Self::Calls => write!(f, "calls"),
            Self::Leads => write!(f, "leads"),
            Self::Referrals => write!(f, "referrals"),
            Self::Custom(s) => write!(f, "{s}"),
        }
    }
}

/// The tool the user currently does outreach with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum OutreachTool {
    Gmail,
    Instantly,
    Hubspot,
    Salesforce,
    Salesloft,
    Custom(String),
}

impl OutreachTool {
    /// Parse a selection value or free-text tool name. Total: unknown values
    /// become `Custom`.
    pub fn parse(s: &str) -> Self {
        match s {
            "gmail" => Self::Gmail,
            "instantly" => Self::Instantly,
            "hubspot" => Self::Hubspot,
            "salesforce" => Self::Salesforce,
            "salesloft" => Self::Salesloft,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Tools with a CRM we can sync against. These route the flow through the
    /// CRM integration question.
    pub fn is_crm_capable(&self) -> bool {
        matches!(self, Self::Hubspot | Self::Salesforce)
    }
}

impl From<String> for OutreachTool {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<OutreachTool> for String {
    fn from(t: OutreachTool) -> String {
        match t {
            OutreachTool::Custom(s) => s,
            named => named.to_string(),
        }
    }
}

impl std::fmt::Display for OutreachTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gmail => write!(f, "gmail"),
            Self::Instantly => write!(f, "instantly"),
            Self::Hubspot => write!(f, "hubspot"),
            Self::Salesforce => write!(f, "salesforce"),
            Self::Salesloft => write!(f, "salesloft"),
            Self::Custom(s) => write!(f, "{s}"),
        }
    }
}

/// Brand voice for outgoing campaign messages.
///
/// A closed catalog plus a `Custom` arm for user-typed tones. The intro line
/// lookup is a total function: every custom or unrecognized tone gets the
/// same fixed fallback line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Tone {
    Friendly,
    Formal,
    Confident,
    Curious,
    Witty,
    Direct,
    Playful,
    Authoritative,
    Custom(String),
}

/// Fallback intro line, used for every tone outside the named catalog.
const FALLBACK_INTRO: &str = "Hey <@{actor}>! I know things get busy, so I’ll keep this short — here’s how we can help you book more appointments.";

impl Tone {
    /// Parse a tone name. Total: names outside the catalog become `Custom`.
    pub fn parse(s: &str) -> Self {
        match s {
            "Friendly" => Self::Friendly,
            "Formal" => Self::Formal,
            "Confident" => Self::Confident,
            "Curious" => Self::Curious,
            "Witty" => Self::Witty,
            "Direct" => Self::Direct,
            "Playful" => Self::Playful,
            "Authoritative" => Self::Authoritative,
            other => Self::Custom(other.to_string()),
        }
    }

    /// The display name of this tone (custom tones display as typed).
    pub fn name(&self) -> &str {
        match self {
            Self::Friendly => "Friendly",
            Self::Formal => "Formal",
            Self::Confident => "Confident",
            Self::Curious => "Curious",
            Self::Witty => "Witty",
            Self::Direct => "Direct",
            Self::Playful => "Playful",
            Self::Authoritative => "Authoritative",
            Self::Custom(s) => s,
        }
    }

    /// Sample intro line for this tone, mentioning the actor.
    ///
    /// Total over all tones; the `Custom` arm is the fixed fallback line.
    pub fn intro_line(&self, actor: &str) -> String {
        let template = match self {
            Self::Friendly => "Hey <@{actor}>! 😊 Hope you're having a great day! I’ll keep this short — here’s how we can help you book more appointments.",
            Self::Formal => "Hello <@{actor}>. I hope this message finds you well. I would like to briefly share how we can assist you in driving more appointments.",
            Self::Confident => "Hi <@{actor}>, I know we can bring real value to your outreach — here’s how we help you book more appointments, fast.",
            Self::Curious => "Hey <@{actor}>, ever wonder how companies like yours boost meetings effortlessly? Let me share how we do it.",
            Self::Witty => "Yo <@{actor}> — not here to waste time. Just a clever way to book more appointments with style 😉.",
            Self::Direct => "Hi <@{actor}>, here’s exactly how we’ll help you book more appointments. Straightforward. No fluff.",
            Self::Playful => "Hey <@{actor}>! 🎯 Let’s play the \"Book More Appointments\" game. We’ve got just the cheat code you need.",
            Self::Authoritative => "<@{actor}>, our system has helped hundreds streamline appointment booking. You’re next.",
            Self::Custom(_) => FALLBACK_INTRO,
        };
        template.replace("{actor}", actor)
    }
}

impl From<String> for Tone {
    fn from(s: String) -> Self {
        Self::parse(&s)
    }
}

impl From<Tone> for String {
    fn from(t: Tone) -> String {
        match t {
            Tone::Custom(s) => s,
            named => named.name().to_string(),
        }
    }
}

impl std::fmt::Display for Tone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// When the user wants to be pinged during the campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPreference {
    Meeting,
    Reply,
    Call,
    Referral,
    Question,
    Sheet,
    Quiet,
}

impl NotificationPreference {
    /// Parse a selection value. The option set is closed, so an unknown
    /// value returns `None` and the event is dropped.
    pub fn parse(s: &str) -> Option<Self> {
        let pref = match s {
            "meeting" => Self::Meeting,
            "reply" => Self::Reply,
            "call" => Self::Call,
            "referral" => Self::Referral,
            "question" => Self::Question,
            "sheet" => Self::Sheet,
            "quiet" => Self::Quiet,
            _ => return None,
        };
        Some(pref)
    }
}

/// Answers collected step by step.
///
/// Each field is written exactly once, by the step that owns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Answers {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outreach: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<OutreachTool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crm_sync: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification: Option<NotificationPreference>,
}

/// Email signature fields, populated during the signature sub-flow.
///
/// Name and email seed from the actor's platform profile; phone, social link
/// and logo are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignatureData {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub social: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl SignatureData {
    /// Seed a signature from the actor's platform profile.
    pub fn from_profile(profile: &ActorProfile) -> Self {
        Self {
            full_name: profile.display_name.clone(),
            email: profile.email.clone(),
            ..Default::default()
        }
    }
}

/// One actor's onboarding session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Platform user id.
    pub actor: String,
    /// Current position in the flow.
    pub step: Step,
    /// Answers accumulated so far.
    pub answers: Answers,
    /// Signature sub-record; present only after the tone preview is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureData>,
    /// Platform profile defaults, captured at session creation.
    pub profile: ActorProfile,
    /// Updated on every accepted event; drives the inactivity sweep.
    pub last_activity_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session at the first step.
    pub fn new(actor: impl Into<String>, profile: ActorProfile, now: DateTime<Utc>) -> Self {
        Self {
            actor: actor.into(),
            step: Step::Goals,
            answers: Answers::default(),
            signature: None,
            profile,
            last_activity_at: now,
        }
    }

    /// Record activity.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity_at = now;
    }

    /// Whether this session has been idle longer than `timeout`.
    pub fn is_idle(&self, now: DateTime<Utc>, timeout: chrono::Duration) -> bool {
        now - self.last_activity_at > timeout
    }
}
