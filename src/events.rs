//! Shared event and prompt types.
//!
//! Channel adapters convert their native payloads into `InboundEvent` and
//! render `Prompt` back out. The onboarding core never sees a platform wire
//! format.

use serde::{Deserialize, Serialize};

// ── Inbound events ──────────────────────────────────────────────────

/// Unified inbound event from any channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A user joined the workspace — triggers onboarding.
    UserJoined { actor: String },
    /// A free-text direct message, possibly with file attachments.
    Message {
        actor: String,
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        attachments: Vec<Attachment>,
    },
    /// The user picked an option or pressed a button in a prompt.
    Selection {
        actor: String,
        action: ActionId,
        value: String,
    },
}

impl InboundEvent {
    /// The actor this event belongs to.
    pub fn actor(&self) -> &str {
        match self {
            Self::UserJoined { actor }
            | Self::Message { actor, .. }
            | Self::Selection { actor, .. } => actor,
        }
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UserJoined { .. } => "user_joined",
            Self::Message { .. } => "message",
            Self::Selection { .. } => "selection",
        }
    }
}

/// A file attached to an inbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    /// MIME type as reported by the platform (e.g. "image/png").
    pub mime_type: String,
    /// Platform URL of the uploaded file.
    pub url: String,
    /// Original file name, if the platform provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Attachment {
    /// Whether this attachment is an image (accepted for the logo step).
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Interactive action identifiers.
///
/// Each id maps to exactly one step's selection handler; an id the flow does
/// not recognize never reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionId {
    GoalSelected,
    OutreachYes,
    OutreachNo,
    ToolSelected,
    CrmYes,
    CrmNo,
    SelectTone,
    ChangeTone,
    ToneOk,
    SignatureNameDefault,
    SignatureNameOther,
    SignatureEmailDefault,
    SignatureEmailOther,
    SignaturePhoneSkip,
    SignatureSocialSkip,
    SignatureOk,
    SignatureEdit,
    ReviewYes,
    ReviewNo,
    NotifySelected,
    BookCall,
    LaunchNow,
}

impl ActionId {
    /// The wire name of this action (what the platform echoes back).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoalSelected => "goal_selected",
            Self::OutreachYes => "outreach_yes",
            Self::OutreachNo => "outreach_no",
            Self::ToolSelected => "tool_selected",
            Self::CrmYes => "crm_yes",
            Self::CrmNo => "crm_no",
            Self::SelectTone => "select_tone",
            Self::ChangeTone => "change_tone",
            Self::ToneOk => "tone_ok",
            Self::SignatureNameDefault => "signature_name_default",
            Self::SignatureNameOther => "signature_name_other",
            Self::SignatureEmailDefault => "signature_email_default",
            Self::SignatureEmailOther => "signature_email_other",
            Self::SignaturePhoneSkip => "signature_phone_skip",
            Self::SignatureSocialSkip => "signature_social_skip",
            Self::SignatureOk => "signature_ok",
            Self::SignatureEdit => "signature_edit",
            Self::ReviewYes => "review_yes",
            Self::ReviewNo => "review_no",
            Self::NotifySelected => "notify_selected",
            Self::BookCall => "book_call",
            Self::LaunchNow => "launch_now",
        }
    }

    /// Parse a wire action id. Unknown ids return `None` and the event is
    /// dropped upstream.
    pub fn parse(s: &str) -> Option<Self> {
        let id = match s {
            "goal_selected" => Self::GoalSelected,
            "outreach_yes" => Self::OutreachYes,
            "outreach_no" => Self::OutreachNo,
            "tool_selected" => Self::ToolSelected,
            "crm_yes" => Self::CrmYes,
            "crm_no" => Self::CrmNo,
            "select_tone" => Self::SelectTone,
            "change_tone" => Self::ChangeTone,
            "tone_ok" => Self::ToneOk,
            "signature_name_default" => Self::SignatureNameDefault,
            "signature_name_other" => Self::SignatureNameOther,
            "signature_email_default" => Self::SignatureEmailDefault,
            "signature_email_other" => Self::SignatureEmailOther,
            "signature_phone_skip" => Self::SignaturePhoneSkip,
            "signature_social_skip" => Self::SignatureSocialSkip,
            "signature_ok" => Self::SignatureOk,
            "signature_edit" => Self::SignatureEdit,
            "review_yes" => Self::ReviewYes,
            "review_no" => Self::ReviewNo,
            "notify_selected" => Self::NotifySelected,
            "book_call" => Self::BookCall,
            "launch_now" => Self::LaunchNow,
            _ => return None,
        };
        Some(id)
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Outbound prompts ────────────────────────────────────────────────

/// Abstract outgoing message descriptor.
///
/// The core only constructs these; a `Dispatcher` turns them into platform
/// messages (Block Kit, plain text, terminal output).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    /// Message body (platform mrkdwn allowed).
    pub text: String,
    /// Optional interactive element attached to the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction: Option<Interaction>,
}

impl Prompt {
    /// A plain text prompt with no interactive element.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            interaction: None,
        }
    }

    /// A prompt with a static-select dropdown.
    pub fn select(
        text: impl Into<String>,
        action: ActionId,
        placeholder: impl Into<String>,
        options: Vec<Choice>,
    ) -> Self {
        Self {
            text: text.into(),
            interaction: Some(Interaction::Select {
                action,
                placeholder: placeholder.into(),
                options,
            }),
        }
    }

    /// A prompt with a row of buttons.
    pub fn buttons(text: impl Into<String>, buttons: Vec<Button>) -> Self {
        Self {
            text: text.into(),
            interaction: Some(Interaction::Buttons { buttons }),
        }
    }
}

/// Interactive element attached to a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interaction {
    /// A single static-select dropdown.
    Select {
        action: ActionId,
        placeholder: String,
        options: Vec<Choice>,
    },
    /// A row of buttons, each with its own action id.
    Buttons { buttons: Vec<Button> },
}

/// One option in a static select.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    pub label: String,
    pub value: String,
}

impl Choice {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One button in a button row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Button {
    pub action: ActionId,
    pub label: String,
    pub value: String,
}

impl Button {
    pub fn new(action: ActionId, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            action,
            label: label.into(),
            value: value.into(),
        }
    }
}
