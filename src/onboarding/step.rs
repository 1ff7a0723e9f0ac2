//! Onboarding step machine — tracks where in the flow a user is.

use serde::{Deserialize, Serialize};

use crate::events::ActionId;

/// The steps of the onboarding conversation.
///
/// This is a closed enumeration: every session is always at exactly one of
/// these positions, and the flow engine defines at most one transition per
/// (step, event kind) pair. `Complete` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Goals,
    GoalOtherInput,
    Audience,
    Locations,
    Offer,
    OutreachNow,
    SelectTool,
    OtherTool,
    CrmIntegrationQuestion,
    Tone,
    ToneOtherInput,
    TonePreview,
    SignatureName,
    SignatureNameOtherInput,
    SignatureEmail,
    SignatureEmailOtherInput,
    SignatureCompany,
    SignatureTitle,
    SignatureWebsite,
    SignaturePhone,
    SignatureLinkedin,
    SignatureLogo,
    SignaturePreview,
    ReviewSequence,
    Notifications,
    LaunchConfirmation,
    Complete,
}

impl Step {
    /// Whether this step is terminal (onboarding is done).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Whether this step consumes free-text messages.
    pub fn accepts_text(&self) -> bool {
        matches!(
            self,
            Self::GoalOtherInput
                | Self::Audience
                | Self::Locations
                | Self::Offer
                | Self::OtherTool
                | Self::ToneOtherInput
                | Self::SignatureName
                | Self::SignatureNameOtherInput
                | Self::SignatureEmail
                | Self::SignatureEmailOtherInput
                | Self::SignatureCompany
                | Self::SignatureTitle
                | Self::SignatureWebsite
                | Self::SignaturePhone
                | Self::SignatureLinkedin
        )
    }

    /// Whether this step consumes file attachments.
    pub fn accepts_attachment(&self) -> bool {
        matches!(self, Self::SignatureLogo)
    }

    /// The step whose selection handler owns an action id.
    ///
    /// Each interactive action belongs to exactly one step; a selection event
    /// arriving while the session is at any other step is dropped by the
    /// guard. This mapping is the single source of that guard.
    pub fn for_action(action: ActionId) -> Step {
        match action {
            ActionId::GoalSelected => Self::Goals,
            ActionId::OutreachYes | ActionId::OutreachNo => Self::OutreachNow,
            ActionId::ToolSelected => Self::SelectTool,
            ActionId::CrmYes | ActionId::CrmNo => Self::CrmIntegrationQuestion,
            ActionId::SelectTone => Self::Tone,
            ActionId::ChangeTone | ActionId::ToneOk => Self::TonePreview,
            ActionId::SignatureNameDefault | ActionId::SignatureNameOther => Self::SignatureName,
            ActionId::SignatureEmailDefault | ActionId::SignatureEmailOther => Self::SignatureEmail,
            ActionId::SignaturePhoneSkip => Self::SignaturePhone,
            ActionId::SignatureSocialSkip => Self::SignatureLinkedin,
            ActionId::SignatureOk | ActionId::SignatureEdit => Self::SignaturePreview,
            ActionId::ReviewYes | ActionId::ReviewNo => Self::ReviewSequence,
            ActionId::NotifySelected => Self::Notifications,
            ActionId::BookCall | ActionId::LaunchNow => Self::LaunchConfirmation,
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Goals => "goals",
            Self::GoalOtherInput => "goal_other_input",
            Self::Audience => "audience",
            Self::Locations => "locations",
            Self::Offer => "offer",
            Self::OutreachNow => "outreach_now",
            Self::SelectTool => "select_tool",
            Self::OtherTool => "other_tool",
            Self::CrmIntegrationQuestion => "crm_integration_question",
            Self::Tone => "tone",
            Self::ToneOtherInput => "tone_other_input",
            Self::TonePreview => "tone_preview",
            Self::SignatureName => "signature_name",
            Self::SignatureNameOtherInput => "signature_name_other_input",
            Self::SignatureEmail => "signature_email",
            Self::SignatureEmailOtherInput => "signature_email_other_input",
            Self::SignatureCompany => "signature_company",
            Self::SignatureTitle => "signature_title",
            Self::SignatureWebsite => "signature_website",
            Self::SignaturePhone => "signature_phone",
            Self::SignatureLinkedin => "signature_linkedin",
            Self::SignatureLogo => "signature_logo",
            Self::SignaturePreview => "signature_preview",
            Self::ReviewSequence => "review_sequence",
            Self::Notifications => "notifications",
            Self::LaunchConfirmation => "launch_confirmation",
            Self::Complete => "complete",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STEPS: [Step; 27] = [
        Step::Goals,
        Step::GoalOtherInput,
        Step::Audience,
        Step::Locations,
        Step::Offer,
        Step::OutreachNow,
        Step::SelectTool,
        Step::OtherTool,
        Step::CrmIntegrationQuestion,
        Step::Tone,
        Step::ToneOtherInput,
        Step::TonePreview,
        Step::SignatureName,
        Step::SignatureNameOtherInput,
        Step::SignatureEmail,
        Step::SignatureEmailOtherInput,
        Step::SignatureCompany,
        Step::SignatureTitle,
        Step::SignatureWebsite,
        Step::SignaturePhone,
        Step::SignatureLinkedin,
        Step::SignatureLogo,
        Step::SignaturePreview,
        Step::ReviewSequence,
        Step::Notifications,
        Step::LaunchConfirmation,
        Step::Complete,
    ];

    #[test]
    fn display_matches_serde() {
        for step in ALL_STEPS {
            let display = format!("{step}");
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(
                format!("\"{display}\""),
                json,
                "Display and serde should match for {step:?}"
            );
        }
    }

    #[test]
    fn only_complete_is_terminal() {
        for step in ALL_STEPS {
            assert_eq!(step.is_terminal(), step == Step::Complete);
        }
    }

    #[test]
    fn terminal_step_consumes_nothing() {
        assert!(!Step::Complete.accepts_text());
        assert!(!Step::Complete.accepts_attachment());
    }

    #[test]
    fn logo_is_the_only_attachment_step() {
        for step in ALL_STEPS {
            assert_eq!(step.accepts_attachment(), step == Step::SignatureLogo);
        }
    }

    #[test]
    fn every_action_maps_to_a_non_terminal_step() {
        use crate::events::ActionId::*;
        let actions = [
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
        ];
        for action in actions {
            assert!(!Step::for_action(action).is_terminal());
        }
    }
}
