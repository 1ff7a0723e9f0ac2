//! Prompt catalog — every outgoing message the flow can produce.
//!
//! Pure construction, no I/O. The flow engine picks prompts; dispatchers
//! render them for their platform.

use super::model::{Answers, SignatureData, Tone};
use crate::events::{ActionId, Button, Choice, Prompt};

/// Welcome DM sent on join: intro line plus the step-1 goal select.
pub fn welcome() -> Prompt {
    Prompt::select(
        "👋 Hey! I’m Moha — your AI-powered growth assistant. Let’s build your outreach campaign step by step.\n\n\
         📌 *Step 1:* What’s your outreach goal?\nPlease choose one option below:",
        ActionId::GoalSelected,
        "Select an option",
        vec![
            Choice::new("📅 Book more meetings", "meetings"),
            Choice::new("📞 Get call requests", "calls"),
            Choice::new("🔁 Start warm lead pipeline", "leads"),
            Choice::new("🤝 Get referrals or partnerships", "referrals"),
            Choice::new("✍️ Other", "other"),
        ],
    )
}

pub fn goal_other_input() -> Prompt {
    Prompt::text("Please specify your outreach goal:")
}

pub fn audience() -> Prompt {
    Prompt::text(
        "✅ Got it!\n\n📌 Step 2: Who is your target audience?\nExample: Tech founders, coaches, agency owners, etc.",
    )
}

pub fn locations() -> Prompt {
    Prompt::text(
        "✅ Noted.\n\n📌 Step 3: Where should we look for leads?\n\
         Reply with cities, states, or regions. You can separate them with commas.\n\
         Example: California, New York, UK, Canada",
    )
}

pub fn offer() -> Prompt {
    Prompt::text(
        "✅ Perfect.\n\n📌 Step 4: What are you offering?\nDescribe your product or service in 1-2 lines.",
    )
}

pub fn outreach_now() -> Prompt {
    Prompt::buttons(
        "📌 *Step 5:* Are you currently using any tools to do outreach?",
        vec![
            Button::new(ActionId::OutreachYes, "Yes", "yes"),
            Button::new(ActionId::OutreachNo, "No", "no"),
        ],
    )
}

pub fn select_tool() -> Prompt {
    Prompt::select(
        "Which tool are you currently using for outreach?",
        ActionId::ToolSelected,
        "Select one",
        vec![
            Choice::new("📧 Gmail/Outlook (manual)", "gmail"),
            Choice::new("⚡ Instantly / Smartlead", "instantly"),
            Choice::new("🔗 HubSpot", "hubspot"),
            Choice::new("📊 Salesforce", "salesforce"),
            Choice::new("🎯 Salesloft", "salesloft"),
            Choice::new("✍️ Other", "other"),
        ],
    )
}

pub fn other_tool_input() -> Prompt {
    Prompt::text("Please specify the outreach tool you are using:")
}

pub fn crm_question() -> Prompt {
    Prompt::buttons(
        "*Would you like us to integrate with your CRM?*",
        vec![
            Button::new(ActionId::CrmYes, "Yes, sync with my CRM", "sync"),
            Button::new(ActionId::CrmNo, "No, use Moha’s tools", "no_sync"),
        ],
    )
}

fn tone_select(text: &str) -> Prompt {
    Prompt::select(
        text,
        ActionId::SelectTone,
        "Select one",
        vec![
            Choice::new("💬 Friendly", "Friendly"),
            Choice::new("💼 Formal", "Formal"),
            Choice::new("😎 Confident", "Confident"),
            Choice::new("🧠 Curious", "Curious"),
            Choice::new("✨ Witty", "Witty"),
            Choice::new("🎯 Direct", "Direct"),
            Choice::new("🎨 Playful", "Playful"),
            Choice::new("🧊 Authoritative", "Authoritative"),
            Choice::new("✍️ Other", "Other"),
        ],
    )
}

pub fn tone() -> Prompt {
    tone_select("*🎨 Step 6: Brand Voice*\nWhat tone should we use in your messages?")
}

pub fn tone_reselect() -> Prompt {
    tone_select("🔁 No worries! Please select a new tone:")
}

pub fn tone_other_input() -> Prompt {
    Prompt::text("Please specify the tone you want to use:")
}

/// Tone preview: sample intro line plus change/accept buttons.
pub fn tone_preview(tone: &Tone, actor: &str) -> Prompt {
    let line = tone.intro_line(actor);
    Prompt::buttons(
        format!(
            "📝 *Here’s a sample intro line based on your selected tone ({}):*\n\n\"{}\"",
            tone.name(),
            line
        ),
        vec![
            Button::new(ActionId::ChangeTone, "🔁 Change Tone", "change_tone"),
            Button::new(ActionId::ToneOk, "✅ Looks Good", "tone_ok"),
        ],
    )
}

fn signature_name_buttons() -> Vec<Button> {
    vec![
        Button::new(ActionId::SignatureNameDefault, "Default", "default_name"),
        Button::new(ActionId::SignatureNameOther, "Other", "other_name"),
    ]
}

pub fn signature_name() -> Prompt {
    Prompt::buttons(
        "✍️ Last thing — let’s build your email signature.\n\nWhat's your *Full Name*?",
        signature_name_buttons(),
    )
}

pub fn signature_name_edit() -> Prompt {
    Prompt::buttons(
        "✏️ Let’s edit your signature. What’s your *Full Name*?",
        signature_name_buttons(),
    )
}

pub fn signature_name_input() -> Prompt {
    Prompt::text("Please enter your full name:")
}

pub fn signature_email(default_email: &str) -> Prompt {
    let text = if default_email.is_empty() {
        "📧 What’s your *email*?".to_string()
    } else {
        format!("📧 What’s your *email*? (default: *{default_email}*)")
    };
    Prompt::buttons(
        text,
        vec![
            Button::new(ActionId::SignatureEmailDefault, "Default", "default_email"),
            Button::new(ActionId::SignatureEmailOther, "Other", "other_email"),
        ],
    )
}

pub fn signature_email_input() -> Prompt {
    Prompt::text("Please enter your email:")
}

pub fn signature_company() -> Prompt {
    Prompt::text("🏢 What’s your *company name*?")
}

pub fn signature_title() -> Prompt {
    Prompt::text("💼 What’s your *title*?")
}

pub fn signature_website() -> Prompt {
    Prompt::text("🌐 What’s your *website or booking link*?")
}

pub fn signature_phone() -> Prompt {
    Prompt::buttons(
        "📱 What's your *phone number*? (optional)",
        vec![Button::new(ActionId::SignaturePhoneSkip, "Skip", "skip_phone")],
    )
}

pub fn signature_social() -> Prompt {
    Prompt::buttons(
        "🔗 What's your *LinkedIn or social profile*? (optional)",
        vec![Button::new(ActionId::SignatureSocialSkip, "Skip", "skip_social")],
    )
}

pub fn signature_logo() -> Prompt {
    Prompt::text("🖼️ Upload your *logo*")
}

/// Re-prompt for the logo step when the upload is missing or not an image.
pub fn logo_rejected() -> Prompt {
    Prompt::text("⚠️ Please upload a valid image file (PNG, JPG, etc.) for your logo.")
}

/// Render the signature preview card.
pub fn signature_preview(signature: &SignatureData) -> Prompt {
    let title = signature.title.as_deref().unwrap_or("");
    let company = signature.company.as_deref().unwrap_or("");
    let website = signature.website.as_deref().unwrap_or("");
    let phone = signature.phone.as_deref().unwrap_or("");
    let social_line = signature
        .social
        .as_deref()
        .map(|s| format!("\n<{s}|Linkedin>"))
        .unwrap_or_default();

    Prompt::buttons(
        format!(
            "*🖋️ Here’s your current signature preview:*\n\
             ──────────────────────\n\
             *{}*\n{title}, {company}\n{website} | {phone}{social_line}\n\
             ──────────────────────",
            signature.full_name
        ),
        vec![
            Button::new(ActionId::SignatureOk, "✅ Looks Good", "signature_ok"),
            Button::new(ActionId::SignatureEdit, "✏️ Edit Signature", "signature_edit"),
        ],
    )
}

pub fn review_sequence() -> Prompt {
    Prompt::buttons(
        "🔹 *Step 8: Review Sequence*\nWant to review the outreach messages before we send them?",
        vec![
            Button::new(ActionId::ReviewYes, "✅ Yes, send me the draft", "review_yes"),
            Button::new(ActionId::ReviewNo, "🚀 No, just go live with my inputs", "review_no"),
        ],
    )
}

pub fn notifications() -> Prompt {
    Prompt::select(
        "🔹 *Step 9: Notifications*\nWhen should we notify you during the campaign?\nChoose any that apply:",
        ActionId::NotifySelected,
        "Select one",
        vec![
            Choice::new("🗓️ Meeting booked", "meeting"),
            Choice::new("💬 Reply with interest", "reply"),
            Choice::new("📞 Call request", "call"),
            Choice::new("📌 Referral or partnership mention", "referral"),
            Choice::new("🧾 Question/request for info", "question"),
            Choice::new("📊 Add all replies to shared Google Sheet", "sheet"),
            Choice::new("💤 Don’t notify me — just run it quietly", "quiet"),
        ],
    )
}

/// Launch summary, interpolating recorded answers with literal fallbacks for
/// any field that was never set.
pub fn launch_confirmation(answers: &Answers) -> Prompt {
    let audience = answers.audience.as_deref().unwrap_or("your leads");
    let locations = answers.locations.as_deref().unwrap_or("target locations");
    let offer = answers.offer.as_deref().unwrap_or("your value proposition");

    Prompt::buttons(
        format!(
            "🔹 *Final Step: Launch Confirmation*\n\n\
             You’re all set!\n\
             We’re about to contact *{audience}* in *{locations}* with your offer:\n\
             > “{offer}”\n\n\
             We’ll message you here as replies come in. Want to book a kickoff call?"
        ),
        vec![
            Button::new(ActionId::BookCall, "📞 Book Quick Call", "book_call"),
            Button::new(ActionId::LaunchNow, "🚀 Launch My Campaign", "launch_now"),
        ],
    )
}

pub fn book_call_done(actor: &str) -> Prompt {
    Prompt::text(format!(
        "📅 Awesome! We’ll share a link to book a quick kickoff call with you, <@{actor}>. Looking forward to it!"
    ))
}

pub fn launch_now_done(actor: &str) -> Prompt {
    Prompt::text(format!(
        "🚀 Boom! Your campaign is launching now. We’ll notify you here as results start rolling in. Let’s crush it, <@{actor}>! 💥"
    ))
}

/// Notice sent when the rate limiter rejects an event.
pub fn rate_limited(actor: &str) -> Prompt {
    Prompt::text(format!(
        "👋 Hey <@{actor}>! You have used excessively this bot kindly for a minute."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Interaction;

    fn select_values(prompt: &Prompt) -> Vec<String> {
        match &prompt.interaction {
            Some(Interaction::Select { options, .. }) => {
                options.iter().map(|c| c.value.clone()).collect()
            }
            other => panic!("Expected a select, got {other:?}"),
        }
    }

    #[test]
    fn welcome_offers_all_goal_options() {
        let prompt = welcome();
        assert!(prompt.text.contains("Step 1"));
        assert_eq!(
            select_values(&prompt),
            ["meetings", "calls", "leads", "referrals", "other"]
        );
    }

    #[test]
    fn tool_select_includes_crm_capable_tools() {
        let values = select_values(&select_tool());
        assert!(values.contains(&"hubspot".to_string()));
        assert!(values.contains(&"salesforce".to_string()));
        assert!(values.contains(&"other".to_string()));
    }

    #[test]
    fn tone_select_offers_full_catalog_plus_other() {
        let values = select_values(&tone());
        assert_eq!(values.len(), 9);
        assert!(values.contains(&"Friendly".to_string()));
        assert!(values.contains(&"Other".to_string()));
    }

    #[test]
    fn tone_preview_includes_line_and_both_buttons() {
        let prompt = tone_preview(&Tone::Direct, "U9");
        assert!(prompt.text.contains("(Direct)"));
        assert!(prompt.text.contains("<@U9>"));
        match &prompt.interaction {
            Some(Interaction::Buttons { buttons }) => {
                assert_eq!(buttons.len(), 2);
                assert_eq!(buttons[0].action, ActionId::ChangeTone);
                assert_eq!(buttons[1].action, ActionId::ToneOk);
            }
            other => panic!("Expected buttons, got {other:?}"),
        }
    }

    #[test]
    fn signature_preview_renders_optional_fields() {
        let full = SignatureData {
            full_name: "Dana Cruz".into(),
            email: "dana@example.com".into(),
            company: Some("Acme".into()),
            title: Some("CEO".into()),
            website: Some("https://acme.io".into()),
            phone: Some("+1 555 0100".into()),
            social: Some("https://linkedin.com/in/dana".into()),
            logo: Some("https://files.example/logo.png".into()),
        };
        let prompt = signature_preview(&full);
        assert!(prompt.text.contains("*Dana Cruz*"));
        assert!(prompt.text.contains("CEO, Acme"));
        assert!(prompt.text.contains("|Linkedin>"));

        let minimal = SignatureData {
            full_name: "Dana Cruz".into(),
            email: "dana@example.com".into(),
            ..Default::default()
        };
        let prompt = signature_preview(&minimal);
        assert!(prompt.text.contains("*Dana Cruz*"));
        assert!(!prompt.text.contains("Linkedin"));
    }

    #[test]
    fn launch_summary_interpolates_answers() {
        let answers = Answers {
            audience: Some("tech founders".into()),
            locations: Some("NY, UK".into()),
            offer: Some("we sell X".into()),
            ..Default::default()
        };
        let prompt = launch_confirmation(&answers);
        assert!(prompt.text.contains("*tech founders*"));
        assert!(prompt.text.contains("*NY, UK*"));
        assert!(prompt.text.contains("we sell X"));
    }

    #[test]
    fn launch_summary_falls_back_per_field() {
        let prompt = launch_confirmation(&Answers::default());
        assert!(prompt.text.contains("your leads"));
        assert!(prompt.text.contains("target locations"));
        assert!(prompt.text.contains("your value proposition"));
    }

    #[test]
    fn rate_limited_notice_names_the_actor() {
        let prompt = rate_limited("U5");
        assert!(prompt.text.contains("<@U5>"));
        assert!(prompt.text.contains("used excessively"));
    }
}
