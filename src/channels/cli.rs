//! CLI channel — stdin/stdout REPL for local testing.
//!
//! Simulates platform events so the whole flow can be exercised without a
//! workspace: `/join` starts onboarding, `/select <action> <value>` presses a
//! button or picks an option, `/upload <mime> <url>` attaches a file, and
//! anything else is a free-text message.

use async_trait::async_trait;
use futures::stream;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::channels::{Dispatcher, EventSource, EventStream};
use crate::error::ChannelError;
use crate::events::{ActionId, Attachment, InboundEvent, Interaction, Prompt};

/// Actor id used for all locally generated events.
const LOCAL_ACTOR: &str = "local-user";

/// A simple CLI channel that reads events from stdin and prints prompts.
pub struct CliChannel;

impl CliChannel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one REPL line into an event. `None` for empty or malformed input.
fn parse_line(line: &str) -> Option<InboundEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if line == "/join" {
        return Some(InboundEvent::UserJoined {
            actor: LOCAL_ACTOR.to_string(),
        });
    }

    if let Some(rest) = line.strip_prefix("/select ") {
        let mut parts = rest.splitn(2, ' ');
        let action = parts.next().and_then(ActionId::parse)?;
        let value = parts.next().unwrap_or_default().trim().to_string();
        return Some(InboundEvent::Selection {
            actor: LOCAL_ACTOR.to_string(),
            action,
            value,
        });
    }

    if let Some(rest) = line.strip_prefix("/upload ") {
        let mut parts = rest.splitn(2, ' ');
        let mime_type = parts.next()?.to_string();
        let url = parts.next().unwrap_or("file://local").trim().to_string();
        return Some(InboundEvent::Message {
            actor: LOCAL_ACTOR.to_string(),
            text: String::new(),
            attachments: vec![Attachment {
                mime_type,
                url,
                name: None,
            }],
        });
    }

    Some(InboundEvent::Message {
        actor: LOCAL_ACTOR.to_string(),
        text: line.to_string(),
        attachments: vec![],
    })
}

#[async_trait]
impl EventSource for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(&self) -> Result<EventStream, ChannelError> {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            eprint!("> ");

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        match parse_line(&line) {
                            Some(event) => {
                                if tx.send(event).is_err() {
                                    break;
                                }
                            }
                            None => eprint!("> "),
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });

        Ok(Box::pin(stream))
    }
}

#[async_trait]
impl Dispatcher for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn send(&self, actor: &str, prompt: &Prompt) -> Result<(), ChannelError> {
        println!("\n[to {actor}]\n{}", prompt.text);

        match &prompt.interaction {
            Some(Interaction::Select {
                action, options, ..
            }) => {
                for choice in options {
                    println!("  {} → /select {} {}", choice.label, action, choice.value);
                }
            }
            Some(Interaction::Buttons { buttons }) => {
                for button in buttons {
                    println!(
                        "  [{}] → /select {} {}",
                        button.label, button.action, button.value
                    );
                }
            }
            None => {}
        }

        println!();
        eprint!("> ");
        Ok(())
    }
}
