//! Slack channel — Events API intake plus Web API dispatch.
//!
//! Inbound: an axum endpoint receives Events API callbacks (`team_join`,
//! direct messages) and interactive block-action payloads, translates them
//! into [`InboundEvent`]s and feeds them to an mpsc-backed stream.
//!
//! Outbound: prompts are rendered to Block Kit and delivered over
//! `chat.postMessage` into a DM channel opened (and cached) per actor.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::extract::State;
use axum::routing::post;
use axum::{Form, Json, Router};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex, RwLock};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, info, warn};

use crate::channels::{Dispatcher, EventSource, EventStream, ProfileSource};
use crate::error::ChannelError;
use crate::events::{ActionId, Attachment, InboundEvent, Interaction, Prompt};
use crate::onboarding::model::ActorProfile;

/// Slack channel configuration.
#[derive(Clone)]
pub struct SlackConfig {
    /// Bot token (xoxb-...).
    pub bot_token: SecretString,
    /// Bind address for the Events API endpoint.
    pub bind_addr: String,
}

impl SlackConfig {
    /// Build from the environment. Returns `None` when `SLACK_BOT_TOKEN` is
    /// unset, in which case the Slack channel is simply not started.
    pub fn from_env() -> Option<Self> {
        let bot_token = std::env::var("SLACK_BOT_TOKEN").ok()?;
        let bind_addr =
            std::env::var("SLACK_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        Some(Self {
            bot_token: SecretString::from(bot_token),
            bind_addr,
        })
    }
}

/// Slack channel — event intake, prompt dispatch, and profile lookup.
pub struct SlackChannel {
    config: SlackConfig,
    client: reqwest::Client,
    /// Cache of actor id → DM channel id, filled by `conversations.open`.
    dm_channels: RwLock<HashMap<String, String>>,
    incoming_tx: mpsc::UnboundedSender<InboundEvent>,
    /// Receiver side of the incoming channel — consumed once in `start()`.
    incoming_rx: Mutex<Option<mpsc::UnboundedReceiver<InboundEvent>>>,
}

impl SlackChannel {
    pub fn new(config: SlackConfig) -> Self {
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
        Self {
            config,
            client: reqwest::Client::new(),
            dm_channels: RwLock::new(HashMap::new()),
            incoming_tx,
            incoming_rx: Mutex::new(Some(incoming_rx)),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("https://slack.com/api/{method}")
    }

    /// POST a Web API method and return the parsed body after checking the
    /// `ok` flag (Slack reports most failures inside a 200 response).
    async fn call_api(&self, method: &str, body: Value) -> Result<Value, ChannelError> {
        let response = self
            .client
            .post(self.api_url(method))
            .bearer_auth(self.config.bot_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChannelError::Http(format!(
                "{method} returned {}",
                response.status()
            )));
        }

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| ChannelError::Http(e.to_string()))?;

        if parsed["ok"].as_bool() != Some(true) {
            let reason = parsed["error"].as_str().unwrap_or("unknown").to_string();
            return Err(ChannelError::SendFailed {
                name: "slack".into(),
                reason: format!("{method} failed: {reason}"),
            });
        }

        Ok(parsed)
    }

    /// DM channel id for an actor, opening the conversation on first use.
    async fn dm_channel(&self, actor: &str) -> Result<String, ChannelError> {
        if let Some(channel) = self.dm_channels.read().await.get(actor) {
            return Ok(channel.clone());
        }

        let parsed = self
            .call_api("conversations.open", json!({ "users": actor }))
            .await?;
        let channel = parsed["channel"]["id"]
            .as_str()
            .ok_or_else(|| ChannelError::InvalidPayload("conversations.open: no channel id".into()))?
            .to_string();

        self.dm_channels
            .write()
            .await
            .insert(actor.to_string(), channel.clone());
        Ok(channel)
    }
}

#[async_trait]
impl EventSource for SlackChannel {
    fn name(&self) -> &str {
        "slack"
    }

    async fn start(&self) -> Result<EventStream, ChannelError> {
        let rx = self
            .incoming_rx
            .lock()
            .await
            .take()
            .ok_or_else(|| ChannelError::StartupFailed {
                name: "slack".into(),
                reason: "channel already started".into(),
            })?;

        let state = RouterState {
            incoming_tx: self.incoming_tx.clone(),
        };
        let app = Router::new()
            .route("/slack/events", post(slack_events))
            .route("/slack/interactions", post(slack_interactions))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind(&self.config.bind_addr)
            .await
            .map_err(|e| ChannelError::StartupFailed {
                name: "slack".into(),
                reason: e.to_string(),
            })?;
        info!(addr = %self.config.bind_addr, "Slack event intake listening");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}

#[async_trait]
impl Dispatcher for SlackChannel {
    fn name(&self) -> &str {
        "slack"
    }

    async fn send(&self, actor: &str, prompt: &Prompt) -> Result<(), ChannelError> {
        let channel = self.dm_channel(actor).await?;
        let body = json!({
            "channel": channel,
            "text": prompt.text,
            "blocks": render_blocks(prompt),
        });
        self.call_api("chat.postMessage", body).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileSource for SlackChannel {
    async fn fetch(&self, actor: &str) -> Result<ActorProfile, ChannelError> {
        let response = self
            .client
            .get(self.api_url("users.profile.get"))
            .bearer_auth(self.config.bot_token.expose_secret())
            .query(&[("user", actor)])
            .send()
            .await
            .map_err(|e| ChannelError::Http(e.to_string()))?;

        let parsed: Value = response
            .json()
            .await
            .map_err(|e| ChannelError::Http(e.to_string()))?;

        if parsed["ok"].as_bool() != Some(true) {
            return Err(ChannelError::ProfileLookupFailed {
                name: "slack".into(),
                reason: parsed["error"].as_str().unwrap_or("unknown").to_string(),
            });
        }

        let profile = &parsed["profile"];
        Ok(ActorProfile {
            display_name: profile["real_name"].as_str().unwrap_or_default().to_string(),
            email: profile["email"].as_str().unwrap_or_default().to_string(),
        })
    }
}

// ── HTTP handlers ───────────────────────────────────────────────────

#[derive(Clone)]
struct RouterState {
    incoming_tx: mpsc::UnboundedSender<InboundEvent>,
}

/// Events API endpoint: answers the URL-verification challenge and forwards
/// event callbacks.
async fn slack_events(State(state): State<RouterState>, Json(payload): Json<Value>) -> Json<Value> {
    match payload["type"].as_str() {
        Some("url_verification") => {
            return Json(json!({ "challenge": payload["challenge"] }));
        }
        Some("event_callback") => {
            if let Some(event) = parse_event_callback(&payload["event"]) {
                debug!(kind = event.label(), actor = event.actor(), "Slack event received");
                let _ = state.incoming_tx.send(event);
            }
        }
        other => {
            warn!(payload_type = ?other, "Unhandled Slack payload type");
        }
    }
    Json(json!({ "ok": true }))
}

#[derive(Deserialize)]
struct InteractionForm {
    payload: String,
}

/// Interactivity endpoint: block-action payloads arrive form-encoded.
async fn slack_interactions(
    State(state): State<RouterState>,
    Form(form): Form<InteractionForm>,
) -> Json<Value> {
    match serde_json::from_str::<Value>(&form.payload) {
        Ok(payload) => {
            if let Some(event) = parse_interaction(&payload) {
                debug!(actor = event.actor(), "Slack interaction received");
                let _ = state.incoming_tx.send(event);
            }
        }
        Err(e) => warn!(error = %e, "Malformed interaction payload"),
    }
    Json(json!({ "ok": true }))
}

// ── Payload translation ─────────────────────────────────────────────

/// Translate an Events API callback into an inbound event.
///
/// Bot messages, edits and non-DM chatter return `None` and are dropped.
fn parse_event_callback(event: &Value) -> Option<InboundEvent> {
    match event["type"].as_str()? {
        "team_join" => {
            let actor = event["user"]["id"]
                .as_str()
                .or_else(|| event["user"].as_str())?;
            Some(InboundEvent::UserJoined {
                actor: actor.to_string(),
            })
        }
        "message" => {
            if event["bot_id"].is_string() || event["subtype"].is_string() {
                return None;
            }
            if event["channel_type"].as_str() != Some("im") {
                return None;
            }
            let actor = event["user"].as_str()?;
            let text = event["text"].as_str().unwrap_or_default().to_string();
            let attachments = event["files"]
                .as_array()
                .map(|files| {
                    files
                        .iter()
                        .filter_map(|file| {
                            Some(Attachment {
                                mime_type: file["mimetype"].as_str()?.to_string(),
                                url: file["url_private"].as_str()?.to_string(),
                                name: file["name"].as_str().map(String::from),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            Some(InboundEvent::Message {
                actor: actor.to_string(),
                text,
                attachments,
            })
        }
        _ => None,
    }
}

/// Translate a block-actions payload into a selection event.
///
/// Unknown action ids return `None`: a selection the flow does not define
/// never reaches the engine.
fn parse_interaction(payload: &Value) -> Option<InboundEvent> {
    if payload["type"].as_str() != Some("block_actions") {
        return None;
    }
    let actor = payload["user"]["id"].as_str()?;
    let action = &payload["actions"][0];
    let action_id = ActionId::parse(action["action_id"].as_str()?)?;
    let value = action["selected_option"]["value"]
        .as_str()
        .or_else(|| action["value"].as_str())
        .unwrap_or_default()
        .to_string();

    Some(InboundEvent::Selection {
        actor: actor.to_string(),
        action: action_id,
        value,
    })
}

// ── Block Kit rendering ─────────────────────────────────────────────

/// Render an abstract prompt as Block Kit blocks.
fn render_blocks(prompt: &Prompt) -> Vec<Value> {
    let mut section = json!({
        "type": "section",
        "text": { "type": "mrkdwn", "text": prompt.text },
    });

    match &prompt.interaction {
        Some(Interaction::Select {
            action,
            placeholder,
            options,
        }) => {
            section["accessory"] = json!({
                "type": "static_select",
                "action_id": action.as_str(),
                "placeholder": { "type": "plain_text", "text": placeholder },
                "options": options.iter().map(|choice| json!({
                    "text": { "type": "plain_text", "text": choice.label },
                    "value": choice.value,
                })).collect::<Vec<_>>(),
            });
            vec![section]
        }
        Some(Interaction::Buttons { buttons }) => {
            let elements: Vec<Value> = buttons
                .iter()
                .map(|button| {
                    json!({
                        "type": "button",
                        "text": { "type": "plain_text", "text": button.label },
                        "value": button.value,
                        "action_id": button.action.as_str(),
                    })
                })
                .collect();
            vec![section, json!({ "type": "actions", "elements": elements })]
        }
        None => vec![section],
    }
}
