//! # Telegram Service Adapter
//!
//! Implements the `ChatGateway` trait for the Telegram Bot API over plain
//! HTTPS. This module is the bridge between the generic gateway interface
//! used by the bot's core logic and the Bot API's wire format: long polling
//! via `getUpdates` on the way in, `sendMessage` and `editMessageText` on
//! the way out.

use crate::domain::config::TelegramConfig;
use crate::domain::traits::ChatGateway;
use crate::domain::types::{Choice, ChoiceId, Command, Event, EventKind, MessageId, UserId};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

// ---- Bot API wire format ----

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    message: Option<IncomingMessage>,
    callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Deserialize)]
struct IncomingMessage {
    message_id: i64,
    chat: Chat,
    #[serde(default)]
    text: Option<String>,
    /// Unix timestamp the message was sent at.
    #[serde(default)]
    date: i64,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    id: String,
    message: Option<IncomingMessage>,
    data: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Debug, Serialize)]
struct GetUpdatesPayload {
    timeout: u64,
    offset: i64,
    allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
struct SendMessagePayload<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboard>,
}

#[derive(Debug, Serialize)]
struct EditMessagePayload<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboard>,
}

#[derive(Debug, Serialize, PartialEq)]
struct InlineKeyboard {
    inline_keyboard: Vec<Vec<InlineButton>>,
}

#[derive(Debug, Serialize, PartialEq)]
struct InlineButton {
    text: String,
    callback_data: String,
}

/// Render choices as a single row of inline buttons, or nothing at all.
fn keyboard(choices: &[Choice]) -> Option<InlineKeyboard> {
    if choices.is_empty() {
        return None;
    }
    let row = choices
        .iter()
        .map(|choice| InlineButton {
            text: choice.label.to_string(),
            callback_data: choice.id.as_str().to_string(),
        })
        .collect();
    Some(InlineKeyboard {
        inline_keyboard: vec![row],
    })
}

// ---- Gateway ----

pub struct TelegramGateway {
    http_client: Client,
    /// Base URL with the `/bot<token>` segment already applied.
    api_base: String,
    poll_timeout: u64,
    offset: AtomicI64,
    /// Unix timestamp of process start, for dropping replayed messages.
    started_at: i64,
}

impl TelegramGateway {
    pub fn new(token: &str, config: &TelegramConfig) -> Result<Self> {
        // The client timeout must outlast the long poll itself.
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout + 10))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http_client,
            api_base: format!("{}/bot{token}", config.api_base),
            poll_timeout: config.poll_timeout,
            offset: AtomicI64::new(0),
            started_at: Utc::now().timestamp(),
        })
    }

    /// Long-poll the Bot API once and translate everything received into
    /// engine events. The offset advances past every received update,
    /// including the ones that map to nothing.
    pub async fn poll_events(&self) -> Result<Vec<Event>, String> {
        let payload = GetUpdatesPayload {
            timeout: self.poll_timeout,
            offset: self.offset.load(Ordering::SeqCst),
            allowed_updates: ALLOWED_UPDATES,
        };
        let updates: Vec<Update> = self.call("getUpdates", &payload).await?;

        let mut events = Vec::new();
        for update in updates {
            self.offset.store(update.update_id + 1, Ordering::SeqCst);
            if let Some(query) = &update.callback_query {
                // Best effort; an unanswered query only leaves the button
                // spinner running on the user's screen.
                if let Err(error) = self.answer_callback(&query.id).await {
                    tracing::debug!("answerCallbackQuery failed: {}", error);
                }
            }
            if let Some(event) = map_update(update, self.started_at) {
                events.push(event);
            }
        }
        Ok(events)
    }

    async fn answer_callback(&self, query_id: &str) -> Result<(), String> {
        #[derive(Serialize)]
        struct Payload<'a> {
            callback_query_id: &'a str,
        }
        let _: serde_json::Value = self
            .call("answerCallbackQuery", &Payload { callback_query_id: query_id })
            .await?;
        Ok(())
    }

    async fn call<T, P>(&self, method: &str, payload: &P) -> Result<T, String>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let url = format!("{}/{method}", self.api_base);
        // reqwest errors can embed the request URL, which carries the bot
        // token in its path.
        let response = self
            .http_client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| format!("{method} request failed: {}", e.without_url()))?;

        let api: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| format!("{method} returned an unreadable response: {}", e.without_url()))?;

        if !api.ok {
            return Err(format!(
                "{method} rejected: {}",
                api.description.unwrap_or_else(|| "no description".to_string())
            ));
        }
        api.result
            .ok_or_else(|| format!("{method} returned no result"))
    }
}

/// Translate one update into an engine event, if it carries one.
///
/// Button presses always map, however old the menu they sit under; the press
/// itself just happened. Plain messages dated before `started_at` are
/// dropped, so updates replayed by the Bot API after a restart cannot stir
/// sessions that no longer exist.
fn map_update(update: Update, started_at: i64) -> Option<Event> {
    if let Some(query) = update.callback_query {
        let message = query.message?;
        let id = ChoiceId::from_wire(query.data.as_deref()?)?;
        return Some(Event {
            user: UserId(message.chat.id),
            kind: EventKind::Choice {
                id,
                message: MessageId(message.message_id),
            },
        });
    }

    let message = update.message?;
    let text = message.text?;
    if message.date < started_at {
        tracing::debug!("Dropping update {} from before startup", update.update_id);
        return None;
    }
    let kind = if text.trim() == "/start" {
        EventKind::Command(Command::Reset)
    } else {
        EventKind::Text(text)
    };
    Some(Event {
        user: UserId(message.chat.id),
        kind,
    })
}

#[async_trait]
impl ChatGateway for TelegramGateway {
    async fn send_message(
        &self,
        user: UserId,
        text: &str,
        choices: &[Choice],
    ) -> Result<MessageId, String> {
        tracing::debug!("Sending message to {} ({} chars)", user, text.len());
        let payload = SendMessagePayload {
            chat_id: user.0,
            text,
            reply_markup: keyboard(choices),
        };
        let sent: SentMessage = self.call("sendMessage", &payload).await?;
        Ok(MessageId(sent.message_id))
    }

    async fn edit_message(
        &self,
        user: UserId,
        target: MessageId,
        text: &str,
        choices: &[Choice],
    ) -> Result<(), String> {
        tracing::debug!("Editing message {} for {}", target, user);
        let payload = EditMessagePayload {
            chat_id: user.0,
            message_id: target.0,
            text,
            reply_markup: keyboard(choices),
        };
        let _: serde_json::Value = self.call("editMessageText", &payload).await?;
        Ok(())
    }
}
