//! # Domain Types
//!
//! Events arriving from the chat gateway, Effects flowing back to it, and the
//! identifiers shared between the two. The conversation engine speaks only in
//! these types; nothing here knows which transport delivers them.

use std::fmt;

/// Chat user identity, the session map key (a Telegram chat id for the
/// shipped gateway, but opaque to everything outside infrastructure).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a message the bot previously sent, used to edit it in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One inbound occurrence from the chat gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub user: UserId,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A recognized command. Only the reset command exists today.
    Command(Command),
    /// Free-form message text.
    Text(String),
    /// A menu button press, tagged with the menu message it was pressed on
    /// so reactions can edit that message instead of sending a new one.
    Choice { id: ChoiceId, message: MessageId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/start`: discard any in-progress session and begin from the top.
    Reset,
}

/// Selectable option rendered as a button under a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub id: ChoiceId,
    pub label: &'static str,
}

/// The closed set of button identities, carried over the wire as opaque
/// tokens in callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceId {
    AuthBearer,
    AuthNone,
    MethodGet,
    MethodPost,
    Repeat,
    Restart,
}

impl ChoiceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChoiceId::AuthBearer => "AUTH_BEARER",
            ChoiceId::AuthNone => "AUTH_NONE",
            ChoiceId::MethodGet => "METHOD_GET",
            ChoiceId::MethodPost => "METHOD_POST",
            ChoiceId::Repeat => "REPEAT",
            ChoiceId::Restart => "RESTART",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        match s {
            "AUTH_BEARER" => Some(ChoiceId::AuthBearer),
            "AUTH_NONE" => Some(ChoiceId::AuthNone),
            "METHOD_GET" => Some(ChoiceId::MethodGet),
            "METHOD_POST" => Some(ChoiceId::MethodPost),
            "REPEAT" => Some(ChoiceId::Repeat),
            "RESTART" => Some(ChoiceId::Restart),
            _ => None,
        }
    }
}

/// One outbound instruction to the chat gateway.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Post a fresh message, optionally with a button row.
    SendMessage {
        text: String,
        choices: &'static [Choice],
    },
    /// Rewrite a previously sent message in place.
    EditMessage {
        target: MessageId,
        text: String,
        choices: &'static [Choice],
    },
}

impl Effect {
    pub fn send(text: impl Into<String>) -> Self {
        Effect::SendMessage {
            text: text.into(),
            choices: &[],
        }
    }

    pub fn send_menu(text: impl Into<String>, choices: &'static [Choice]) -> Self {
        Effect::SendMessage {
            text: text.into(),
            choices,
        }
    }

    pub fn edit(target: MessageId, text: impl Into<String>) -> Self {
        Effect::EditMessage {
            target,
            text: text.into(),
            choices: &[],
        }
    }

    pub fn edit_menu(target: MessageId, text: impl Into<String>, choices: &'static [Choice]) -> Self {
        Effect::EditMessage {
            target,
            text: text.into(),
            choices,
        }
    }
}

/// Result of one executed HTTP request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The server answered. Any status counts, 2xx or not.
    Response {
        status: u16,
        /// Body text, already capped at the executor's character limit.
        body: String,
        /// True when the body was cut at the cap.
        truncated: bool,
    },
    /// The request never produced a response (timeout, connect failure, ...).
    Failed { reason: String },
}
