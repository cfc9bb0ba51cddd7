//! # Conversation Engine
//!
//! The pure transition function that owns step ordering and validation for
//! the whole request-building dialogue. It performs no I/O: it consumes the
//! current `Session` and one `Event` and hands back the next `Session` plus
//! the ordered Effects to deliver. Anything that does not fit the current
//! step is ignored with a guidance message rather than crashing or resetting.

use crate::application::menu;
use crate::application::session::{AuthMode, HttpMethod, Session, SessionState};
use crate::domain::types::{ChoiceId, Command, Effect, Event, EventKind, Outcome};
use crate::strings::messages;
use serde_json::Value;

/// Result of one engine step.
#[derive(Debug)]
pub struct Transition {
    pub session: Session,
    pub effects: Vec<Effect>,
}

impl Transition {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Advance one session by one event.
///
/// Total over every (state, event) pair and never errors. Reactions to a
/// button press edit the menu message the press came from; reactions to text
/// send fresh messages. When the returned session is in `Executing` the
/// caller runs the request and follows up with [`settle`].
pub fn transition(session: &Session, event: &Event) -> Transition {
    match (&session.state, &event.kind) {
        // The reset command and the restart button work from any state.
        (_, EventKind::Command(Command::Reset)) => {
            let next = Session::new(session.user);
            let welcome = Effect::send_menu(messages::WELCOME, menu::choices_for(&next.state));
            Transition::new(next).with_effect(welcome)
        }
        (_, EventKind::Choice { id: ChoiceId::Restart, message }) => {
            let next = Session::new(session.user);
            let welcome =
                Effect::edit_menu(*message, messages::WELCOME, menu::choices_for(&next.state));
            Transition::new(next).with_effect(welcome)
        }

        (SessionState::AwaitingAuthChoice, EventKind::Choice { id: ChoiceId::AuthBearer, message }) => {
            let mut next = session.clone();
            next.state = SessionState::AwaitingToken;
            next.auth = AuthMode::Bearer;
            Transition::new(next).with_effect(Effect::edit(*message, messages::TOKEN_PROMPT))
        }
        (SessionState::AwaitingAuthChoice, EventKind::Choice { id: ChoiceId::AuthNone, message }) => {
            let mut next = session.clone();
            next.state = SessionState::AwaitingMethodChoice;
            next.auth = AuthMode::None;
            let prompt =
                Effect::edit_menu(*message, messages::METHOD_PROMPT, menu::choices_for(&next.state));
            Transition::new(next).with_effect(prompt)
        }

        (SessionState::AwaitingToken, EventKind::Text(text)) => {
            let token = text.trim();
            if token.is_empty() {
                return Transition::new(session.clone())
                    .with_effect(Effect::send(messages::TOKEN_EMPTY));
            }
            let mut next = session.clone();
            next.state = SessionState::AwaitingMethodChoice;
            next.token = Some(token.to_string());
            let prompt = Effect::send_menu(messages::METHOD_PROMPT, menu::choices_for(&next.state));
            Transition::new(next).with_effect(prompt)
        }

        (SessionState::AwaitingMethodChoice, EventKind::Choice { id: ChoiceId::MethodGet, message }) => {
            let mut next = session.clone();
            next.state = SessionState::AwaitingUrl;
            next.method = Some(HttpMethod::Get);
            Transition::new(next).with_effect(Effect::edit(*message, messages::URL_PROMPT))
        }
        (SessionState::AwaitingMethodChoice, EventKind::Choice { id: ChoiceId::MethodPost, message }) => {
            let mut next = session.clone();
            next.state = SessionState::AwaitingUrl;
            next.method = Some(HttpMethod::Post);
            Transition::new(next).with_effect(Effect::edit(*message, messages::URL_PROMPT))
        }

        (SessionState::AwaitingUrl, EventKind::Text(text)) => {
            let url = text.trim();
            if !is_absolute_http_url(url) {
                return Transition::new(session.clone())
                    .with_effect(Effect::send(messages::URL_INVALID));
            }
            let mut next = session.clone();
            // Keep the text as typed; normalization would surprise the user.
            next.url = Some(url.to_string());
            if next.method == Some(HttpMethod::Post) {
                next.state = SessionState::AwaitingBody;
                Transition::new(next).with_effect(Effect::send(messages::BODY_PROMPT))
            } else {
                next.state = SessionState::Executing;
                Transition::new(next)
            }
        }

        (SessionState::AwaitingBody, EventKind::Text(text)) => match serde_json::from_str::<Value>(text) {
            Ok(body) => {
                let mut next = session.clone();
                next.state = SessionState::Executing;
                next.body = Some(body);
                Transition::new(next)
            }
            Err(_) => Transition::new(session.clone())
                .with_effect(Effect::send(messages::JSON_INVALID)),
        },

        (SessionState::Done, EventKind::Choice { id: ChoiceId::Repeat, message }) => {
            let mut next = session.clone();
            next.state = SessionState::Executing;
            Transition::new(next).with_effect(Effect::edit(*message, messages::REPEATING))
        }
        // A finished session holds no conversational step: anything except
        // the epilogue buttons starts the dialogue over.
        (SessionState::Done, _) => {
            let next = Session::new(session.user);
            let welcome = Effect::send_menu(messages::WELCOME, menu::choices_for(&next.state));
            Transition::new(next).with_effect(welcome)
        }

        // Fail closed: a stray event leaves the session exactly as it was.
        _ => Transition::new(session.clone()).with_effect(Effect::send(messages::FOLLOW_STEP)),
    }
}

/// Apply the outcome of an executed request: record it, move to `Done`, and
/// announce it as two messages, the result itself and then the epilogue menu.
pub fn settle(session: &Session, outcome: Outcome) -> Transition {
    let text = match &outcome {
        Outcome::Response { status, body, truncated } => {
            messages::result_response(*status, body, *truncated)
        }
        Outcome::Failed { reason } => messages::result_failed(reason),
    };
    let mut next = session.clone();
    next.state = SessionState::Done;
    next.last_result = Some(outcome);
    let epilogue = Effect::send_menu(messages::WHAT_NEXT, menu::choices_for(&next.state));
    Transition::new(next)
        .with_effect(Effect::send(text))
        .with_effect(epilogue)
}

fn is_absolute_http_url(text: &str) -> bool {
    match reqwest::Url::parse(text) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}
