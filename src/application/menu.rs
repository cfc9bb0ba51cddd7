//! # Menu Catalog
//!
//! The fixed choice sets offered at each conversational step, and the one
//! mapping from state to choice set. Pure data so the engine, the gateway
//! rendering, and the tests all agree on what is on screen.

use crate::application::session::SessionState;
use crate::domain::types::{Choice, ChoiceId};
use crate::strings::messages;

pub const AUTH_MENU: &[Choice] = &[
    Choice {
        id: ChoiceId::AuthBearer,
        label: messages::LABEL_AUTH_BEARER,
    },
    Choice {
        id: ChoiceId::AuthNone,
        label: messages::LABEL_AUTH_NONE,
    },
];

pub const METHOD_MENU: &[Choice] = &[
    Choice {
        id: ChoiceId::MethodGet,
        label: messages::LABEL_METHOD_GET,
    },
    Choice {
        id: ChoiceId::MethodPost,
        label: messages::LABEL_METHOD_POST,
    },
];

pub const DONE_MENU: &[Choice] = &[
    Choice {
        id: ChoiceId::Repeat,
        label: messages::LABEL_REPEAT,
    },
    Choice {
        id: ChoiceId::Restart,
        label: messages::LABEL_RESTART,
    },
];

/// Choices on offer while sitting in `state`. States that expect text input
/// offer none.
pub fn choices_for(state: &SessionState) -> &'static [Choice] {
    match state {
        SessionState::AwaitingAuthChoice => AUTH_MENU,
        SessionState::AwaitingMethodChoice => METHOD_MENU,
        SessionState::Done => DONE_MENU,
        _ => &[],
    }
}
