//! Property-based tests for the conversation engine
//!
//! These tests fold arbitrary event sequences through the transition function
//! and verify the session invariants hold at every step.

use super::engine::{Transition, settle, transition};
use super::session::{AuthMode, HttpMethod, Session, SessionState};
use crate::domain::types::{
    ChoiceId, Command, Effect, Event, EventKind, MessageId, Outcome, UserId,
};
use proptest::prelude::*;

const USER: UserId = UserId(7);

// ============================================================================
// Test Helpers
// ============================================================================

fn event(kind: EventKind) -> Event {
    Event { user: USER, kind }
}

/// Step once, settling immediately when the step started an execution, the
/// way the dispatcher does between transition and outcome.
fn step(session: &Session, kind: EventKind) -> Transition {
    let mut result = transition(session, &event(kind));
    if result.session.state == SessionState::Executing {
        let settled = settle(
            &result.session,
            Outcome::Response {
                status: 200,
                body: "ok".to_string(),
                truncated: false,
            },
        );
        result.effects.extend(settled.effects);
        result.session = settled.session;
    }
    result
}

/// Fold a fresh session through a sequence of events.
fn reach(kinds: &[EventKind]) -> Session {
    let mut session = Session::new(USER);
    for kind in kinds {
        session = step(&session, kind.clone()).session;
    }
    session
}

fn effect_text(effect: &Effect) -> &str {
    match effect {
        Effect::SendMessage { text, .. } => text,
        Effect::EditMessage { text, .. } => text,
    }
}

/// Position of a state along the dialogue, for the forward-only check.
fn rank(state: &SessionState) -> u8 {
    match state {
        SessionState::AwaitingAuthChoice => 0,
        SessionState::AwaitingToken => 1,
        SessionState::AwaitingMethodChoice => 2,
        SessionState::AwaitingUrl => 3,
        SessionState::AwaitingBody => 4,
        SessionState::Executing => 5,
        SessionState::Done => 6,
    }
}

fn is_reset(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Command(Command::Reset))
        || matches!(
            kind,
            EventKind::Choice {
                id: ChoiceId::Restart,
                ..
            }
        )
}

fn fields_consistent(session: &Session) -> bool {
    // A token only exists under bearer auth.
    if session.token.is_some() && session.auth != AuthMode::Bearer {
        return false;
    }
    // A body only exists for POST.
    if session.body.is_some() && session.method != Some(HttpMethod::Post) {
        return false;
    }
    // An execution is never started with the request half-built.
    if session.state == SessionState::Executing {
        if session.method.is_none() || session.url.is_none() {
            return false;
        }
        if session.method == Some(HttpMethod::Post) && session.body.is_none() {
            return false;
        }
    }
    true
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_choice_id() -> impl Strategy<Value = ChoiceId> {
    prop_oneof![
        Just(ChoiceId::AuthBearer),
        Just(ChoiceId::AuthNone),
        Just(ChoiceId::MethodGet),
        Just(ChoiceId::MethodPost),
        Just(ChoiceId::Repeat),
        Just(ChoiceId::Restart),
    ]
}

fn arb_text() -> impl Strategy<Value = String> {
    // Weighted toward inputs the steps accept, so folds reach Done.
    prop_oneof![
        Just("https://api.example.com/things".to_string()),
        Just(r#"{"k": 1}"#.to_string()),
        Just("token-abc".to_string()),
        "[a-z ]{0,20}".prop_map(String::from),
    ]
}

fn arb_event_kind() -> impl Strategy<Value = EventKind> {
    prop_oneof![
        Just(EventKind::Command(Command::Reset)),
        arb_text().prop_map(EventKind::Text),
        (arb_choice_id(), 1i64..100).prop_map(|(id, message)| EventKind::Choice {
            id,
            message: MessageId(message),
        }),
    ]
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        (100u16..600, "[a-zA-Z ]{0,50}", any::<bool>()).prop_map(|(status, body, truncated)| {
            Outcome::Response {
                status,
                body,
                truncated,
            }
        }),
        "[a-z ]{1,30}".prop_map(|reason| Outcome::Failed { reason }),
    ]
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Invariant 1: session fields stay mutually consistent under any
    // event sequence, and no sequence panics.
    #[test]
    fn prop_fold_preserves_field_consistency(
        kinds in proptest::collection::vec(arb_event_kind(), 0..25)
    ) {
        let mut session = Session::new(USER);
        for kind in kinds {
            let raw = transition(&session, &event(kind.clone()));
            prop_assert!(
                fields_consistent(&raw.session),
                "inconsistent after {:?}: {:?}",
                kind,
                raw.session
            );
            session = step(&session, kind).session;
            prop_assert!(fields_consistent(&session), "inconsistent settled: {:?}", session);
        }
    }

    // Invariant 2: outside of reset and restart, a live session never moves
    // backward through the dialogue.
    #[test]
    fn prop_steps_never_go_backward(
        prefix in proptest::collection::vec(arb_event_kind(), 0..15),
        kind in arb_event_kind()
    ) {
        let session = reach(&prefix);
        prop_assume!(!is_reset(&kind));
        prop_assume!(session.state != SessionState::Done);

        let result = transition(&session, &event(kind.clone()));
        prop_assert!(
            rank(&result.session.state) >= rank(&session.state),
            "{:?} moved {:?} backward to {:?}",
            kind,
            session.state,
            result.session.state
        );
    }

    // Invariant 3: the restart button returns any session to the top and
    // edits the menu message it was pressed on.
    #[test]
    fn prop_restart_always_returns_to_the_top(
        prefix in proptest::collection::vec(arb_event_kind(), 0..15),
        message in 1i64..100
    ) {
        let session = reach(&prefix);
        let kind = EventKind::Choice {
            id: ChoiceId::Restart,
            message: MessageId(message),
        };

        let result = transition(&session, &event(kind));
        prop_assert_eq!(&result.session, &Session::new(USER));
        prop_assert_eq!(result.effects.len(), 1);
        prop_assert!(
            matches!(
                &result.effects[0],
                Effect::EditMessage { target, .. } if *target == MessageId(message)
            ),
            "restart must edit the menu message it was pressed on"
        );
    }

    // Invariant 4: the reset command returns any session to the top with a
    // fresh welcome message.
    #[test]
    fn prop_reset_always_returns_to_the_top(
        prefix in proptest::collection::vec(arb_event_kind(), 0..15)
    ) {
        let session = reach(&prefix);
        let result = transition(&session, &event(EventKind::Command(Command::Reset)));
        prop_assert_eq!(&result.session, &Session::new(USER));
        prop_assert_eq!(result.effects.len(), 1);
        prop_assert!(
            matches!(&result.effects[0], Effect::SendMessage { .. }),
            "reset must answer with a fresh message"
        );
    }

    // Invariant 5: junk never passes URL validation. The generator cannot
    // produce a colon, so no input here carries a scheme.
    #[test]
    fn prop_junk_url_never_advances(junk in "[a-z ]{1,20}") {
        let session = reach(&[
            EventKind::Choice { id: ChoiceId::AuthNone, message: MessageId(1) },
            EventKind::Choice { id: ChoiceId::MethodGet, message: MessageId(1) },
        ]);
        prop_assert_eq!(&session.state, &SessionState::AwaitingUrl);

        let result = transition(&session, &event(EventKind::Text(junk)));
        prop_assert_eq!(&result.session.state, &SessionState::AwaitingUrl);
        prop_assert!(result.session.url.is_none());
    }

    // Invariant 6: malformed JSON never passes body validation. A trailing
    // open brace makes any prefix invalid.
    #[test]
    fn prop_junk_body_never_advances(junk in "[a-z ]{0,10}") {
        let session = reach(&[
            EventKind::Choice { id: ChoiceId::AuthNone, message: MessageId(1) },
            EventKind::Choice { id: ChoiceId::MethodPost, message: MessageId(1) },
            EventKind::Text("https://api.example.com".to_string()),
        ]);
        prop_assert_eq!(&session.state, &SessionState::AwaitingBody);

        let result = transition(&session, &event(EventKind::Text(format!("{junk}{{"))));
        prop_assert_eq!(&result.session.state, &SessionState::AwaitingBody);
        prop_assert!(result.session.body.is_none());
    }

    // Invariant 7: only a button press is ever answered by editing a
    // message, and the edit targets the message that was pressed.
    #[test]
    fn prop_edits_only_answer_button_presses(
        prefix in proptest::collection::vec(arb_event_kind(), 0..15),
        kind in arb_event_kind()
    ) {
        let session = reach(&prefix);
        let result = transition(&session, &event(kind.clone()));
        for effect in &result.effects {
            if let Effect::EditMessage { target, .. } = effect {
                match &kind {
                    EventKind::Choice { message, .. } => prop_assert_eq!(target, message),
                    other => prop_assert!(false, "edit answered {:?}", other),
                }
            }
        }
    }

    // Invariant 8: settling an execution always lands in Done, records the
    // outcome, and announces it as exactly two sent messages.
    #[test]
    fn prop_settle_reports_every_outcome(outcome in arb_outcome()) {
        let session = reach(&[
            EventKind::Choice { id: ChoiceId::AuthNone, message: MessageId(1) },
            EventKind::Choice { id: ChoiceId::MethodGet, message: MessageId(1) },
        ]);
        let mut executing = session;
        executing.state = SessionState::Executing;
        executing.url = Some("https://api.example.com".to_string());

        let result = settle(&executing, outcome.clone());
        prop_assert_eq!(&result.session.state, &SessionState::Done);
        prop_assert_eq!(result.session.last_result.as_ref(), Some(&outcome));
        prop_assert_eq!(result.effects.len(), 2);
        prop_assert!(
            result
                .effects
                .iter()
                .all(|e| matches!(e, Effect::SendMessage { .. })),
            "settle announces with fresh messages only"
        );
        prop_assert!(
            matches!(
                &result.effects[1],
                Effect::SendMessage { choices, .. } if !choices.is_empty()
            ),
            "the epilogue message must carry the next choices"
        );
    }

    // Invariant 9: the token never appears in anything the bot says, not
    // even across a full flow with a repeat.
    #[test]
    fn prop_token_never_leaks_into_effect_text(token in "[a-z0-9]{16}") {
        let kinds = [
            EventKind::Choice { id: ChoiceId::AuthBearer, message: MessageId(1) },
            EventKind::Text(token.clone()),
            EventKind::Choice { id: ChoiceId::MethodPost, message: MessageId(2) },
            EventKind::Text("https://api.example.com/submit".to_string()),
            EventKind::Text(r#"{"n": 1}"#.to_string()),
            EventKind::Choice { id: ChoiceId::Repeat, message: MessageId(3) },
        ];

        let mut session = Session::new(USER);
        for kind in kinds {
            let result = step(&session, kind);
            for effect in &result.effects {
                prop_assert!(
                    !effect_text(effect).contains(&token),
                    "token leaked into: {}",
                    effect_text(effect)
                );
            }
            session = result.session;
        }
        prop_assert_eq!(&session.state, &SessionState::Done);
        prop_assert_eq!(session.token.as_ref(), Some(&token));
    }
}
