//! # Session
//!
//! The per-user record of a request under construction. Sessions live only in
//! the in-memory store for the lifetime of the process; losing them on
//! restart is a design decision, not an omission, so nothing here derives
//! serde.

use crate::domain::types::{Outcome, UserId};
use serde_json::Value;

/// Where the conversation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingAuthChoice,
    AwaitingToken,
    AwaitingMethodChoice,
    AwaitingUrl,
    AwaitingBody,
    Executing,
    Done,
}

/// Set once at the auth step; `Bearer` routes the flow through the token step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    None,
    Bearer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// One request being specified, one per user.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user: UserId,
    pub state: SessionState,
    pub auth: AuthMode,
    /// Bearer credential. Present only when `auth` is `Bearer` and the token
    /// step has been answered. Never logged, never echoed into effect text.
    pub token: Option<String>,
    pub method: Option<HttpMethod>,
    /// Target URL as the user typed it, validated absolute http(s).
    pub url: Option<String>,
    /// Parsed JSON body. Present only on the POST branch.
    pub body: Option<Value>,
    /// Outcome of the most recent execution, overwritten each run.
    pub last_result: Option<Outcome>,
}

impl Session {
    /// Fresh session at the first step, everything else unset.
    pub fn new(user: UserId) -> Self {
        Self {
            user,
            state: SessionState::AwaitingAuthChoice,
            auth: AuthMode::None,
            token: None,
            method: None,
            url: None,
            body: None,
            last_result: None,
        }
    }
}
