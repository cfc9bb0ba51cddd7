//! # Session Store
//!
//! In-memory map from user to their single active session. Sessions hold the
//! bearer token, so nothing here ever touches disk; a process restart starts
//! every dialogue from the top.

use crate::application::session::Session;
use crate::domain::types::UserId;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, Session>>,
}

impl SessionStore {
    /// Gets a clone of the user's session, if one exists.
    pub async fn get(&self, user: UserId) -> Option<Session> {
        self.sessions.lock().await.get(&user).cloned()
    }

    /// Stores the session under its own user, replacing any previous one.
    pub async fn put(&self, session: Session) {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.user, session);
    }

    /// Forgets the user's session. Does nothing for an unknown user.
    pub async fn delete(&self, user: UserId) {
        self.sessions.lock().await.remove(&user);
    }

    pub async fn count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
