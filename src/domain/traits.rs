//! # Domain Traits
//!
//! Abstract interface for the chat transport. Allows for pluggable
//! implementations in the Infrastructure layer and fakes in tests.

use crate::domain::types::{Choice, MessageId, UserId};
use async_trait::async_trait;

/// Abstract interface for a chat gateway (e.g., Telegram, a test fake)
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Send a message to the user, optionally with a row of choice buttons.
    /// Returns the id of the sent message so it can be edited later.
    async fn send_message(
        &self,
        user: UserId,
        text: &str,
        choices: &[Choice],
    ) -> Result<MessageId, String>;

    /// Edit a previously sent message in place.
    async fn edit_message(
        &self,
        user: UserId,
        target: MessageId,
        text: &str,
        choices: &[Choice],
    ) -> Result<(), String>;
}
