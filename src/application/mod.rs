//! # Application Layer
//!
//! Contains the core business logic and orchestration of the bot.
//! This includes the conversation engine, the session store, and the
//! per-user event dispatch.

pub mod dispatcher;
pub mod engine;
pub mod menu;
pub mod session;
pub mod store;

#[cfg(test)]
mod proptests;
