//! # Strings Module
//!
//! Centralizes user-facing strings and message formatting.
//! Ensures consistency in messaging and easier localization/updates.

pub mod messages;
