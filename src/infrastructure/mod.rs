//! # Infrastructure Layer
//!
//! Handles interactions with external systems and services.
//! Implements the traits defined in the Domain layer (e.g., ChatGateway)
//! and owns the outgoing HTTP client.

pub mod executor;
pub mod telegram;
