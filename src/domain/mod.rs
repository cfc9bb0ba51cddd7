//! # Domain Layer
//!
//! Core definitions, types, and traits that define the business domain of the
//! application. Independent of specific transports, serving as the contract
//! for the other layers.

pub mod config;
pub mod traits;
pub mod types;
