//! Shared domain types for bookchat.
//!
//! This crate contains the types passed between the chat controller and its
//! collaborators: the signed-in Identity, chat messages, persisted exchange
//! records, configuration, and the error enums for each external call.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod identity;
