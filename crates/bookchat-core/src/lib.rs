//! Chat session logic and collaborator trait definitions for bookchat.
//!
//! This crate defines the "ports" (session store, history repository,
//! recommendation client) that the infrastructure layer implements, and the
//! chat session state machine that drives them. It depends only on
//! `bookchat-types` -- never on `bookchat-infra` or any database/HTTP crate.

pub mod chat;
pub mod history;
pub mod recommend;
pub mod session;
