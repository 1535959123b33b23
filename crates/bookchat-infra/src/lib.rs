//! Infrastructure layer for bookchat.
//!
//! Contains implementations of the collaborator traits defined in
//! `bookchat-core`: SQLite history storage, the HTTP recommendation client,
//! and the file-backed session store. Also resolves the data directory and
//! loads `config.toml`.

pub mod config;
pub mod http;
pub mod paths;
pub mod session;
pub mod sqlite;
