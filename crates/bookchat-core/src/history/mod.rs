//! Persisted chat history abstractions.
//!
//! This module defines the `HistoryRepository` trait that the infrastructure
//! layer implements for append-only exchange storage.

pub mod repository;
