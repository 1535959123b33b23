//! Recommendation backend abstraction.

pub mod client;
