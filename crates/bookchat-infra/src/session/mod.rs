//! Session store implementations.

pub mod file_store;
