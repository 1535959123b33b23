//! HTTP adapters.

pub mod recommend;
