//! Signed-in identity: the `SessionStore` port and the watch channel
//! store implementations use to notify subscribers.

pub mod channel;
pub mod store;
