//! Interactive terminal chat.
//!
//! The loop reacts to three sources at once: identity changes from the
//! session store, lines typed by the user, and completions of the
//! controller's in-flight calls. Entry point: `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
pub mod renderer;
