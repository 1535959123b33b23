//! Chat session: state machine plus the controller that drives it.

pub mod controller;
pub mod effect;
pub mod event;
pub mod state;
pub mod transition;

pub use controller::{ChatController, ControllerConfig};
pub use state::{ChatState, HistoryStatus, RejectReason, SessionPhase, SubmitOutcome};
