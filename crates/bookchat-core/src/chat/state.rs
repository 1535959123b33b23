//! Chat session state owned by the controller.
//!
//! `ChatState` is only mutated by `transition`; everything else reads it
//! through accessors.

use bookchat_types::chat::{ChatMessage, ExchangeRecord};
use bookchat_types::identity::{Identity, UserId};
use uuid::Uuid;

use std::fmt;

/// Where the rendered list stands relative to the history store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HistoryStatus {
    /// Nothing requested yet (signed out, or just signed in).
    #[default]
    Idle,
    /// A reload is outstanding.
    Loading,
    /// The latest reload was applied.
    Loaded,
    /// The latest reload failed; the rendered list is what it was before.
    Unavailable(String),
}

/// Progress of the one outstanding exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangePhase {
    /// The recommendation request is in flight.
    AwaitingResponse,
    /// The reply arrived and the record is being written.
    Persisting { record: ExchangeRecord, attempt: u32 },
}

/// A submitted query that has not settled yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub id: Uuid,
    pub user_id: UserId,
    pub query: String,
    pub phase: ExchangePhase,
}

/// Coarse view of the session, for prompts and status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    SignedOut,
    Idle,
    AwaitingResponse,
    Persisting,
}

/// Why a submission was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The text is empty after trimming.
    Blank,
    /// Nobody is signed in.
    SignedOut,
    /// Another exchange is still outstanding.
    Busy,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Blank => write!(f, "message is empty"),
            RejectReason::SignedOut => write!(f, "sign in to send messages"),
            RejectReason::Busy => write!(f, "still waiting for the previous reply"),
        }
    }
}

/// Result of a submit call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum SubmitOutcome {
    Accepted,
    Rejected(RejectReason),
}

/// State of one chat session view.
///
/// Reloads are numbered: `reload_issued` is the last sequence number handed
/// out, `reload_applied` the last one whose result was applied (or the
/// point below which results are stale after an identity change).
#[derive(Debug, Clone, Default)]
pub struct ChatState {
    pub(super) identity: Option<Identity>,
    pub(super) draft: String,
    pub(super) rendered: Vec<ChatMessage>,
    pub(super) exchange: Option<Exchange>,
    pub(super) history: HistoryStatus,
    pub(super) reload_issued: u64,
    pub(super) reload_applied: u64,
    pub(super) revision: u64,
}

impl ChatState {
    /// A signed-out session with nothing rendered.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Messages to display, oldest first.
    pub fn rendered(&self) -> &[ChatMessage] {
        &self.rendered
    }

    pub fn exchange(&self) -> Option<&Exchange> {
        self.exchange.as_ref()
    }

    pub fn history_status(&self) -> &HistoryStatus {
        &self.history
    }

    /// Bumped whenever `rendered` is cleared or replaced wholesale, so a
    /// view can tell a replacement from an append.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether an exchange is outstanding.
    pub fn is_busy(&self) -> bool {
        self.exchange.is_some()
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.identity, &self.exchange) {
            (None, _) => SessionPhase::SignedOut,
            (Some(_), None) => SessionPhase::Idle,
            (Some(_), Some(ex)) => match ex.phase {
                ExchangePhase::AwaitingResponse => SessionPhase::AwaitingResponse,
                ExchangePhase::Persisting { .. } => SessionPhase::Persisting,
            },
        }
    }

    /// Check whether `text` would be accepted by a submit right now.
    pub fn check_submit(&self, text: &str) -> Result<(), RejectReason> {
        if text.trim().is_empty() {
            return Err(RejectReason::Blank);
        }
        if self.identity.is_none() {
            return Err(RejectReason::SignedOut);
        }
        if self.exchange.is_some() {
            return Err(RejectReason::Busy);
        }
        Ok(())
    }
}
