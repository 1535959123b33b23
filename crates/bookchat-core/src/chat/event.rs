//! Inputs to the chat state machine.

use bookchat_types::chat::ExchangeRecord;
use bookchat_types::error::{HistoryError, RecommendError};
use bookchat_types::identity::{Identity, UserId};
use uuid::Uuid;

/// Everything that can happen to a chat session.
///
/// The first four come from the user or the session store; the rest are
/// completions of effects the controller started.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// The session store reported a (possibly unchanged) identity.
    IdentityChanged(Option<Identity>),
    /// The input line was edited.
    DraftChanged(String),
    /// The user submitted text.
    Submit(String),
    /// Re-read persisted history for the current identity.
    Reload,
    /// The recommendation call for an exchange finished.
    ResponseReceived {
        exchange_id: Uuid,
        result: Result<String, RecommendError>,
    },
    /// A history write for an exchange finished.
    ExchangePersisted {
        exchange_id: Uuid,
        attempt: u32,
        result: Result<(), HistoryError>,
    },
    /// A history read finished.
    HistoryLoaded {
        seq: u64,
        user_id: UserId,
        result: Result<Vec<ExchangeRecord>, HistoryError>,
    },
}
