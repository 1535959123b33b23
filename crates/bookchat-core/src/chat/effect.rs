//! Side effects requested by the chat state machine.

use bookchat_types::chat::ExchangeRecord;
use bookchat_types::identity::UserId;
use uuid::Uuid;

/// Work the controller must start on behalf of a transition. Each effect
/// produces exactly one completion event.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send the query to the recommendation client.
    Ask {
        exchange_id: Uuid,
        query: String,
        user_id: UserId,
    },
    /// Write a completed exchange to the history repository.
    Persist {
        exchange_id: Uuid,
        record: ExchangeRecord,
        attempt: u32,
    },
    /// Read all history for a user.
    LoadHistory { seq: u64, user_id: UserId },
}
