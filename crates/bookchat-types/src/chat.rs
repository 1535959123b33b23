//! Chat message and exchange record types for bookchat.
//!
//! `ChatMessage` is what the view renders. `ExchangeRecord` is what the
//! history store persists: one user query plus the recommendation it got.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::identity::UserId;

/// Bot-authored text shown when a recommendation request fails.
pub const SEND_ERROR_TEXT: &str = "Error sending query";

/// Who wrote a rendered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Bot,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Author::User => write!(f, "user"),
            Author::Bot => write!(f, "bot"),
        }
    }
}

impl FromStr for Author {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Author::User),
            "bot" => Ok(Author::Bot),
            other => Err(format!("invalid author: '{other}'")),
        }
    }
}

/// A single entry in the rendered chat list.
///
/// Ephemeral entries (the optimistic echo of a submission, transient error
/// replies) carry no timestamp. Entries rebuilt from persisted history carry
/// the timestamp of their exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub author: Author,
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// An ephemeral user-authored message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: Author::User,
            timestamp: None,
        }
    }

    /// An ephemeral bot-authored message.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: Author::Bot,
            timestamp: None,
        }
    }

    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }
}

/// One persisted exchange: a user's query and the recommendation returned.
///
/// Records are append-only. `created_at` is the ordering key for history
/// listings; `id` is a UUID v7 and breaks ties between equal timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub query: String,
    /// Recommendation text. `None` for records written without a reply.
    pub response: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ExchangeRecord {
    /// Create a record for a completed exchange.
    pub fn new(
        user_id: UserId,
        query: impl Into<String>,
        response: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id,
            query: query.into(),
            response,
            created_at,
        }
    }

    /// Expand into rendered messages: the query, then the reply if any.
    pub fn into_messages(self) -> Vec<ChatMessage> {
        let mut out = Vec::with_capacity(2);
        out.push(ChatMessage {
            text: self.query,
            author: Author::User,
            timestamp: Some(self.created_at),
        });
        if let Some(response) = self.response {
            out.push(ChatMessage {
                text: response,
                author: Author::Bot,
                timestamp: Some(self.created_at),
            });
        }
        out
    }
}
