use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

/// Opaque, stable identifier of a signed-in user.
///
/// Issued by the identity source on sign-in. The chat controller and the
/// history store only ever compare it for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the id is blank after trimming (never valid for sign-in).
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// The signed-in user.
///
/// Owned by the session store; the chat controller only keeps a read copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    /// Name shown in the chat banner and prompt.
    pub display_name: String,
    pub email: Option<String>,
    pub signed_in_at: DateTime<Utc>,
}

impl Identity {
    /// Create an identity signed in now, with no email.
    pub fn new(user_id: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            email: None,
            signed_in_at: Utc::now(),
        }
    }

    /// Two identities belong to the same user when their ids match.
    /// Display metadata may differ.
    pub fn same_user(&self, other: &Identity) -> bool {
        self.user_id == other.user_id
    }
}

/// Input to a session store sign-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub user_id: String,
    pub display_name: Option<String>,
    pub email: Option<String>,
}
