use thiserror::Error;

/// Errors from the session store (sign-in, sign-out, restoring a session).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AuthError {
    #[error("invalid identity: {0}")]
    InvalidIdentity(String),

    #[error("sign-in cancelled")]
    Cancelled,

    #[error("session storage error: {0}")]
    Storage(String),
}

/// Errors from a recommendation request.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RecommendError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("invalid backend response: {0}")]
    Decode(String),
}

/// Errors from the history store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HistoryError {
    #[error("history write failed: {0}")]
    Write(String),

    #[error("history read failed: {0}")]
    Read(String),
}

/// Errors loading `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(String),
}
