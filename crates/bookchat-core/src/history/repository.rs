//! HistoryRepository trait definition.
//!
//! Append-only storage of exchange records, keyed by user. Follows the same
//! RPITIT pattern as the other collaborator traits.

use bookchat_types::chat::ExchangeRecord;
use bookchat_types::error::HistoryError;
use bookchat_types::identity::UserId;

/// Repository trait for persisted chat history.
///
/// Implementations live in bookchat-infra (e.g., `SqliteHistoryRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait HistoryRepository: Send + Sync {
    /// Append one exchange. Records are never updated once written.
    fn append(
        &self,
        record: &ExchangeRecord,
    ) -> impl std::future::Future<Output = Result<(), HistoryError>> + Send;

    /// All records for a user, ordered by `created_at` ASC (ties by id).
    ///
    /// No pagination: a full scan per reload is expected.
    fn list_all(
        &self,
        user_id: &UserId,
    ) -> impl std::future::Future<Output = Result<Vec<ExchangeRecord>, HistoryError>> + Send;
}
