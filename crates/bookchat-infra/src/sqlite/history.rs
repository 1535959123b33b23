//! SQLite history repository implementation.
//!
//! Implements `HistoryRepository` from `bookchat-core`. Writes go through the
//! writer pool, listings through the reader pool.

use bookchat_core::history::repository::HistoryRepository;
use bookchat_types::chat::ExchangeRecord;
use bookchat_types::error::HistoryError;
use bookchat_types::identity::UserId;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `HistoryRepository`.
pub struct SqliteHistoryRepository {
    pool: DatabasePool,
}

impl SqliteHistoryRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Internal row type
// ---------------------------------------------------------------------------

struct ExchangeRow {
    id: String,
    user_id: String,
    query: String,
    response: Option<String>,
    created_at: String,
}

impl ExchangeRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            query: row.try_get("query")?,
            response: row.try_get("response")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_record(self) -> Result<ExchangeRecord, HistoryError> {
        Ok(ExchangeRecord {
            id: parse_uuid(&self.id)?,
            user_id: UserId::new(self.user_id),
            query: self.query,
            response: self.response,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_uuid(s: &str) -> Result<Uuid, HistoryError> {
    s.parse::<Uuid>()
        .map_err(|e| HistoryError::Read(format!("invalid UUID: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, HistoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| HistoryError::Read(format!("invalid datetime: {e}")))
}

/// Fixed-width RFC 3339 so lexical order in SQLite matches time order.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ---------------------------------------------------------------------------
// HistoryRepository impl
// ---------------------------------------------------------------------------

impl HistoryRepository for SqliteHistoryRepository {
    async fn append(&self, record: &ExchangeRecord) -> Result<(), HistoryError> {
        sqlx::query(
            "INSERT INTO exchanges (id, user_id, query, response, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(record.user_id.as_str())
        .bind(&record.query)
        .bind(&record.response)
        .bind(format_datetime(&record.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| HistoryError::Write(e.to_string()))?;

        tracing::debug!(id = %record.id, user_id = %record.user_id, "Exchange appended");
        Ok(())
    }

    async fn list_all(&self, user_id: &UserId) -> Result<Vec<ExchangeRecord>, HistoryError> {
        let rows = sqlx::query(
            "SELECT id, user_id, query, response, created_at FROM exchanges \
             WHERE user_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| HistoryError::Read(e.to_string()))?;

        rows.iter()
            .map(|row| {
                ExchangeRow::from_row(row)
                    .map_err(|e| HistoryError::Read(e.to_string()))?
                    .into_record()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    async fn test_repo() -> (SqliteHistoryRepository, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = crate::sqlite::pool::database_url(dir.path());
        let pool = DatabasePool::new(&url).await.unwrap();
        (SqliteHistoryRepository::new(pool), dir)
    }

    fn record(user: &str, query: &str, at: DateTime<Utc>) -> ExchangeRecord {
        ExchangeRecord::new(UserId::new(user), query, Some(format!("re: {query}")), at)
    }

    #[tokio::test]
    async fn test_append_and_list() {
        let (repo, _dir) = test_repo().await;
        let rec = record("u1", "sci-fi books", Utc::now());

        repo.append(&rec).await.unwrap();
        let listed = repo.list_all(&UserId::new("u1")).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, rec.id);
        assert_eq!(listed[0].query, "sci-fi books");
        assert_eq!(listed[0].response.as_deref(), Some("re: sci-fi books"));
        // Stored at microsecond precision.
        assert_eq!(listed[0].created_at.timestamp_micros(), rec.created_at.timestamp_micros());
    }

    #[tokio::test]
    async fn test_list_is_ascending_regardless_of_insert_order() {
        let (repo, _dir) = test_repo().await;
        let t0 = Utc.with_ymd_and_hms(2026, 3, 1, 9, 59, 58).unwrap();

        // 9:59:58, 10:00:05, 10:00:00 inserted out of order; the string
        // form must still sort by time.
        repo.append(&record("u1", "second", t0 + Duration::seconds(2)))
            .await
            .unwrap();
        repo.append(&record("u1", "third", t0 + Duration::seconds(7)))
            .await
            .unwrap();
        repo.append(&record("u1", "first", t0)).await.unwrap();

        let queries: Vec<String> = repo
            .list_all(&UserId::new("u1"))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.query)
            .collect();
        assert_eq!(queries, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_list_filters_by_user() {
        let (repo, _dir) = test_repo().await;
        repo.append(&record("u1", "mine", Utc::now())).await.unwrap();
        repo.append(&record("u2", "theirs", Utc::now())).await.unwrap();

        let listed = repo.list_all(&UserId::new("u1")).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].query, "mine");

        assert!(repo.list_all(&UserId::new("nobody")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_equal_timestamps_order_by_id() {
        let (repo, _dir) = test_repo().await;
        let at = Utc::now();
        let a = record("u1", "a", at);
        let b = record("u1", "b", at);

        repo.append(&b).await.unwrap();
        repo.append(&a).await.unwrap();

        let ids: Vec<Uuid> = repo
            .list_all(&UserId::new("u1"))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_write_error() {
        let (repo, _dir) = test_repo().await;
        let rec = record("u1", "once", Utc::now());
        repo.append(&rec).await.unwrap();

        let err = repo.append(&rec).await.unwrap_err();
        assert!(matches!(err, HistoryError::Write(_)));
    }

    #[tokio::test]
    async fn test_record_without_response() {
        let (repo, _dir) = test_repo().await;
        let rec = ExchangeRecord::new(UserId::new("u1"), "orphan", None, Utc::now());
        repo.append(&rec).await.unwrap();

        let listed = repo.list_all(&UserId::new("u1")).await.unwrap();
        assert_eq!(listed[0].response, None);
        assert_eq!(listed[0].clone().into_messages().len(), 1);
    }

    #[test]
    fn test_format_datetime_is_fixed_width() {
        let whole = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_datetime(&whole), "2026-01-02T03:04:05.000000Z");
        let fractional = whole + Duration::microseconds(120);
        assert_eq!(format_datetime(&fractional).len(), format_datetime(&whole).len());
    }
}
