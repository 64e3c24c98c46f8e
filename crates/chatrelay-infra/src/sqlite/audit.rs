//! SQLite chat audit log implementation.
//!
//! One append-only `chat_log` row per processed exchange, plus the read
//! queries used by the `log` command.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use uuid::Uuid;

use chatrelay_core::repository::audit::AuditSink;
use chatrelay_types::audit::{AuditRecord, MessageKind};
use chatrelay_types::error::RepositoryError;

use super::pool::DatabasePool;

/// SQLite-backed chat audit log.
#[derive(Clone)]
pub struct SqliteAuditLog {
    pool: DatabasePool,
}

impl SqliteAuditLog {
    /// Create a new audit log backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Most recent records first, optionally restricted to one user.
    pub async fn recent(
        &self,
        user_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<AuditRecord>, RepositoryError> {
        let rows = match user_id {
            Some(user_id) => {
                sqlx::query(
                    "SELECT * FROM chat_log WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
                )
                .bind(user_id)
                .bind(i64::from(limit))
                .fetch_all(&self.pool.reader)
                .await
            }
            None => {
                sqlx::query("SELECT * FROM chat_log ORDER BY created_at DESC, id DESC LIMIT ?")
                    .bind(i64::from(limit))
                    .fetch_all(&self.pool.reader)
                    .await
            }
        }
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows_to_records(&rows)
    }

    /// Total number of logged exchanges.
    pub async fn count(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chat_log")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(count.max(0) as u64)
    }
}

impl AuditSink for SqliteAuditLog {
    async fn append(&self, record: &AuditRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"INSERT INTO chat_log (id, created_at, user_id, msg_type, user_content, reply_content)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(record.id.to_string())
        .bind(format_datetime(&record.timestamp))
        .bind(&record.user_id)
        .bind(record.kind.to_string())
        .bind(&record.input_summary)
        .bind(&record.output_text)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Private Row types
// ---------------------------------------------------------------------------

struct ChatLogRow {
    id: String,
    created_at: String,
    user_id: String,
    msg_type: String,
    user_content: String,
    reply_content: String,
}

impl ChatLogRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            created_at: row.try_get("created_at")?,
            user_id: row.try_get("user_id")?,
            msg_type: row.try_get("msg_type")?,
            user_content: row.try_get("user_content")?,
            reply_content: row.try_get("reply_content")?,
        })
    }

    fn into_record(self) -> Result<AuditRecord, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid chat_log id: {e}")))?;
        let kind: MessageKind = self
            .msg_type
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let timestamp = parse_datetime(&self.created_at)?;

        Ok(AuditRecord {
            id,
            timestamp,
            user_id: self.user_id,
            kind,
            input_summary: self.user_content,
            output_text: self.reply_content,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width RFC 3339 so that `ORDER BY created_at` sorts chronologically.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn rows_to_records(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<AuditRecord>, RepositoryError> {
    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let chat_row =
            ChatLogRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
        records.push(chat_row.into_record()?);
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    #[tokio::test]
    async fn test_append_and_read_back() {
        let log = SqliteAuditLog::new(test_pool().await);
        let record = AuditRecord::new("U1", MessageKind::Text, "hello", "hi there");
        log.append(&record).await.unwrap();

        let records = log.recent(None, 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, record.id);
        assert_eq!(records[0].user_id, "U1");
        assert_eq!(records[0].kind, MessageKind::Text);
        assert_eq!(records[0].input_summary, "hello");
        assert_eq!(records[0].output_text, "hi there");
        assert_eq!(
            records[0].timestamp.timestamp_micros(),
            record.timestamp.timestamp_micros()
        );
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_filtered() {
        let log = SqliteAuditLog::new(test_pool().await);
        for n in 0..3 {
            let record = AuditRecord::new("U1", MessageKind::Text, format!("q{n}"), "a");
            log.append(&record).await.unwrap();
        }
        let image = AuditRecord::new(
            "U2",
            MessageKind::Image,
            "upload/image/U2/20250101_120000_000.jpg",
            "a cat",
        );
        log.append(&image).await.unwrap();

        let mine = log.recent(Some("U1"), 10).await.unwrap();
        let inputs: Vec<&str> = mine.iter().map(|r| r.input_summary.as_str()).collect();
        assert_eq!(inputs, vec!["q2", "q1", "q0"]);

        let limited = log.recent(None, 2).await.unwrap();
        assert_eq!(limited.len(), 2);
        assert_eq!(limited[0].kind, MessageKind::Image);

        assert!(log.recent(Some("nobody"), 10).await.unwrap().is_empty());
        assert_eq!(log.count().await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_concurrent_appends() {
        let log = Arc::new(SqliteAuditLog::new(test_pool().await));
        let mut handles = Vec::new();
        for n in 0..20 {
            let log = Arc::clone(&log);
            handles.push(tokio::spawn(async move {
                let record =
                    AuditRecord::new(format!("U{}", n % 4), MessageKind::Text, "ping", "pong");
                log.append(&record).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(log.count().await.unwrap(), 20);
    }

    #[tokio::test]
    async fn test_check_constraint_rejects_unknown_kind() {
        let pool = test_pool().await;
        let result = sqlx::query(
            "INSERT INTO chat_log (id, created_at, user_id, msg_type, user_content, reply_content) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(Uuid::now_v7().to_string())
        .bind(format_datetime(&Utc::now()))
        .bind("U1")
        .bind("sticker")
        .bind("")
        .bind("")
        .execute(&pool.writer)
        .await;
        assert!(result.is_err());
    }
}
