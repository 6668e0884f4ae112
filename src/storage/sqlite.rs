use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

use super::{MessageDraft, OutreachStore};
use crate::config::DatabaseConfig;
use crate::error::{StorageError, StorageResult};
use crate::feedback::{CorrectionEvent, FeedbackHistory, MeetingRecord, ReplyRecord, TouchRecord};

/// Static migrator that embeds migrations at compile time
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// SQLite-backed store.
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

/// Fixed-width UTC timestamps so text comparison matches time order.
fn ts(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl SqliteStorage {
    /// Open (creating if needed) the database file and run migrations.
    pub async fn new(config: &DatabaseConfig) -> StorageResult<Self> {
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StorageError::Connection {
                message: format!("Failed to create database directory: {}", e),
            })?;
        }

        let database_url = format!("sqlite://{}?mode=rwc", config.path.display());

        let options = SqliteConnectOptions::from_str(&database_url)
            .map_err(|e| StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            })?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to connect to database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;

        Ok(storage)
    }

    /// Private in-memory database. One connection, so every query sees the
    /// same data.
    pub async fn new_in_memory() -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:").map_err(|e| {
            StorageError::Connection {
                message: format!("Invalid database URL: {}", e),
            }
        })?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Connection {
                message: format!("Failed to open in-memory database: {}", e),
            })?;

        let storage = Self { pool };
        storage.run_migrations().await?;
        Ok(storage)
    }

    async fn run_migrations(&self) -> StorageResult<()> {
        info!("Running database migrations...");

        MIGRATOR.run(&self.pool).await.map_err(|e| StorageError::Migration {
            message: format!("Failed to run migrations: {}", e),
        })?;

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl OutreachStore for SqliteStorage {
    async fn save_drafts(&self, drafts: &[MessageDraft]) -> StorageResult<usize> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for draft in drafts {
            let result = sqlx::query(
                r#"
                INSERT OR IGNORE INTO message_drafts
                    (id, contact_id, channel, touch_number, touch_type, subject_line, body,
                     personalization_score, proof_point_used, pain_hook, word_count,
                     approval_status, created_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&draft.id)
            .bind(&draft.contact_id)
            .bind(&draft.channel)
            .bind(i64::from(draft.touch_number))
            .bind(&draft.touch_type)
            .bind(&draft.subject_line)
            .bind(&draft.body)
            .bind(i64::from(draft.personalization_score))
            .bind(&draft.proof_point_used)
            .bind(&draft.pain_hook)
            .bind(draft.word_count as i64)
            .bind(draft.approval_status.to_string())
            .bind(ts(&draft.created_at))
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        debug!(offered = drafts.len(), inserted, "Saved drafts");
        Ok(inserted as usize)
    }

    async fn list_drafts(&self, contact_id: &str) -> StorageResult<Vec<MessageDraft>> {
        let rows: Vec<DraftRow> = sqlx::query_as(
            r#"
            SELECT id, contact_id, channel, touch_number, touch_type, subject_line, body,
                   personalization_score, proof_point_used, pain_hook, word_count,
                   approval_status, created_at
            FROM message_drafts
            WHERE contact_id = ?
            ORDER BY touch_number ASC, created_at ASC
            "#,
        )
        .bind(contact_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn record_touchpoint(&self, touch: &TouchRecord) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO touchpoints
                (id, contact_id, channel, touch_number, proof_point_used, pain_hook,
                 opener_style, ab_group, sent_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&touch.id)
        .bind(&touch.contact_id)
        .bind(&touch.channel)
        .bind(touch.touch_number.map(i64::from))
        .bind(&touch.proof_point_used)
        .bind(&touch.pain_hook)
        .bind(&touch.opener_style)
        .bind(&touch.ab_group)
        .bind(ts(&touch.sent_at))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_reply(&self, reply: &ReplyRecord) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO replies (id, touchpoint_id, contact_id, intent, text, replied_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&reply.touchpoint_id)
        .bind(&reply.contact_id)
        .bind(&reply.intent)
        .bind(&reply.text)
        .bind(ts(&reply.replied_at))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_meeting(&self, meeting: &MeetingRecord) -> StorageResult<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO opportunities (id, contact_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&meeting.contact_id)
        .bind(ts(&meeting.created_at))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn load_history(&self, since: DateTime<Utc>) -> StorageResult<FeedbackHistory> {
        let since = ts(&since);

        let touches: Vec<TouchRow> = sqlx::query_as(
            r#"
            SELECT id, contact_id, channel, touch_number, proof_point_used, pain_hook,
                   opener_style, ab_group, sent_at
            FROM touchpoints
            WHERE sent_at >= ?
            ORDER BY sent_at ASC
            "#,
        )
        .bind(&since)
        .fetch_all(&self.pool)
        .await?;

        let replies: Vec<ReplyRow> = sqlx::query_as(
            r#"
            SELECT touchpoint_id, contact_id, intent, text, replied_at
            FROM replies
            WHERE replied_at >= ?
            ORDER BY replied_at ASC
            "#,
        )
        .bind(&since)
        .fetch_all(&self.pool)
        .await?;

        let meetings: Vec<MeetingRow> = sqlx::query_as(
            r#"
            SELECT contact_id, created_at
            FROM opportunities
            WHERE created_at >= ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(&since)
        .fetch_all(&self.pool)
        .await?;

        Ok(FeedbackHistory {
            touches: touches.into_iter().map(|r| r.into()).collect(),
            replies: replies.into_iter().map(|r| r.into()).collect(),
            meetings: meetings.into_iter().map(|r| r.into()).collect(),
        })
    }

    async fn append_correction(&self, event: &CorrectionEvent) -> StorageResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO research_corrections
                (id, contact_id, field, original_value, corrected_value, source, confidence, recorded_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&event.id)
        .bind(&event.contact_id)
        .bind(&event.field)
        .bind(&event.original_value)
        .bind(&event.corrected_value)
        .bind(&event.source)
        .bind(event.confidence)
        .bind(ts(&event.recorded_at))
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_corrections(&self, contact_id: Option<&str>) -> StorageResult<Vec<CorrectionEvent>> {
        let rows: Vec<CorrectionRow> = sqlx::query_as(
            r#"
            SELECT id, contact_id, field, original_value, corrected_value, source, confidence, recorded_at
            FROM research_corrections
            WHERE ?1 IS NULL OR contact_id = ?1
            ORDER BY rowid ASC
            "#,
        )
        .bind(contact_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }
}

// Internal row types for SQLx mapping
#[derive(sqlx::FromRow)]
struct DraftRow {
    id: String,
    contact_id: String,
    channel: String,
    touch_number: i64,
    touch_type: String,
    subject_line: Option<String>,
    body: String,
    personalization_score: i64,
    proof_point_used: Option<String>,
    pain_hook: Option<String>,
    word_count: i64,
    approval_status: String,
    created_at: String,
}

impl From<DraftRow> for MessageDraft {
    fn from(row: DraftRow) -> Self {
        Self {
            id: row.id,
            contact_id: row.contact_id,
            channel: row.channel,
            touch_number: u8::try_from(row.touch_number).unwrap_or_default(),
            touch_type: row.touch_type,
            subject_line: row.subject_line,
            body: row.body,
            personalization_score: u8::try_from(row.personalization_score).unwrap_or_default(),
            proof_point_used: row.proof_point_used,
            pain_hook: row.pain_hook,
            word_count: usize::try_from(row.word_count).unwrap_or_default(),
            approval_status: row.approval_status.parse().unwrap_or_default(),
            created_at: parse_ts(&row.created_at),
        }
    }
}

#[derive(sqlx::FromRow)]
struct TouchRow {
    id: String,
    contact_id: String,
    channel: Option<String>,
    touch_number: Option<i64>,
    proof_point_used: Option<String>,
    pain_hook: Option<String>,
    opener_style: Option<String>,
    ab_group: Option<String>,
    sent_at: String,
}

impl From<TouchRow> for TouchRecord {
    fn from(row: TouchRow) -> Self {
        Self {
            id: row.id,
            contact_id: row.contact_id,
            channel: row.channel,
            touch_number: row.touch_number.and_then(|n| u8::try_from(n).ok()),
            proof_point_used: row.proof_point_used,
            pain_hook: row.pain_hook,
            opener_style: row.opener_style,
            ab_group: row.ab_group,
            sent_at: parse_ts(&row.sent_at),
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReplyRow {
    touchpoint_id: Option<String>,
    contact_id: String,
    intent: String,
    text: String,
    replied_at: String,
}

impl From<ReplyRow> for ReplyRecord {
    fn from(row: ReplyRow) -> Self {
        Self {
            touchpoint_id: row.touchpoint_id,
            contact_id: row.contact_id,
            intent: row.intent,
            text: row.text,
            replied_at: parse_ts(&row.replied_at),
        }
    }
}

#[derive(sqlx::FromRow)]
struct MeetingRow {
    contact_id: String,
    created_at: String,
}

impl From<MeetingRow> for MeetingRecord {
    fn from(row: MeetingRow) -> Self {
        Self {
            contact_id: row.contact_id,
            created_at: parse_ts(&row.created_at),
        }
    }
}

#[derive(sqlx::FromRow)]
struct CorrectionRow {
    id: String,
    contact_id: String,
    field: String,
    original_value: String,
    corrected_value: String,
    source: String,
    confidence: f64,
    recorded_at: String,
}

impl From<CorrectionRow> for CorrectionEvent {
    fn from(row: CorrectionRow) -> Self {
        Self {
            id: row.id,
            contact_id: row.contact_id,
            field: row.field,
            original_value: row.original_value,
            corrected_value: row.corrected_value,
            source: row.source,
            confidence: row.confidence,
            recorded_at: parse_ts(&row.recorded_at),
        }
    }
}
