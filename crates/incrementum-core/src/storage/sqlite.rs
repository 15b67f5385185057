//! SQLite Storage Implementation
//!
//! One writer and one reader connection, each behind a mutex. Timestamps are
//! stored as fixed-width RFC 3339 text (nanoseconds, UTC `Z`), tags as JSON
//! arrays.

use chrono::{DateTime, SecondsFormat, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::PathBuf;
use std::sync::Mutex;

use super::{ItemStore, ReviewLog};
use crate::fsrs::{LearningState, Rating};
use crate::item::{
    Document, Extract, ItemKind, ItemType, LearningItem, MemoryState, ReviewableItem,
};

/// Database file name inside the data directory
pub const DATABASE_FILE: &str = "incrementum.db";

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Storage error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Item not found
    #[error("Item not found: {0}")]
    NotFound(String),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored revision moved since the item was read
    #[error("Revision conflict on {id}: expected {expected}, found {actual}")]
    Conflict {
        id: String,
        expected: i64,
        actual: i64,
    },
    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
    /// JSON column could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage result type
pub type Result<T> = std::result::Result<T, StorageError>;

// ============================================================================
// STORAGE
// ============================================================================

/// SQLite-backed item store
///
/// All methods take `&self`, so `Storage` is `Send + Sync` and can be shared
/// as `Arc<Storage>`.
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
}

impl Storage {
    /// Apply PRAGMAs and optional encryption to a connection
    fn configure_connection(conn: &Connection) -> Result<()> {
        #[cfg(feature = "encryption")]
        {
            if let Ok(key) = std::env::var("INCREMENTUM_ENCRYPTION_KEY") {
                if !key.is_empty() {
                    conn.pragma_update(None, "key", &key)?;
                }
            }
        }

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -16000;
             PRAGMA temp_store = MEMORY;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;

        Ok(())
    }

    /// Platform data directory (created if missing)
    pub fn default_data_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "incrementum", "core").ok_or_else(|| {
            StorageError::Init("Could not determine project directories".to_string())
        })?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o700);
            let _ = std::fs::set_permissions(data_dir, perms);
        }
        Ok(data_dir.to_path_buf())
    }

    /// Open (or create) the database
    ///
    /// `None` uses `incrementum.db` in the platform data directory.
    pub fn new(db_path: Option<PathBuf>) -> Result<Self> {
        let path = match db_path {
            Some(p) => p,
            None => Self::default_data_dir()?.join(DATABASE_FILE),
        };

        let writer_conn = Connection::open(&path)?;

        #[cfg(unix)]
        if path.exists() {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(&path, perms);
        }

        Self::configure_connection(&writer_conn)?;

        let applied = super::migrations::apply_migrations(&writer_conn)?;
        if applied > 0 {
            tracing::debug!(path = %path.display(), applied, "Database schema up to date");
        }

        let reader_conn = Connection::open(&path)?;
        Self::configure_connection(&reader_conn)?;

        Ok(Self {
            writer: Mutex::new(writer_conn),
            reader: Mutex::new(reader_conn),
        })
    }

    fn table_name(kind: ItemKind) -> &'static str {
        match kind {
            ItemKind::Document => "documents",
            ItemKind::Extract => "extracts",
            ItemKind::LearningItem => "learning_items",
        }
    }

    // ========================================================================
    // INSERTS
    // ========================================================================

    pub fn insert_document(&self, doc: &Document) -> Result<()> {
        let tags = serde_json::to_string(&doc.tags)?;
        let writer = self.writer.lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        writer.execute(
            "INSERT INTO documents (
                id, title, category, tags, date_added, date_modified, date_last_reviewed,
                priority_rating, priority_slider, priority_score, is_archived,
                next_reading_date, reading_count, stability, difficulty, reps, lapses,
                total_time_spent, revision
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            params![
                doc.id,
                doc.title,
                doc.category,
                tags,
                to_sql_timestamp(doc.date_added),
                to_sql_timestamp(doc.date_modified),
                doc.date_last_reviewed.map(to_sql_timestamp),
                doc.priority_rating,
                doc.priority_slider,
                doc.priority_score,
                doc.is_archived,
                doc.next_reading_date.map(to_sql_timestamp),
                doc.reading_count,
                doc.stability,
                doc.difficulty,
                doc.reps,
                doc.lapses,
                doc.total_time_spent.map(to_sql_i64),
                doc.revision,
            ],
        )?;
        Ok(())
    }

    pub fn insert_extract(&self, extract: &Extract) -> Result<()> {
        let tags = serde_json::to_string(&extract.tags)?;
        let memory = extract.memory_state;
        let writer = self.writer.lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        writer.execute(
            "INSERT INTO extracts (
                id, document_id, content, page_title, page_number, notes, tags, category,
                priority, date_created, date_modified, memory_stability, memory_difficulty,
                next_review_date, last_review_date, review_count, reps, lapses, revision
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            params![
                extract.id,
                extract.document_id,
                extract.content,
                extract.page_title,
                extract.page_number,
                extract.notes,
                tags,
                extract.category,
                extract.priority,
                to_sql_timestamp(extract.date_created),
                to_sql_timestamp(extract.date_modified),
                memory.map(|m| m.stability),
                memory.map(|m| m.difficulty),
                extract.next_review_date.map(to_sql_timestamp),
                extract.last_review_date.map(to_sql_timestamp),
                extract.review_count,
                extract.reps,
                extract.lapses,
                extract.revision,
            ],
        )?;
        Ok(())
    }

    pub fn insert_learning_item(&self, item: &LearningItem) -> Result<()> {
        let tags = serde_json::to_string(&item.tags)?;
        let memory = item.memory_state;
        let writer = self.writer.lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        writer.execute(
            "INSERT INTO learning_items (
                id, extract_id, document_id, item_type, question, answer, tags, is_suspended,
                date_created, date_modified, due_date, interval, last_review_date,
                review_count, lapses, state, memory_stability, memory_difficulty, revision
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
            params![
                item.id,
                item.extract_id,
                item.document_id,
                item.item_type.as_str(),
                item.question,
                item.answer,
                tags,
                item.is_suspended,
                to_sql_timestamp(item.date_created),
                to_sql_timestamp(item.date_modified),
                to_sql_timestamp(item.due_date),
                item.interval,
                item.last_review_date.map(to_sql_timestamp),
                item.review_count,
                item.lapses,
                item.state.as_str(),
                memory.map(|m| m.stability),
                memory.map(|m| m.difficulty),
                item.revision,
            ],
        )?;
        Ok(())
    }

    // ========================================================================
    // FLAGS & DELETION
    // ========================================================================

    /// Suspend or resume a learning item. Returns false if it does not exist.
    pub fn set_suspended(&self, id: &str, suspended: bool) -> Result<bool> {
        let writer = self.writer.lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        let rows = writer.execute(
            "UPDATE learning_items SET is_suspended = ?1, date_modified = ?2 WHERE id = ?3",
            params![suspended, to_sql_timestamp(Utc::now()), id],
        )?;
        Ok(rows > 0)
    }

    /// Archive or restore a document. Returns false if it does not exist.
    pub fn set_archived(&self, id: &str, archived: bool) -> Result<bool> {
        let writer = self.writer.lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        let rows = writer.execute(
            "UPDATE documents SET is_archived = ?1, date_modified = ?2 WHERE id = ?3",
            params![archived, to_sql_timestamp(Utc::now()), id],
        )?;
        Ok(rows > 0)
    }

    /// Delete an item together with its review log
    pub fn delete_item(&self, kind: ItemKind, id: &str) -> Result<bool> {
        let mut writer = self.writer.lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        let tx = writer.transaction()?;
        let rows = tx.execute(
            &format!("DELETE FROM {} WHERE id = ?1", Self::table_name(kind)),
            params![id],
        )?;
        if rows > 0 {
            tx.execute("DELETE FROM review_logs WHERE item_id = ?1", params![id])?;
        }
        tx.commit()?;
        Ok(rows > 0)
    }

    // ========================================================================
    // SCHEDULING WRITES
    // ========================================================================

    fn write_scheduling(conn: &Connection, item: &ReviewableItem, expected_revision: i64) -> Result<i64> {
        let rows = match item {
            ReviewableItem::Document(doc) => conn.execute(
                "UPDATE documents SET
                    next_reading_date = ?1,
                    stability = ?2,
                    difficulty = ?3,
                    reps = ?4,
                    lapses = ?5,
                    reading_count = ?6,
                    date_last_reviewed = ?7,
                    total_time_spent = ?8,
                    date_modified = ?9,
                    revision = revision + 1
                WHERE id = ?10 AND revision = ?11",
                params![
                    doc.next_reading_date.map(to_sql_timestamp),
                    doc.stability,
                    doc.difficulty,
                    doc.reps,
                    doc.lapses,
                    doc.reading_count,
                    doc.date_last_reviewed.map(to_sql_timestamp),
                    doc.total_time_spent.map(to_sql_i64),
                    to_sql_timestamp(doc.date_modified),
                    doc.id,
                    expected_revision,
                ],
            )?,
            ReviewableItem::Extract(extract) => {
                let memory = extract.memory_state;
                conn.execute(
                    "UPDATE extracts SET
                        memory_stability = ?1,
                        memory_difficulty = ?2,
                        next_review_date = ?3,
                        last_review_date = ?4,
                        review_count = ?5,
                        reps = ?6,
                        lapses = ?7,
                        date_modified = ?8,
                        revision = revision + 1
                    WHERE id = ?9 AND revision = ?10",
                    params![
                        memory.map(|m| m.stability),
                        memory.map(|m| m.difficulty),
                        extract.next_review_date.map(to_sql_timestamp),
                        extract.last_review_date.map(to_sql_timestamp),
                        extract.review_count,
                        extract.reps,
                        extract.lapses,
                        to_sql_timestamp(extract.date_modified),
                        extract.id,
                        expected_revision,
                    ],
                )?
            }
            ReviewableItem::LearningItem(li) => {
                let memory = li.memory_state;
                conn.execute(
                    "UPDATE learning_items SET
                        due_date = ?1,
                        interval = ?2,
                        memory_stability = ?3,
                        memory_difficulty = ?4,
                        last_review_date = ?5,
                        review_count = ?6,
                        lapses = ?7,
                        state = ?8,
                        date_modified = ?9,
                        revision = revision + 1
                    WHERE id = ?10 AND revision = ?11",
                    params![
                        to_sql_timestamp(li.due_date),
                        li.interval,
                        memory.map(|m| m.stability),
                        memory.map(|m| m.difficulty),
                        li.last_review_date.map(to_sql_timestamp),
                        li.review_count,
                        li.lapses,
                        li.state.as_str(),
                        to_sql_timestamp(li.date_modified),
                        li.id,
                        expected_revision,
                    ],
                )?
            }
        };

        if rows > 0 {
            return Ok(expected_revision + 1);
        }

        // Nothing matched: tell a missing row apart from a stale revision
        let actual: Option<i64> = conn
            .query_row(
                &format!("SELECT revision FROM {} WHERE id = ?1", Self::table_name(item.kind())),
                params![item.id()],
                |row| row.get(0),
            )
            .optional()?;

        match actual {
            None => Err(StorageError::NotFound(item.id().to_string())),
            Some(actual) => {
                tracing::warn!(
                    id = item.id(),
                    expected = expected_revision,
                    actual,
                    "Revision conflict, scheduling not saved"
                );
                Err(StorageError::Conflict {
                    id: item.id().to_string(),
                    expected: expected_revision,
                    actual,
                })
            }
        }
    }

    fn insert_review_log(conn: &Connection, log: &ReviewLog) -> Result<()> {
        conn.execute(
            "INSERT INTO review_logs (
                item_id, item_kind, rating, state_before, elapsed_days, scheduled_days,
                time_taken_ms, reviewed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                log.item_id,
                log.kind.as_str(),
                log.rating.as_i32(),
                log.state_before.as_str(),
                log.elapsed_days,
                log.scheduled_days,
                log.time_taken_ms.map(to_sql_i64),
                to_sql_timestamp(log.reviewed_at),
            ],
        )?;
        Ok(())
    }

    // ========================================================================
    // ROW MAPPING
    // ========================================================================

    /// Parse RFC3339 timestamp
    fn parse_timestamp(value: &str, field_name: &str) -> rusqlite::Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| invalid_column(format!("Invalid {} timestamp '{}': {}", field_name, value, e)))
    }

    fn parse_optional_timestamp(
        value: Option<String>,
        field_name: &str,
    ) -> rusqlite::Result<Option<DateTime<Utc>>> {
        value
            .map(|s| Self::parse_timestamp(&s, field_name))
            .transpose()
    }

    fn parse_tags(row: &rusqlite::Row) -> rusqlite::Result<Vec<String>> {
        let tags_json: String = row.get("tags")?;
        Ok(serde_json::from_str(&tags_json).unwrap_or_default())
    }

    fn memory_state(row: &rusqlite::Row) -> rusqlite::Result<Option<MemoryState>> {
        let stability: Option<f64> = row.get("memory_stability")?;
        let difficulty: Option<f64> = row.get("memory_difficulty")?;
        Ok(match (stability, difficulty) {
            (Some(stability), Some(difficulty)) => Some(MemoryState { stability, difficulty }),
            _ => None,
        })
    }

    fn row_to_document(row: &rusqlite::Row) -> rusqlite::Result<Document> {
        let date_added: String = row.get("date_added")?;
        let date_modified: String = row.get("date_modified")?;
        let total_time_spent: Option<i64> = row.get("total_time_spent")?;

        let mut doc = Document::new(row.get::<_, String>("title")?);
        doc.id = row.get("id")?;
        doc.category = row.get("category")?;
        doc.tags = Self::parse_tags(row)?;
        doc.date_added = Self::parse_timestamp(&date_added, "date_added")?;
        doc.date_modified = Self::parse_timestamp(&date_modified, "date_modified")?;
        doc.date_last_reviewed =
            Self::parse_optional_timestamp(row.get("date_last_reviewed")?, "date_last_reviewed")?;
        doc.priority_rating = row.get("priority_rating")?;
        doc.priority_slider = row.get("priority_slider")?;
        doc.priority_score = row.get("priority_score")?;
        doc.is_archived = row.get("is_archived")?;
        doc.next_reading_date =
            Self::parse_optional_timestamp(row.get("next_reading_date")?, "next_reading_date")?;
        doc.reading_count = row.get("reading_count")?;
        doc.stability = row.get("stability")?;
        doc.difficulty = row.get("difficulty")?;
        doc.reps = row.get("reps")?;
        doc.lapses = row.get("lapses")?;
        doc.total_time_spent = total_time_spent.map(from_sql_i64);
        doc.revision = row.get("revision")?;
        Ok(doc)
    }

    fn row_to_extract(row: &rusqlite::Row) -> rusqlite::Result<Extract> {
        let date_created: String = row.get("date_created")?;
        let date_modified: String = row.get("date_modified")?;

        let mut extract = Extract::new(
            row.get::<_, String>("document_id")?,
            row.get::<_, String>("content")?,
        );
        extract.id = row.get("id")?;
        extract.page_title = row.get("page_title")?;
        extract.page_number = row.get("page_number")?;
        extract.notes = row.get("notes")?;
        extract.tags = Self::parse_tags(row)?;
        extract.category = row.get("category")?;
        extract.priority = row.get("priority")?;
        extract.date_created = Self::parse_timestamp(&date_created, "date_created")?;
        extract.date_modified = Self::parse_timestamp(&date_modified, "date_modified")?;
        extract.memory_state = Self::memory_state(row)?;
        extract.next_review_date =
            Self::parse_optional_timestamp(row.get("next_review_date")?, "next_review_date")?;
        extract.last_review_date =
            Self::parse_optional_timestamp(row.get("last_review_date")?, "last_review_date")?;
        extract.review_count = row.get("review_count")?;
        extract.reps = row.get("reps")?;
        extract.lapses = row.get("lapses")?;
        extract.revision = row.get("revision")?;
        Ok(extract)
    }

    fn row_to_learning_item(row: &rusqlite::Row) -> rusqlite::Result<LearningItem> {
        let item_type: String = row.get("item_type")?;
        let state: String = row.get("state")?;
        let date_created: String = row.get("date_created")?;
        let date_modified: String = row.get("date_modified")?;
        let due_date: String = row.get("due_date")?;

        let mut item = LearningItem::new(
            ItemType::parse_name(&item_type),
            row.get::<_, String>("question")?,
        );
        item.id = row.get("id")?;
        item.extract_id = row.get("extract_id")?;
        item.document_id = row.get("document_id")?;
        item.answer = row.get("answer")?;
        item.tags = Self::parse_tags(row)?;
        item.is_suspended = row.get("is_suspended")?;
        item.date_created = Self::parse_timestamp(&date_created, "date_created")?;
        item.date_modified = Self::parse_timestamp(&date_modified, "date_modified")?;
        item.due_date = Self::parse_timestamp(&due_date, "due_date")?;
        item.interval = row.get("interval")?;
        item.last_review_date =
            Self::parse_optional_timestamp(row.get("last_review_date")?, "last_review_date")?;
        item.review_count = row.get("review_count")?;
        item.lapses = row.get("lapses")?;
        item.state = LearningState::parse_name(&state);
        item.memory_state = Self::memory_state(row)?;
        item.revision = row.get("revision")?;
        Ok(item)
    }

    fn row_to_review_log(row: &rusqlite::Row) -> rusqlite::Result<ReviewLog> {
        let kind: String = row.get("item_kind")?;
        let rating: i32 = row.get("rating")?;
        let state_before: String = row.get("state_before")?;
        let reviewed_at: String = row.get("reviewed_at")?;
        let time_taken_ms: Option<i64> = row.get("time_taken_ms")?;

        Ok(ReviewLog {
            item_id: row.get("item_id")?,
            kind: ItemKind::parse_name(&kind)
                .ok_or_else(|| invalid_column(format!("Unknown item kind '{}'", kind)))?,
            rating: Rating::from_i32(rating)
                .ok_or_else(|| invalid_column(format!("Invalid stored rating {}", rating)))?,
            state_before: LearningState::parse_name(&state_before),
            elapsed_days: row.get("elapsed_days")?,
            scheduled_days: row.get("scheduled_days")?,
            time_taken_ms: time_taken_ms.map(from_sql_i64),
            reviewed_at: Self::parse_timestamp(&reviewed_at, "reviewed_at")?,
        })
    }

    fn query_logs(&self, sql: &str, params: impl rusqlite::Params) -> Result<Vec<ReviewLog>> {
        let reader = self.reader.lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let mut stmt = reader.prepare(sql)?;
        let logs = stmt
            .query_map(params, Self::row_to_review_log)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(logs)
    }
}

impl ItemStore for Storage {
    fn get_item(&self, kind: ItemKind, id: &str) -> Result<Option<ReviewableItem>> {
        let reader = self.reader.lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let sql = format!("SELECT * FROM {} WHERE id = ?1", Self::table_name(kind));
        let item = match kind {
            ItemKind::Document => reader
                .query_row(&sql, params![id], Self::row_to_document)
                .optional()?
                .map(ReviewableItem::Document),
            ItemKind::Extract => reader
                .query_row(&sql, params![id], Self::row_to_extract)
                .optional()?
                .map(ReviewableItem::Extract),
            ItemKind::LearningItem => reader
                .query_row(&sql, params![id], Self::row_to_learning_item)
                .optional()?
                .map(ReviewableItem::LearningItem),
        };
        Ok(item)
    }

    fn list_reviewable(&self) -> Result<Vec<ReviewableItem>> {
        let reader = self.reader.lock()
            .map_err(|_| StorageError::Init("Reader lock poisoned".into()))?;
        let mut items = Vec::new();

        let mut stmt = reader.prepare(
            "SELECT * FROM documents WHERE is_archived = 0 ORDER BY date_added ASC, rowid ASC",
        )?;
        for doc in stmt.query_map([], Self::row_to_document)? {
            items.push(ReviewableItem::Document(doc?));
        }

        let mut stmt = reader.prepare(
            "SELECT * FROM extracts ORDER BY date_created ASC, rowid ASC",
        )?;
        for extract in stmt.query_map([], Self::row_to_extract)? {
            items.push(ReviewableItem::Extract(extract?));
        }

        let mut stmt = reader.prepare(
            "SELECT * FROM learning_items WHERE is_suspended = 0 ORDER BY date_created ASC, rowid ASC",
        )?;
        for item in stmt.query_map([], Self::row_to_learning_item)? {
            items.push(ReviewableItem::LearningItem(item?));
        }

        Ok(items)
    }

    fn save_scheduling(&self, item: &ReviewableItem, expected_revision: i64) -> Result<i64> {
        let writer = self.writer.lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        Self::write_scheduling(&writer, item, expected_revision)
    }

    fn record_review(&self, log: &ReviewLog) -> Result<()> {
        let writer = self.writer.lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        Self::insert_review_log(&writer, log)
    }

    /// Both writes in one transaction
    fn commit_review(
        &self,
        item: &ReviewableItem,
        expected_revision: i64,
        log: &ReviewLog,
    ) -> Result<i64> {
        let mut writer = self.writer.lock()
            .map_err(|_| StorageError::Init("Writer lock poisoned".into()))?;
        let tx = writer.transaction()?;
        let revision = Self::write_scheduling(&tx, item, expected_revision)?;
        Self::insert_review_log(&tx, log)?;
        tx.commit()?;
        Ok(revision)
    }

    fn review_logs_for(&self, id: &str) -> Result<Vec<ReviewLog>> {
        self.query_logs(
            "SELECT * FROM review_logs WHERE item_id = ?1 ORDER BY reviewed_at DESC, id DESC",
            params![id],
        )
    }

    fn all_review_logs(&self) -> Result<Vec<ReviewLog>> {
        self.query_logs(
            "SELECT * FROM review_logs ORDER BY reviewed_at ASC, id ASC",
            params![],
        )
    }
}

fn invalid_column(message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
    )
}

/// Fixed-width RFC 3339 (nanoseconds, `Z`) so text order is time order
fn to_sql_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn to_sql_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn from_sql_i64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
