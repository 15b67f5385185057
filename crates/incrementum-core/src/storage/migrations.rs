//! Database Migrations
//!
//! Schema migration definitions for the storage layer.

/// Migration definitions
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "Initial schema: documents, extracts, learning items",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "Review log and lapse tracking for documents and extracts",
        up: MIGRATION_V2_UP,
    },
];

/// A database migration
#[derive(Debug, Clone)]
pub struct Migration {
    /// Version number
    pub version: u32,
    /// Description
    pub description: &'static str,
    /// SQL to apply
    pub up: &'static str,
}

/// V1: Initial schema
const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    category TEXT,
    tags TEXT NOT NULL DEFAULT '[]',
    date_added TEXT NOT NULL,
    date_modified TEXT NOT NULL,
    date_last_reviewed TEXT,
    priority_rating INTEGER NOT NULL DEFAULT 0,
    priority_slider INTEGER NOT NULL DEFAULT 50,
    priority_score REAL NOT NULL DEFAULT 25.0,
    is_archived INTEGER NOT NULL DEFAULT 0,

    -- Scheduling (NULL until first read)
    next_reading_date TEXT,
    reading_count INTEGER NOT NULL DEFAULT 0,
    stability REAL,
    difficulty REAL,
    reps INTEGER,
    total_time_spent INTEGER,

    revision INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_documents_next_reading ON documents(next_reading_date);
CREATE INDEX IF NOT EXISTS idx_documents_added ON documents(date_added);

CREATE TABLE IF NOT EXISTS extracts (
    id TEXT PRIMARY KEY,
    document_id TEXT NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    content TEXT NOT NULL,
    page_title TEXT,
    page_number INTEGER,
    notes TEXT,
    tags TEXT NOT NULL DEFAULT '[]',
    category TEXT,
    priority REAL NOT NULL DEFAULT 5.0,
    date_created TEXT NOT NULL,
    date_modified TEXT NOT NULL,

    -- FSRS memory state
    memory_stability REAL,
    memory_difficulty REAL,
    next_review_date TEXT,
    last_review_date TEXT,
    review_count INTEGER NOT NULL DEFAULT 0,
    reps INTEGER NOT NULL DEFAULT 0,

    revision INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_extracts_document ON extracts(document_id);
CREATE INDEX IF NOT EXISTS idx_extracts_next_review ON extracts(next_review_date);

CREATE TABLE IF NOT EXISTS learning_items (
    id TEXT PRIMARY KEY,
    extract_id TEXT REFERENCES extracts(id) ON DELETE SET NULL,
    document_id TEXT REFERENCES documents(id) ON DELETE SET NULL,
    item_type TEXT NOT NULL DEFAULT 'flashcard',
    question TEXT NOT NULL,
    answer TEXT,
    tags TEXT NOT NULL DEFAULT '[]',
    is_suspended INTEGER NOT NULL DEFAULT 0,
    date_created TEXT NOT NULL,
    date_modified TEXT NOT NULL,

    -- FSRS state
    due_date TEXT NOT NULL,
    interval REAL NOT NULL DEFAULT 0,
    last_review_date TEXT,
    review_count INTEGER NOT NULL DEFAULT 0,
    lapses INTEGER NOT NULL DEFAULT 0,
    state TEXT NOT NULL DEFAULT 'new',
    memory_stability REAL,
    memory_difficulty REAL,

    revision INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_learning_items_due ON learning_items(due_date);
CREATE INDEX IF NOT EXISTS idx_learning_items_extract ON learning_items(extract_id);

CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);

INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, datetime('now'));
"#;

/// V2: Review log, lapses on documents and extracts
///
/// Existing rows keep NULL lapses, read back as "never recorded".
const MIGRATION_V2_UP: &str = r#"
ALTER TABLE documents ADD COLUMN lapses INTEGER;
ALTER TABLE extracts ADD COLUMN lapses INTEGER;

CREATE TABLE IF NOT EXISTS review_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id TEXT NOT NULL,
    item_kind TEXT NOT NULL,
    rating INTEGER NOT NULL,
    state_before TEXT NOT NULL,
    elapsed_days INTEGER NOT NULL DEFAULT 0,
    scheduled_days REAL NOT NULL DEFAULT 0,
    time_taken_ms INTEGER,
    reviewed_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_review_logs_item ON review_logs(item_id);
CREATE INDEX IF NOT EXISTS idx_review_logs_reviewed_at ON review_logs(reviewed_at);

UPDATE schema_version SET version = 2, applied_at = datetime('now');
"#;

/// Get current schema version from database
pub fn get_current_version(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .or(Ok(0))
}

/// Apply pending migrations
pub fn apply_migrations(conn: &rusqlite::Connection) -> rusqlite::Result<u32> {
    let current_version = get_current_version(conn)?;
    let mut applied = 0;

    for migration in MIGRATIONS {
        if migration.version > current_version {
            tracing::info!(
                "Applying migration v{}: {}",
                migration.version,
                migration.description
            );

            conn.execute_batch(migration.up)?;
            applied += 1;
        }
    }

    Ok(applied)
}
