//! Test Database Manager
//!
//! Provides isolated database instances for testing:
//! - Temporary databases that are automatically cleaned up
//! - Pre-seeded databases with test data
//! - Reopening the same file to check persistence
//! - A shared `Arc<Storage>` for concurrent tests

use incrementum_core::{
    Document, ItemStore, ReviewService, SchedulerConfig, Storage,
};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Manager for test databases
///
/// Creates isolated database instances for each test to prevent interference.
/// Automatically cleans up temporary databases when dropped.
///
/// # Example
///
/// ```rust,ignore
/// let db = TestDatabaseManager::new_temp();
/// let service = db.service();
///
/// // Database is automatically deleted when `db` goes out of scope
/// ```
pub struct TestDatabaseManager {
    /// The storage instance
    pub storage: Arc<Storage>,
    /// Temporary directory (kept alive to prevent premature deletion)
    _temp_dir: Option<TempDir>,
    /// Path to the database file
    db_path: PathBuf,
}

impl TestDatabaseManager {
    /// Create a new test database in a temporary directory
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("test_incrementum.db");

        let storage = Storage::new(Some(db_path.clone())).expect("Failed to create test storage");

        Self {
            storage: Arc::new(storage),
            _temp_dir: Some(temp_dir),
            db_path,
        }
    }

    /// Create a test database at a specific path
    ///
    /// The database is NOT automatically deleted.
    pub fn new_at_path(path: PathBuf) -> Self {
        let storage = Storage::new(Some(path.clone())).expect("Failed to create test storage");

        Self {
            storage: Arc::new(storage),
            _temp_dir: None,
            db_path: path,
        }
    }

    /// Get the database path
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Review service over the shared storage with default settings
    pub fn service(&self) -> ReviewService<Arc<Storage>> {
        self.service_with(SchedulerConfig::default())
    }

    pub fn service_with(&self, config: SchedulerConfig) -> ReviewService<Arc<Storage>> {
        ReviewService::new(Arc::clone(&self.storage), config).expect("Invalid scheduler config")
    }

    /// Open a second, independent connection pair to the same file
    pub fn reopen(&self) -> Storage {
        Storage::new(Some(self.db_path.clone())).expect("Failed to reopen storage")
    }

    /// Number of items the queue can see
    pub fn reviewable_count(&self) -> usize {
        self.storage
            .list_reviewable()
            .map(|items| items.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.reviewable_count() == 0
    }

    // ========================================================================
    // SEEDING METHODS
    // ========================================================================

    /// Seed the database with unread documents, returning their ids
    pub fn seed_documents(&self, count: usize) -> Vec<String> {
        (0..count)
            .map(|i| {
                let doc = Document::new(format!("Seed document {}", i));
                self.storage
                    .insert_document(&doc)
                    .expect("Failed to seed document");
                doc.id
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_database_starts_empty() {
        let db = TestDatabaseManager::new_temp();
        assert!(db.is_empty());
        assert!(db.path().exists());
    }

    #[test]
    fn test_seed_and_reopen() {
        let db = TestDatabaseManager::new_temp();
        let ids = db.seed_documents(3);
        assert_eq!(ids.len(), 3);
        assert_eq!(db.reviewable_count(), 3);

        let reopened = db.reopen();
        assert_eq!(reopened.list_reviewable().unwrap().len(), 3);
    }
}
