//! Storage Module
//!
//! Persistence gateway for reviewable items:
//! - `ItemStore` trait consumed by the review service
//! - SQLite implementation with WAL and versioned migrations
//! - Optimistic revision checks on scheduling writes
//! - Append-only review log

mod migrations;
mod sqlite;

pub use migrations::MIGRATIONS;
pub use sqlite::{Result, Storage, StorageError, DATABASE_FILE};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fsrs::{LearningState, Rating};
use crate::item::{ItemKind, ReviewableItem};

/// One committed grading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLog {
    pub item_id: String,
    pub kind: ItemKind,
    pub rating: Rating,
    /// State the item was in when graded
    pub state_before: LearningState,
    /// Whole days since the previous review
    pub elapsed_days: u32,
    /// Interval applied by this grading, in days
    pub scheduled_days: f64,
    /// Time the user spent on the item
    pub time_taken_ms: Option<u64>,
    pub reviewed_at: DateTime<Utc>,
}

/// Persistence operations the review service needs
pub trait ItemStore {
    /// Load one item of a known kind
    fn get_item(&self, kind: ItemKind, id: &str) -> Result<Option<ReviewableItem>>;

    /// Load an item by id, whatever its kind
    fn find_item(&self, id: &str) -> Result<Option<ReviewableItem>> {
        for kind in ItemKind::ALL {
            if let Some(item) = self.get_item(kind, id)? {
                return Ok(Some(item));
            }
        }
        Ok(None)
    }

    /// Every item eligible for the queue (not suspended, not archived),
    /// oldest first within each kind
    fn list_reviewable(&self) -> Result<Vec<ReviewableItem>>;

    /// Persist the scheduling fields of `item`
    ///
    /// Succeeds only when the stored revision equals `expected_revision`;
    /// returns the new revision.
    fn save_scheduling(&self, item: &ReviewableItem, expected_revision: i64) -> Result<i64>;

    /// Append a review log entry
    fn record_review(&self, log: &ReviewLog) -> Result<()>;

    /// Save scheduling and append the log entry
    fn commit_review(
        &self,
        item: &ReviewableItem,
        expected_revision: i64,
        log: &ReviewLog,
    ) -> Result<i64> {
        let revision = self.save_scheduling(item, expected_revision)?;
        self.record_review(log)?;
        Ok(revision)
    }

    /// Review history of one item, newest first
    fn review_logs_for(&self, id: &str) -> Result<Vec<ReviewLog>>;

    /// Every review log entry, oldest first
    fn all_review_logs(&self) -> Result<Vec<ReviewLog>>;
}

impl<T: ItemStore + ?Sized> ItemStore for std::sync::Arc<T> {
    fn get_item(&self, kind: ItemKind, id: &str) -> Result<Option<ReviewableItem>> {
        (**self).get_item(kind, id)
    }

    fn find_item(&self, id: &str) -> Result<Option<ReviewableItem>> {
        (**self).find_item(id)
    }

    fn list_reviewable(&self) -> Result<Vec<ReviewableItem>> {
        (**self).list_reviewable()
    }

    fn save_scheduling(&self, item: &ReviewableItem, expected_revision: i64) -> Result<i64> {
        (**self).save_scheduling(item, expected_revision)
    }

    fn record_review(&self, log: &ReviewLog) -> Result<()> {
        (**self).record_review(log)
    }

    fn commit_review(
        &self,
        item: &ReviewableItem,
        expected_revision: i64,
        log: &ReviewLog,
    ) -> Result<i64> {
        (**self).commit_review(item, expected_revision, log)
    }

    fn review_logs_for(&self, id: &str) -> Result<Vec<ReviewLog>> {
        (**self).review_logs_for(id)
    }

    fn all_review_logs(&self) -> Result<Vec<ReviewLog>> {
        (**self).all_review_logs()
    }
}
