//! Test Data Factory
//!
//! Provides utilities for generating realistic test data:
//! - Documents, extracts and learning items with chosen scheduling state
//! - Batch generation for queue tests
//! - Pre-built scenarios for common test cases

use chrono::{DateTime, Duration, Utc};
use incrementum_core::{
    Document, Extract, ItemKind, ItemType, LearningItem, LearningState, MemoryState, Storage,
};

/// Factory for creating test data
///
/// # Example
///
/// ```rust,ignore
/// let storage = Storage::new(Some(path))?;
///
/// let doc = TestDataFactory::create_document(&storage, "Gödel, Escher, Bach");
/// let scenario = TestDataFactory::create_mixed_queue(&storage, Utc::now());
/// ```
pub struct TestDataFactory;

/// Configuration for batch generation
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub documents: usize,
    pub extracts_per_document: usize,
    pub items_per_extract: usize,
    /// Base title prefix
    pub title_prefix: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            documents: 3,
            extracts_per_document: 2,
            items_per_extract: 2,
            title_prefix: "Batch".to_string(),
        }
    }
}

/// Scenario containing related test data
#[derive(Debug, Default)]
pub struct TestScenario {
    /// (kind, id) of every item that should be due
    pub due: Vec<(ItemKind, String)>,
    /// (kind, id) of every item that should NOT be due
    pub not_due: Vec<(ItemKind, String)>,
    /// Description of the scenario
    pub description: String,
}

impl TestDataFactory {
    // ========================================================================
    // SINGLE ITEM CREATION
    // ========================================================================

    pub fn create_document(storage: &Storage, title: &str) -> Document {
        let doc = Document::new(title);
        storage.insert_document(&doc).expect("Failed to insert document");
        doc
    }

    pub fn create_extract(storage: &Storage, document_id: &str, content: &str) -> Extract {
        let extract = Extract::new(document_id, content);
        storage.insert_extract(&extract).expect("Failed to insert extract");
        extract
    }

    pub fn create_learning_item(storage: &Storage, question: &str) -> LearningItem {
        let item = LearningItem::new(ItemType::Qa, question).with_answer("answer");
        storage
            .insert_learning_item(&item)
            .expect("Failed to insert learning item");
        item
    }

    /// A learning item in Review, last seen `stability` days before `now`
    /// and due at `now`
    pub fn create_mature_item(
        storage: &Storage,
        now: DateTime<Utc>,
        stability: f64,
        reps: u32,
    ) -> LearningItem {
        let mut item = LearningItem::new(ItemType::Basic, "Mature card");
        item.state = LearningState::Review;
        item.review_count = reps;
        item.interval = stability;
        item.memory_state = Some(MemoryState {
            stability,
            difficulty: 5.0,
        });
        item.last_review_date = Some(now - Duration::days(stability.round() as i64));
        item.due_date = now;
        storage
            .insert_learning_item(&item)
            .expect("Failed to insert learning item");
        item
    }

    /// A document read before, scheduled `days` away from `now`
    /// (negative = overdue)
    pub fn create_scheduled_document(
        storage: &Storage,
        title: &str,
        now: DateTime<Utc>,
        days: i64,
    ) -> Document {
        let mut doc = Document::new(title);
        doc.reps = Some(1);
        doc.reading_count = 1;
        doc.stability = Some(3.0);
        doc.difficulty = Some(5.0);
        doc.date_last_reviewed = Some(now + Duration::days(days) - Duration::days(3));
        doc.next_reading_date = Some(now + Duration::days(days));
        storage.insert_document(&doc).expect("Failed to insert document");
        doc
    }

    // ========================================================================
    // BATCHES & SCENARIOS
    // ========================================================================

    /// Documents, each with extracts, each with learning items. Everything
    /// is new (and therefore due).
    pub fn create_batch(storage: &Storage, config: &BatchConfig) -> TestScenario {
        let mut scenario = TestScenario {
            description: format!(
                "{} documents x {} extracts x {} items",
                config.documents, config.extracts_per_document, config.items_per_extract
            ),
            ..TestScenario::default()
        };

        for d in 0..config.documents {
            let doc = Self::create_document(storage, &format!("{} document {}", config.title_prefix, d));
            scenario.due.push((ItemKind::Document, doc.id.clone()));

            for e in 0..config.extracts_per_document {
                let extract = Self::create_extract(
                    storage,
                    &doc.id,
                    &format!("{} extract {}.{}", config.title_prefix, d, e),
                );
                scenario.due.push((ItemKind::Extract, extract.id.clone()));

                for i in 0..config.items_per_extract {
                    let item = LearningItem::new(
                        ItemType::Cloze,
                        format!("{} card {}.{}.{}", config.title_prefix, d, e, i),
                    )
                    .from_extract(&extract.id, &doc.id);
                    storage
                        .insert_learning_item(&item)
                        .expect("Failed to insert learning item");
                    scenario.due.push((ItemKind::LearningItem, item.id));
                }
            }
        }

        scenario
    }

    /// Overdue, due-now, future, archived and suspended items side by side
    pub fn create_mixed_queue(storage: &Storage, now: DateTime<Utc>) -> TestScenario {
        let mut scenario = TestScenario {
            description: "mixed due / not due / hidden items".to_string(),
            ..TestScenario::default()
        };

        let overdue = Self::create_scheduled_document(storage, "Overdue document", now, -4);
        scenario.due.push((ItemKind::Document, overdue.id.clone()));

        let future = Self::create_scheduled_document(storage, "Future document", now, 6);
        scenario.not_due.push((ItemKind::Document, future.id));

        let archived = Self::create_document(storage, "Archived document");
        storage.set_archived(&archived.id, true).expect("Failed to archive");
        scenario.not_due.push((ItemKind::Document, archived.id));

        let extract = Self::create_extract(storage, &overdue.id, "Fresh extract");
        scenario.due.push((ItemKind::Extract, extract.id));

        let mature = Self::create_mature_item(storage, now, 12.0, 4);
        scenario.due.push((ItemKind::LearningItem, mature.id));

        let suspended = Self::create_learning_item(storage, "Suspended card");
        storage.set_suspended(&suspended.id, true).expect("Failed to suspend");
        scenario.not_due.push((ItemKind::LearningItem, suspended.id));

        scenario
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use incrementum_core::ItemStore;
    use tempfile::tempdir;

    #[test]
    fn test_batch_counts() {
        let dir = tempdir().unwrap();
        let storage = Storage::new(Some(dir.path().join("fixtures.db"))).unwrap();

        let scenario = TestDataFactory::create_batch(&storage, &BatchConfig::default());
        assert_eq!(scenario.due.len(), 3 + 6 + 12);
        assert_eq!(storage.list_reviewable().unwrap().len(), scenario.due.len());
    }
}
