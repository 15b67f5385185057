//! Concurrency Journey
//!
//! Several sessions share one database. Ratings for different items never
//! interfere, and ratings racing on the same item never lose an update.

use std::sync::{Arc, Barrier};
use std::thread;

use chrono::Utc;
use incrementum_core::{
    ItemKind, ItemStore, ReviewError, ReviewService, SchedulerConfig, StorageError,
};
use incrementum_e2e_tests::{TestDataFactory, TestDatabaseManager};

const THREADS: usize = 8;

#[test]
fn test_distinct_items_rated_in_parallel() {
    let db = TestDatabaseManager::new_temp();
    let ids = db.seed_documents(THREADS);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = ids
        .iter()
        .cloned()
        .map(|id| {
            let storage = Arc::clone(&db.storage);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let service = ReviewService::new(storage, SchedulerConfig::default()).unwrap();
                barrier.wait();
                service.submit_document_rating(&id, 3, None, Utc::now())
            })
        })
        .collect();

    for handle in handles {
        let outcome = handle.join().unwrap().unwrap();
        assert_eq!(outcome.item.revision(), 1);
    }

    for id in &ids {
        let item = db.storage.get_item(ItemKind::Document, id).unwrap().unwrap();
        assert_eq!(item.reps(), 1);
        assert_eq!(db.storage.review_logs_for(id).unwrap().len(), 1);
    }
}

#[test]
fn test_racing_ratings_never_lose_updates() {
    let db = TestDatabaseManager::new_temp();
    let item = TestDataFactory::create_learning_item(&db.storage, "Contended card");
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let storage = Arc::clone(&db.storage);
            let barrier = Arc::clone(&barrier);
            let id = item.id.clone();
            thread::spawn(move || {
                let service = ReviewService::new(storage, SchedulerConfig::default()).unwrap();
                barrier.wait();
                service.submit_learning_item_rating(&id, 3, None, Utc::now())
            })
        })
        .collect();

    let mut committed = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(_) => committed += 1,
            Err(ReviewError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert!(committed >= 1);
    assert_eq!(committed + conflicts, THREADS);

    // Every committed rating is visible exactly once
    let stored = db
        .storage
        .get_item(ItemKind::LearningItem, &item.id)
        .unwrap()
        .unwrap();
    assert_eq!(stored.revision(), committed as i64);
    assert_eq!(stored.reps() as usize, committed);
    assert_eq!(db.storage.review_logs_for(&item.id).unwrap().len(), committed);
}

#[test]
fn test_stale_write_is_rejected() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let doc = TestDataFactory::create_document(&db.storage, "Read twice");

    let stale = db.storage.find_item(&doc.id).unwrap().unwrap();
    service.submit_document_rating(&doc.id, 4, None, Utc::now()).unwrap();

    let err = db.storage.save_scheduling(&stale, stale.revision()).unwrap_err();
    assert!(matches!(
        err,
        StorageError::Conflict { expected: 0, actual: 1, .. }
    ));

    // The committed rating is untouched
    let stored = db.storage.find_item(&doc.id).unwrap().unwrap();
    assert_eq!(stored.reps(), 1);
    assert_eq!(stored.revision(), 1);
}

#[test]
fn test_second_connection_sees_committed_ratings() {
    let db = TestDatabaseManager::new_temp();
    let other = Arc::new(db.reopen());
    let doc = TestDataFactory::create_document(&db.storage, "Shared file");

    let first = db.service();
    let second = ReviewService::new(Arc::clone(&other), SchedulerConfig::default()).unwrap();

    let now = Utc::now();
    first.submit_document_rating(&doc.id, 3, None, now).unwrap();
    let outcome = second.submit_document_rating(&doc.id, 3, None, now).unwrap();

    assert_eq!(outcome.update.reps, 2);
    assert_eq!(outcome.item.revision(), 2);
    assert_eq!(first.review_history(&doc.id).unwrap().len(), 2);
}
