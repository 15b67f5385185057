//! Queue Journey
//!
//! A reader opens the app, sees what is due, works through it and comes
//! back a week later.

use chrono::{Duration, Utc};
use incrementum_core::{ItemKind, QueueStats};
use incrementum_e2e_tests::{BatchConfig, TestDataFactory, TestDatabaseManager};

#[test]
fn test_empty_library_has_empty_queue() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();

    assert!(service.due_queue().unwrap().is_empty());
    assert_eq!(service.queue_stats().unwrap(), QueueStats::default());
}

#[test]
fn test_mixed_queue_shows_only_due_items() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let now = Utc::now();
    let scenario = TestDataFactory::create_mixed_queue(&db.storage, now);

    let queue = service.due_queue_at(now).unwrap();
    let ids: Vec<(ItemKind, String)> = queue.iter().map(|e| (e.kind, e.id.clone())).collect();
    assert_eq!(ids, scenario.due, "{}", scenario.description);

    for (_, hidden) in &scenario.not_due {
        assert!(!queue.iter().any(|e| &e.id == hidden));
    }
}

#[test]
fn test_stats_describe_the_queue() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let now = Utc::now();
    TestDataFactory::create_mixed_queue(&db.storage, now);

    let queue = service.due_queue_at(now).unwrap();
    let stats = service.queue_stats_at(now).unwrap();

    assert_eq!(stats.total_items, queue.len());
    assert_eq!(stats.due_today, 3);
    assert_eq!(stats.documents, 1);
    assert_eq!(stats.extracts, 1);
    assert_eq!(stats.learning_items, 1);
    // Only the extract was never graded
    assert_eq!(stats.new_items, 1);
    // The mature card is due exactly now, which is not overdue
    assert_eq!(stats.overdue, 1);
    assert_eq!(
        stats.total_estimated_time,
        queue.iter().map(|e| e.estimated_time).sum::<u32>()
    );
    assert_eq!(stats.total_estimated_time, 10 + 5 + 2);
}

#[test]
fn test_batch_queue_grouped_by_kind() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let scenario = TestDataFactory::create_batch(&db.storage, &BatchConfig::default());
    let now = Utc::now();

    let queue = service.due_queue_at(now).unwrap();
    assert_eq!(queue.len(), scenario.due.len());

    let expected: Vec<String> = ItemKind::ALL
        .iter()
        .flat_map(|kind| {
            scenario
                .due
                .iter()
                .filter(move |(k, _)| k == kind)
                .map(|(_, id)| id.clone())
        })
        .collect();
    let actual: Vec<String> = queue.iter().map(|e| e.id.clone()).collect();
    assert_eq!(actual, expected);

    let stats = service.queue_stats_at(now).unwrap();
    assert_eq!(stats.documents, 3);
    assert_eq!(stats.extracts, 6);
    assert_eq!(stats.learning_items, 12);
    assert_eq!(stats.new_items, 21);
    assert_eq!(stats.overdue, 0);
}

#[test]
fn test_working_through_the_queue_empties_it() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let now = Utc::now();
    TestDataFactory::create_mixed_queue(&db.storage, now);

    for entry in service.due_queue_at(now).unwrap() {
        let outcome = service.submit_rating(entry.kind, &entry.id, 3, None, now).unwrap();
        assert!(outcome.update.interval >= 1);
    }

    assert!(service.due_queue_at(now).unwrap().is_empty());
    assert_eq!(service.queue_stats_at(now).unwrap(), QueueStats::default());
}

#[test]
fn test_future_items_surface_later() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let now = Utc::now();
    let scenario = TestDataFactory::create_mixed_queue(&db.storage, now);

    let next_week = now + Duration::days(7);
    let queue = service.due_queue_at(next_week).unwrap();
    let visible = |id: &str| queue.iter().any(|e| e.id == id);

    // The future document is due by then, archived and suspended never are
    let (future, hidden) = scenario.not_due.split_first().unwrap();
    assert!(visible(&future.1));
    for (_, id) in hidden {
        assert!(!visible(id));
    }
    assert_eq!(queue.len(), scenario.due.len() + 1);
}

#[test]
fn test_archive_and_suspend_round_trip() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let doc = TestDataFactory::create_document(&db.storage, "Shelved");
    let item = TestDataFactory::create_learning_item(&db.storage, "Paused?");
    let now = Utc::now();

    assert_eq!(service.due_queue_at(now).unwrap().len(), 2);

    assert!(db.storage.set_archived(&doc.id, true).unwrap());
    assert!(db.storage.set_suspended(&item.id, true).unwrap());
    assert!(service.due_queue_at(now).unwrap().is_empty());

    assert!(db.storage.set_archived(&doc.id, false).unwrap());
    assert!(db.storage.set_suspended(&item.id, false).unwrap());
    let ids: Vec<String> = service.due_queue_at(now).unwrap().into_iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![doc.id, item.id]);
}
