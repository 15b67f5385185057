//! Review Journey
//!
//! A reader grades documents, extracts and flashcards over several days and
//! the schedule moves through New → Learning/Review → Relearning → Review.

use chrono::{Duration, Utc};
use incrementum_core::{
    ItemKind, ItemStore, LearningState, ReviewError, ReviewableItem, SchedulerConfig,
};
use incrementum_e2e_tests::{TestDataFactory, TestDatabaseManager};

#[test]
fn test_new_document_read_and_graduated() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let now = Utc::now();
    let doc = TestDataFactory::create_document(&db.storage, "Surely You're Joking");

    let preview = service.preview(&doc.id, now).unwrap();
    assert_eq!(preview.state, LearningState::New);
    assert_eq!(preview.retrievability, 0.0);
    assert_eq!(preview.intervals.again, 0);

    let outcome = service.submit_document_rating(&doc.id, 4, Some(600_000), now).unwrap();
    assert_eq!(outcome.update.state, LearningState::Review);
    assert_eq!(outcome.update.reps, 1);
    assert_eq!(outcome.update.interval, preview.intervals.easy);
    assert!(outcome.update.due > now);

    let history = service.review_history(&doc.id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].state_before, LearningState::New);
    assert_eq!(history[0].time_taken_ms, Some(600_000));
}

#[test]
fn test_flashcard_lifecycle_over_days() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let item = TestDataFactory::create_learning_item(&db.storage, "What is interleaving?");
    let mut now = Utc::now();

    // Day 0: forgotten immediately, stays in the session
    let outcome = service.submit_learning_item_rating(&item.id, 1, None, now).unwrap();
    assert_eq!(outcome.update.state, LearningState::Learning);
    assert_eq!(outcome.update.due, now);
    assert_eq!(outcome.update.lapses, 0);
    assert!(service.due_queue_at(now).unwrap().iter().any(|e| e.id == item.id));

    // Day 0 again: remembered, graduates
    let outcome = service.submit_learning_item_rating(&item.id, 3, None, now).unwrap();
    assert_eq!(outcome.update.state, LearningState::Review);
    assert!(outcome.update.interval >= 1);
    assert!(!service.due_queue_at(now).unwrap().iter().any(|e| e.id == item.id));

    // On the due date: lapse
    now = outcome.update.due;
    let outcome = service.submit_learning_item_rating(&item.id, 1, None, now).unwrap();
    assert_eq!(outcome.update.state, LearningState::Relearning);
    assert_eq!(outcome.update.lapses, 1);
    assert_eq!(outcome.update.interval, 0);

    // Hard while relearning stays put without another lapse
    let outcome = service.submit_learning_item_rating(&item.id, 2, None, now).unwrap();
    assert_eq!(outcome.update.state, LearningState::Relearning);
    assert_eq!(outcome.update.lapses, 1);

    // Relearned
    let outcome = service.submit_learning_item_rating(&item.id, 3, None, now).unwrap();
    assert_eq!(outcome.update.state, LearningState::Review);
    assert_eq!(outcome.update.reps, 5);
    assert!(outcome.update.stability > 0.0 && outcome.update.stability.is_finite());

    let history = service.review_history(&item.id).unwrap();
    let states: Vec<LearningState> = history.iter().rev().map(|l| l.state_before).collect();
    assert_eq!(
        states,
        vec![
            LearningState::New,
            LearningState::Learning,
            LearningState::Review,
            LearningState::Relearning,
            LearningState::Relearning,
        ]
    );
}

#[test]
fn test_mature_card_lapse_scenario() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let now = Utc::now();
    let item = TestDataFactory::create_mature_item(&db.storage, now, 10.0, 3);

    let outcome = service.submit_learning_item_rating(&item.id, 1, None, now).unwrap();
    assert_eq!(outcome.update.state, LearningState::Relearning);
    assert_eq!(outcome.update.lapses, 1);
    assert_eq!(outcome.update.reps, 4);
    assert_eq!(outcome.update.due, now);
    assert!(outcome.update.stability < 10.0);
}

#[test]
fn test_extract_reviews_accumulate() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let mut now = Utc::now();
    let doc = TestDataFactory::create_document(&db.storage, "Source");
    let extract = TestDataFactory::create_extract(&db.storage, &doc.id, "Retrieval practice works.");

    let mut last_interval = 0;
    for _ in 0..3 {
        let outcome = service.submit_extract_rating(&extract.id, 3, None, now).unwrap();
        assert!(outcome.update.interval >= last_interval);
        last_interval = outcome.update.interval;
        now = outcome.update.due;
    }

    match db.storage.get_item(ItemKind::Extract, &extract.id).unwrap().unwrap() {
        ReviewableItem::Extract(e) => {
            assert_eq!(e.review_count, 3);
            assert_eq!(e.reps, 3);
            assert_eq!(e.lapses, Some(0));
            assert_eq!(e.revision, 3);
        }
        other => panic!("unexpected kind {:?}", other.kind()),
    }
}

#[test]
fn test_invalid_ratings_leave_no_trace() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let doc = TestDataFactory::create_document(&db.storage, "Untouched");

    for bad in [0, 5, -1, 42] {
        let err = service
            .submit_document_rating(&doc.id, bad, None, Utc::now())
            .unwrap_err();
        assert!(matches!(err, ReviewError::InvalidRating(v) if v == bad));
    }

    let stored = db.storage.find_item(&doc.id).unwrap().unwrap();
    assert_eq!(stored.revision(), 0);
    assert_eq!(stored.reps(), 0);
    assert!(service.review_history(&doc.id).unwrap().is_empty());
}

#[test]
fn test_maximum_interval_caps_schedule() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service_with(SchedulerConfig {
        maximum_interval: 5,
        ..SchedulerConfig::default()
    });
    let now = Utc::now();
    let item = TestDataFactory::create_mature_item(&db.storage, now, 200.0, 8);

    let intervals = service.preview_intervals(&item.id, now).unwrap();
    assert!(intervals.hard <= 5);
    assert!(intervals.good <= 5);
    assert!(intervals.easy <= 5);

    let outcome = service.submit_learning_item_rating(&item.id, 4, None, now).unwrap();
    assert_eq!(outcome.update.due, now + Duration::days(i64::from(outcome.update.interval)));
}

#[test]
fn test_higher_retention_shortens_intervals() {
    let db = TestDatabaseManager::new_temp();
    let now = Utc::now();
    let item = TestDataFactory::create_mature_item(&db.storage, now, 30.0, 5);

    let relaxed = db
        .service_with(SchedulerConfig {
            desired_retention: 0.8,
            ..SchedulerConfig::default()
        })
        .preview_intervals(&item.id, now)
        .unwrap();
    let strict = db
        .service_with(SchedulerConfig {
            desired_retention: 0.95,
            ..SchedulerConfig::default()
        })
        .preview_intervals(&item.id, now)
        .unwrap();

    assert!(strict.good < relaxed.good);
}

#[test]
fn test_schedule_survives_reopen() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let now = Utc::now();
    let doc = TestDataFactory::create_document(&db.storage, "Persistent");

    let outcome = service.submit_document_rating(&doc.id, 3, None, now).unwrap();

    let reopened = db.reopen();
    let stored = reopened.get_item(ItemKind::Document, &doc.id).unwrap().unwrap();
    assert_eq!(stored, outcome.item);
    assert_eq!(stored.due(), Some(outcome.update.due));
    assert_eq!(reopened.review_logs_for(&doc.id).unwrap().len(), 1);
}

#[test]
fn test_outcome_serializes_camel_case() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let doc = TestDataFactory::create_document(&db.storage, "JSON");

    let outcome = service.submit_document_rating(&doc.id, 3, None, Utc::now()).unwrap();
    let value = serde_json::to_value(&outcome).unwrap();

    assert_eq!(value["update"]["stateBefore"], "new");
    assert_eq!(value["update"]["state"], "review");
    assert_eq!(value["item"]["kind"], "document");
    assert!(value["reason"].as_str().unwrap().starts_with("FSRS-6: Rating 3"));
}

#[test]
fn test_daily_sessions_build_a_streak() {
    let db = TestDatabaseManager::new_temp();
    let service = db.service();
    let start = Utc::now();
    let cards: Vec<_> = (0..3)
        .map(|i| TestDataFactory::create_learning_item(&db.storage, &format!("Card {}", i)))
        .collect();

    for (day, card) in cards.iter().enumerate() {
        let when = start + Duration::days(day as i64);
        service.submit_learning_item_rating(&card.id, 3, None, when).unwrap();
    }

    let last_day = (start + Duration::days(2)).date_naive();
    let streak = service.review_streak(last_day).unwrap();
    assert_eq!(streak.current_streak, 3);
    assert_eq!(streak.longest_streak, 3);
    assert_eq!(streak.total_reviews, 3);
    assert_eq!(streak.last_review_date, Some(last_day));

    // Two idle days break the current streak but not the record
    let later = service.review_streak(last_day + Duration::days(2)).unwrap();
    assert_eq!(later.current_streak, 0);
    assert_eq!(later.longest_streak, 3);
}
