//! Review service
//!
//! The entry point applications call: preview intervals, submit ratings,
//! read the due queue. Each rating is a read-modify-write against an
//! [`ItemStore`]; the store's revision check turns a lost update into
//! [`ReviewError::Conflict`].

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SchedulerConfig};
use crate::fsrs::{FSRSScheduler, LearningState, PreviewIntervals, PreviewResults, Rating};
use crate::item::{ItemKind, ReviewableItem};
use crate::queue::{self, QueueEntry, QueueStats};
use crate::storage::{ItemStore, ReviewLog, StorageError};

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Review service error type
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// No item with this id (and kind)
    #[error("Item not found: {0}")]
    NotFound(String),
    /// Rating outside 1..=4
    #[error("Rating must be between 1 and 4, got {0}")]
    InvalidRating(i32),
    /// The item changed between read and write
    #[error("Concurrent update: {0}")]
    Conflict(String),
    /// Rejected scheduler configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// Storage failure
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for ReviewError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(id) => ReviewError::NotFound(id),
            conflict @ StorageError::Conflict { .. } => ReviewError::Conflict(conflict.to_string()),
            other => ReviewError::Storage(other),
        }
    }
}

/// Review result type
pub type Result<T> = std::result::Result<T, ReviewError>;

impl TryFrom<i32> for Rating {
    type Error = ReviewError;

    fn try_from(value: i32) -> Result<Self> {
        Rating::from_i32(value).ok_or(ReviewError::InvalidRating(value))
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Scheduling change produced by one committed rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingUpdate {
    pub rating: Rating,
    pub state_before: LearningState,
    pub state: LearningState,
    /// Whole days until the next review
    pub interval: u32,
    pub due: DateTime<Utc>,
    pub stability: f64,
    pub difficulty: f64,
    pub reps: u32,
    pub lapses: u32,
    pub elapsed_days: u32,
    /// Recall probability when the rating was given
    pub retrievability: f64,
}

/// What `submit_rating` returns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingOutcome {
    /// The item as persisted, with its new revision
    pub item: ReviewableItem,
    pub update: SchedulingUpdate,
    /// Human-readable summary
    pub reason: String,
}

/// Read-only view of an item's options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPreview {
    pub kind: ItemKind,
    pub id: String,
    pub title: String,
    pub state: LearningState,
    pub retrievability: f64,
    pub intervals: PreviewIntervals,
}

/// Workload and recall summary over the active learning items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatistics {
    pub total_items: usize,
    pub total_reviews: u32,
    pub total_lapses: u32,
    /// Mean scheduled interval, days
    pub average_interval: f64,
    /// `1 - lapses / reviews`; None before the first review
    pub retention_estimate: Option<f64>,
    pub due_today: usize,
    pub due_week: usize,
    pub due_month: usize,
}

/// Consecutive-day review activity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStreak {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_reviews: usize,
    pub last_review_date: Option<NaiveDate>,
}

// ============================================================================
// SERVICE
// ============================================================================

/// Scheduling operations over one item store
pub struct ReviewService<S: ItemStore> {
    store: S,
    scheduler: FSRSScheduler,
}

impl<S: ItemStore> ReviewService<S> {
    /// Create a service, rejecting an invalid configuration
    pub fn new(store: S, config: SchedulerConfig) -> Result<Self> {
        Ok(Self {
            store,
            scheduler: FSRSScheduler::new(config)?,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scheduler(&self) -> &FSRSScheduler {
        &self.scheduler
    }

    /// Interval previews and current retrievability for any item
    pub fn preview(&self, id: &str, now: DateTime<Utc>) -> Result<ItemPreview> {
        let item = self
            .store
            .find_item(id)?
            .ok_or_else(|| ReviewError::NotFound(id.to_string()))?;

        let card = item.to_card(now);
        let intervals = self.scheduler.preview_all(&card, now).intervals();
        tracing::debug!(
            id,
            kind = %item.kind(),
            again = intervals.again,
            hard = intervals.hard,
            good = intervals.good,
            easy = intervals.easy,
            "Previewed intervals"
        );

        Ok(ItemPreview {
            kind: item.kind(),
            id: id.to_string(),
            title: item.title(),
            state: card.state,
            retrievability: self.scheduler.current_retrievability(&card, now),
            intervals,
        })
    }

    /// Days until the next review for each grade, without committing
    pub fn preview_intervals(&self, id: &str, now: DateTime<Utc>) -> Result<PreviewIntervals> {
        Ok(self.preview(id, now)?.intervals)
    }

    /// Full previews for a known item
    pub fn preview_results(
        &self,
        kind: ItemKind,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<PreviewResults> {
        let item = self.load(kind, id)?;
        Ok(self.scheduler.preview_all(&item.to_card(now), now))
    }

    /// Grade an item and persist the result
    ///
    /// `elapsed_ms` is the time the user spent on the item. Nothing is
    /// written unless the rating is valid, the item exists and its revision
    /// has not moved since it was read.
    pub fn submit_rating(
        &self,
        kind: ItemKind,
        id: &str,
        rating: i32,
        elapsed_ms: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<RatingOutcome> {
        let rating = Rating::try_from(rating)?;
        let item = self.load(kind, id)?;

        let card = item.to_card(now);
        let result = self.scheduler.grade(&card, now, rating);

        let expected_revision = item.revision();
        let mut updated = item;
        updated.apply_card(&result.card, now);
        if let (ReviewableItem::Document(doc), Some(ms)) = (&mut updated, elapsed_ms) {
            let spent = doc.total_time_spent.unwrap_or(0);
            doc.total_time_spent = Some(spent.saturating_add(ms / 1000));
        }

        let log = ReviewLog {
            item_id: id.to_string(),
            kind,
            rating,
            state_before: card.state,
            elapsed_days: result.elapsed_days,
            scheduled_days: result.card.scheduled_days,
            time_taken_ms: elapsed_ms,
            reviewed_at: now,
        };

        let revision = self.store.commit_review(&updated, expected_revision, &log)?;
        updated.set_revision(revision);

        tracing::info!(
            id,
            kind = %kind,
            rating = rating.as_i32(),
            state = %result.card.state,
            interval = result.interval,
            "Rating committed"
        );

        let update = SchedulingUpdate {
            rating,
            state_before: card.state,
            state: result.card.state,
            interval: result.interval,
            due: result.card.due,
            stability: result.card.stability,
            difficulty: result.card.difficulty,
            reps: result.card.reps,
            lapses: result.card.lapses,
            elapsed_days: result.elapsed_days,
            retrievability: result.retrievability,
        };

        Ok(RatingOutcome {
            item: updated,
            reason: format!("FSRS-6: Rating {} → {} days", rating.as_i32(), result.interval),
            update,
        })
    }

    pub fn submit_document_rating(
        &self,
        id: &str,
        rating: i32,
        elapsed_ms: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<RatingOutcome> {
        self.submit_rating(ItemKind::Document, id, rating, elapsed_ms, now)
    }

    pub fn submit_extract_rating(
        &self,
        id: &str,
        rating: i32,
        elapsed_ms: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<RatingOutcome> {
        self.submit_rating(ItemKind::Extract, id, rating, elapsed_ms, now)
    }

    pub fn submit_learning_item_rating(
        &self,
        id: &str,
        rating: i32,
        elapsed_ms: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<RatingOutcome> {
        self.submit_rating(ItemKind::LearningItem, id, rating, elapsed_ms, now)
    }

    pub fn due_queue(&self) -> Result<Vec<QueueEntry>> {
        self.due_queue_at(Utc::now())
    }

    pub fn due_queue_at(&self, now: DateTime<Utc>) -> Result<Vec<QueueEntry>> {
        let items = self.store.list_reviewable()?;
        Ok(queue::build_due_queue(&items, now))
    }

    pub fn queue_stats(&self) -> Result<QueueStats> {
        self.queue_stats_at(Utc::now())
    }

    pub fn queue_stats_at(&self, now: DateTime<Utc>) -> Result<QueueStats> {
        let items = self.store.list_reviewable()?;
        Ok(queue::queue_stats(&items, now))
    }

    pub fn review_statistics(&self) -> Result<ReviewStatistics> {
        self.review_statistics_at(Utc::now())
    }

    pub fn review_statistics_at(&self, now: DateTime<Utc>) -> Result<ReviewStatistics> {
        let items = self.store.list_reviewable()?;
        Ok(compute_review_statistics(&items, now))
    }

    /// Committed ratings for one item, newest first
    pub fn review_history(&self, id: &str) -> Result<Vec<ReviewLog>> {
        Ok(self.store.review_logs_for(id)?)
    }

    pub fn review_streak(&self, today: NaiveDate) -> Result<ReviewStreak> {
        let logs = self.store.all_review_logs()?;
        Ok(compute_streak(&logs, today))
    }

    fn load(&self, kind: ItemKind, id: &str) -> Result<ReviewableItem> {
        self.store
            .get_item(kind, id)?
            .ok_or_else(|| ReviewError::NotFound(format!("{} {}", kind, id)))
    }
}

/// Review statistics over the learning items in `items`
///
/// Documents and extracts are skipped. An item counts as due within a
/// window when its due date is at or before `now` plus the window.
pub fn compute_review_statistics(items: &[ReviewableItem], now: DateTime<Utc>) -> ReviewStatistics {
    let cards: Vec<_> = items
        .iter()
        .filter_map(|item| match item {
            ReviewableItem::LearningItem(li) => Some(li),
            _ => None,
        })
        .collect();
    if cards.is_empty() {
        return ReviewStatistics::default();
    }

    let total_reviews = cards.iter().fold(0u32, |acc, c| acc.saturating_add(c.review_count));
    let total_lapses = cards.iter().fold(0u32, |acc, c| acc.saturating_add(c.lapses));
    let intervals: Vec<f64> = cards
        .iter()
        .map(|c| c.interval)
        .filter(|i| i.is_finite())
        .collect();
    let average_interval = if intervals.is_empty() {
        0.0
    } else {
        intervals.iter().sum::<f64>() / intervals.len() as f64
    };
    let retention_estimate = (total_reviews > 0).then(|| {
        (1.0 - f64::from(total_lapses) / f64::from(total_reviews)).clamp(0.0, 1.0)
    });

    let due_within = |days: i64| {
        let horizon = now + Duration::days(days);
        cards.iter().filter(|c| c.due_date <= horizon).count()
    };

    ReviewStatistics {
        total_items: cards.len(),
        total_reviews,
        total_lapses,
        average_interval,
        retention_estimate,
        due_today: due_within(0),
        due_week: due_within(7),
        due_month: due_within(30),
    }
}

/// Streaks over the UTC calendar days that have at least one review
///
/// The current streak counts only if the last review day is `today` or
/// the day before.
pub fn compute_streak(logs: &[ReviewLog], today: NaiveDate) -> ReviewStreak {
    let days: BTreeSet<NaiveDate> = logs.iter().map(|l| l.reviewed_at.date_naive()).collect();

    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    for day in &days {
        run = match previous {
            Some(prev) if prev.succ_opt() == Some(*day) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(*day);
    }

    let last_review_date = days.last().copied();
    let current_streak = match last_review_date {
        Some(last) if last == today || last.succ_opt() == Some(today) => run,
        _ => 0,
    };

    ReviewStreak {
        current_streak,
        longest_streak: longest,
        total_reviews: logs.len(),
        last_review_date,
    }
}
