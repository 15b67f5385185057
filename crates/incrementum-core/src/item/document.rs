//! Document - an imported source read incrementally

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::card::Card;
use crate::fsrs::LearningState;

/// Neutral slider position (1.0x multiplier)
pub const DEFAULT_PRIORITY_SLIDER: i32 = 50;

/// An imported document scheduled for incremental reading
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub title: String,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub date_added: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
    pub date_last_reviewed: Option<DateTime<Utc>>,
    /// Manual priority rating (1-4, 0 = unset)
    pub priority_rating: i32,
    /// Manual priority slider (0-100)
    pub priority_slider: i32,
    /// Display priority derived from rating and slider (0-100)
    pub priority_score: f64,
    pub is_archived: bool,

    // ========== Scheduling ==========
    /// Next scheduled reading date (None = never scheduled)
    pub next_reading_date: Option<DateTime<Utc>>,
    /// Number of times the document has been read
    pub reading_count: u32,
    pub stability: Option<f64>,
    pub difficulty: Option<f64>,
    pub reps: Option<u32>,
    /// None on rows written before lapses were recorded
    pub lapses: Option<u32>,
    /// Total reading time in seconds
    pub total_time_spent: Option<u64>,

    /// Optimistic concurrency token
    pub revision: i64,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            category: None,
            tags: Vec::new(),
            date_added: now,
            date_modified: now,
            date_last_reviewed: None,
            priority_rating: 0,
            priority_slider: DEFAULT_PRIORITY_SLIDER,
            priority_score: calculate_priority_score(0, DEFAULT_PRIORITY_SLIDER),
            is_archived: false,
            next_reading_date: None,
            reading_count: 0,
            stability: None,
            difficulty: None,
            reps: None,
            lapses: None,
            total_time_spent: None,
            revision: 0,
        }
    }

    /// Set the manual priority and refresh the derived score
    pub fn with_priority(mut self, rating: i32, slider: i32) -> Self {
        self.priority_rating = rating;
        self.priority_slider = slider.clamp(0, 100);
        self.priority_score = calculate_priority_score(rating, self.priority_slider);
        self
    }

    pub(crate) fn to_card(&self, now: DateTime<Utc>) -> Card {
        let stability = self.stability.unwrap_or(0.0);
        let reps = self.reps.unwrap_or(0);
        let state = if reps > 0 || self.date_last_reviewed.is_some() {
            LearningState::Review
        } else {
            LearningState::New
        };

        Card {
            due: self.next_reading_date.unwrap_or(now),
            stability,
            difficulty: self.difficulty.unwrap_or(0.0),
            scheduled_days: stability,
            reps,
            lapses: self.lapses.unwrap_or(0),
            learning_steps: 0,
            state,
            last_review: self.date_last_reviewed,
        }
    }

    pub(crate) fn apply_card(&mut self, card: &Card, now: DateTime<Utc>) {
        self.next_reading_date = Some(card.due);
        self.stability = Some(card.stability);
        self.difficulty = Some(card.difficulty);
        self.reps = Some(card.reps);
        self.lapses = Some(card.lapses);
        self.reading_count = self.reading_count.saturating_add(1);
        self.date_last_reviewed = card.last_review;
        self.date_modified = now;
    }
}

/// Average of the normalised rating (1-4 → 0-100) and the slider
pub fn calculate_priority_score(priority_rating: i32, priority_slider: i32) -> f64 {
    let slider = f64::from(priority_slider.clamp(0, 100));
    let rating = if (1..=4).contains(&priority_rating) {
        f64::from(priority_rating - 1) / 3.0 * 100.0
    } else {
        0.0
    };
    ((slider + rating) / 2.0).clamp(0.0, 100.0)
}
