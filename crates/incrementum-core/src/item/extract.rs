//! Extract - a passage pulled out of a document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MemoryState;
use crate::card::Card;
use crate::fsrs::LearningState;

/// Default display priority for extracts
pub const DEFAULT_EXTRACT_PRIORITY: f64 = 5.0;

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extract {
    pub id: String,
    pub document_id: String,
    /// Plain text content
    pub content: String,
    pub page_title: Option<String>,
    pub page_number: Option<i32>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    /// Display priority (0-10)
    pub priority: f64,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,

    // ========== Scheduling ==========
    pub memory_state: Option<MemoryState>,
    pub next_review_date: Option<DateTime<Utc>>,
    pub last_review_date: Option<DateTime<Utc>>,
    pub review_count: u32,
    pub reps: u32,
    /// None on rows written before lapses were recorded
    pub lapses: Option<u32>,

    /// Optimistic concurrency token
    pub revision: i64,
}

impl Extract {
    pub fn new(document_id: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            document_id: document_id.into(),
            content: content.into(),
            page_title: None,
            page_number: None,
            notes: None,
            tags: Vec::new(),
            category: None,
            priority: DEFAULT_EXTRACT_PRIORITY,
            date_created: now,
            date_modified: now,
            memory_state: None,
            next_review_date: None,
            last_review_date: None,
            review_count: 0,
            reps: 0,
            lapses: None,
            revision: 0,
        }
    }

    /// First line of the content, shortened for queue display
    pub fn display_title(&self) -> String {
        if let Some(title) = self.page_title.as_ref().filter(|t| !t.trim().is_empty()) {
            return title.clone();
        }
        let first_line = self.content.lines().next().unwrap_or("").trim();
        if first_line.chars().count() > 80 {
            let short: String = first_line.chars().take(77).collect();
            format!("{}...", short)
        } else {
            first_line.to_string()
        }
    }

    pub(crate) fn to_card(&self, now: DateTime<Utc>) -> Card {
        let memory = self.memory_state.unwrap_or_default();
        let state = if self.reps > 0 || self.last_review_date.is_some() {
            LearningState::Review
        } else {
            LearningState::New
        };

        Card {
            due: self.next_review_date.unwrap_or(now),
            stability: memory.stability,
            difficulty: memory.difficulty,
            scheduled_days: memory.stability,
            reps: self.reps,
            lapses: self.lapses.unwrap_or(0),
            learning_steps: 0,
            state,
            last_review: self.last_review_date,
        }
    }

    pub(crate) fn apply_card(&mut self, card: &Card, now: DateTime<Utc>) {
        self.memory_state = Some(MemoryState {
            stability: card.stability,
            difficulty: card.difficulty,
        });
        self.next_review_date = Some(card.due);
        self.last_review_date = card.last_review;
        self.review_count = self.review_count.saturating_add(1);
        self.reps = card.reps;
        self.lapses = Some(card.lapses);
        self.date_modified = now;
    }
}
