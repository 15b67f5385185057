//! Learning item - a flashcard derived from an extract or document

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MemoryState;
use crate::card::Card;
use crate::fsrs::LearningState;

/// Kind of flashcard
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[default]
    Flashcard,
    Cloze,
    Qa,
    Basic,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Flashcard => "flashcard",
            ItemType::Cloze => "cloze",
            ItemType::Qa => "qa",
            ItemType::Basic => "basic",
        }
    }

    pub fn parse_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "cloze" => ItemType::Cloze,
            "qa" => ItemType::Qa,
            "basic" => ItemType::Basic,
            _ => ItemType::Flashcard,
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningItem {
    pub id: String,
    pub extract_id: Option<String>,
    pub document_id: Option<String>,
    pub item_type: ItemType,
    pub question: String,
    pub answer: Option<String>,
    pub tags: Vec<String>,
    pub is_suspended: bool,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,

    // ========== Scheduling ==========
    pub due_date: DateTime<Utc>,
    /// Last applied interval in days
    pub interval: f64,
    pub last_review_date: Option<DateTime<Utc>>,
    pub review_count: u32,
    pub lapses: u32,
    pub state: LearningState,
    pub memory_state: Option<MemoryState>,

    /// Optimistic concurrency token
    pub revision: i64,
}

impl LearningItem {
    pub fn new(item_type: ItemType, question: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            extract_id: None,
            document_id: None,
            item_type,
            question: question.into(),
            answer: None,
            tags: Vec::new(),
            is_suspended: false,
            date_created: now,
            date_modified: now,
            due_date: now,
            interval: 0.0,
            last_review_date: None,
            review_count: 0,
            lapses: 0,
            state: LearningState::New,
            memory_state: None,
            revision: 0,
        }
    }

    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    /// Attach to the extract (and document) it was derived from
    pub fn from_extract(mut self, extract_id: impl Into<String>, document_id: impl Into<String>) -> Self {
        self.extract_id = Some(extract_id.into());
        self.document_id = Some(document_id.into());
        self
    }

    pub(crate) fn to_card(&self, _now: DateTime<Utc>) -> Card {
        let memory = self.memory_state.unwrap_or_default();
        Card {
            due: self.due_date,
            stability: memory.stability,
            difficulty: memory.difficulty,
            scheduled_days: memory.stability,
            reps: self.review_count,
            lapses: self.lapses,
            learning_steps: 0,
            state: self.state,
            last_review: self.last_review_date,
        }
    }

    pub(crate) fn apply_card(&mut self, card: &Card, now: DateTime<Utc>) {
        self.due_date = card.due;
        self.interval = card.scheduled_days;
        self.memory_state = Some(MemoryState {
            stability: card.stability,
            difficulty: card.difficulty,
        });
        self.review_count = card.reps;
        self.lapses = card.lapses;
        self.state = card.state;
        self.last_review_date = card.last_review;
        self.date_modified = now;
    }
}
