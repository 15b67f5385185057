//! Reviewable items
//!
//! Documents, extracts and learning items persist the same scheduling data
//! under different field names. `ReviewableItem` is the single seam where
//! those names are translated to and from a scheduler [`Card`].

mod document;
mod extract;
mod learning_item;

pub use document::{calculate_priority_score, Document, DEFAULT_PRIORITY_SLIDER};
pub use extract::{Extract, DEFAULT_EXTRACT_PRIORITY};
pub use learning_item::{ItemType, LearningItem};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::card::Card;

// ============================================================================
// KIND
// ============================================================================

/// Which table a reviewable item lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ItemKind {
    Document,
    Extract,
    LearningItem,
}

impl ItemKind {
    pub const ALL: [ItemKind; 3] = [ItemKind::Document, ItemKind::Extract, ItemKind::LearningItem];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Document => "document",
            ItemKind::Extract => "extract",
            ItemKind::LearningItem => "learning-item",
        }
    }

    /// Accepts the canonical name plus a few short aliases
    pub fn parse_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "document" | "doc" => Some(ItemKind::Document),
            "extract" => Some(ItemKind::Extract),
            "learning-item" | "learning_item" | "item" | "card" => Some(ItemKind::LearningItem),
            _ => None,
        }
    }

    /// Expected review time in minutes
    pub fn estimated_time(&self) -> u32 {
        match self {
            ItemKind::Document => 10,
            ItemKind::Extract => 5,
            ItemKind::LearningItem => 2,
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// FSRS memory state as stored on extracts and learning items
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryState {
    pub stability: f64,
    pub difficulty: f64,
}

// ============================================================================
// REVIEWABLE ITEM
// ============================================================================

/// Any item that can be graded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ReviewableItem {
    Document(Document),
    Extract(Extract),
    LearningItem(LearningItem),
}

impl ReviewableItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            ReviewableItem::Document(_) => ItemKind::Document,
            ReviewableItem::Extract(_) => ItemKind::Extract,
            ReviewableItem::LearningItem(_) => ItemKind::LearningItem,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ReviewableItem::Document(d) => &d.id,
            ReviewableItem::Extract(e) => &e.id,
            ReviewableItem::LearningItem(i) => &i.id,
        }
    }

    /// Human-readable label for queues and logs
    pub fn title(&self) -> String {
        match self {
            ReviewableItem::Document(d) => d.title.clone(),
            ReviewableItem::Extract(e) => e.display_title(),
            ReviewableItem::LearningItem(i) => i.question.clone(),
        }
    }

    pub fn revision(&self) -> i64 {
        match self {
            ReviewableItem::Document(d) => d.revision,
            ReviewableItem::Extract(e) => e.revision,
            ReviewableItem::LearningItem(i) => i.revision,
        }
    }

    pub(crate) fn set_revision(&mut self, revision: i64) {
        match self {
            ReviewableItem::Document(d) => d.revision = revision,
            ReviewableItem::Extract(e) => e.revision = revision,
            ReviewableItem::LearningItem(i) => i.revision = revision,
        }
    }

    /// Stored due date (None = never scheduled)
    pub fn due(&self) -> Option<DateTime<Utc>> {
        match self {
            ReviewableItem::Document(d) => d.next_reading_date,
            ReviewableItem::Extract(e) => e.next_review_date,
            ReviewableItem::LearningItem(i) => Some(i.due_date),
        }
    }

    pub fn last_review(&self) -> Option<DateTime<Utc>> {
        match self {
            ReviewableItem::Document(d) => d.date_last_reviewed,
            ReviewableItem::Extract(e) => e.last_review_date,
            ReviewableItem::LearningItem(i) => i.last_review_date,
        }
    }

    /// Completed gradings
    pub fn reps(&self) -> u32 {
        match self {
            ReviewableItem::Document(d) => d.reps.unwrap_or(0),
            ReviewableItem::Extract(e) => e.reps,
            ReviewableItem::LearningItem(i) => i.review_count,
        }
    }

    /// Queue priority on the item's own scale
    pub fn priority(&self) -> f64 {
        match self {
            ReviewableItem::Document(d) => d.priority_score,
            ReviewableItem::Extract(e) => e.priority,
            ReviewableItem::LearningItem(i) => (10.0 - i.interval / 10.0).clamp(0.0, 10.0),
        }
    }

    /// Due when never scheduled, or scheduled at or before `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due().is_none_or(|due| due <= now)
    }

    /// Build the scheduler's view of this item
    pub fn to_card(&self, now: DateTime<Utc>) -> Card {
        match self {
            ReviewableItem::Document(d) => d.to_card(now),
            ReviewableItem::Extract(e) => e.to_card(now),
            ReviewableItem::LearningItem(i) => i.to_card(now),
        }
    }

    /// Write a graded card back under this kind's field names
    ///
    /// Display fields are left untouched.
    pub fn apply_card(&mut self, card: &Card, now: DateTime<Utc>) {
        let mut card = card.clone();
        card.last_review = Some(now);
        match self {
            ReviewableItem::Document(d) => d.apply_card(&card, now),
            ReviewableItem::Extract(e) => e.apply_card(&card, now),
            ReviewableItem::LearningItem(i) => i.apply_card(&card, now),
        }
    }
}

impl From<Document> for ReviewableItem {
    fn from(d: Document) -> Self {
        ReviewableItem::Document(d)
    }
}

impl From<Extract> for ReviewableItem {
    fn from(e: Extract) -> Self {
        ReviewableItem::Extract(e)
    }
}

impl From<LearningItem> for ReviewableItem {
    fn from(i: LearningItem) -> Self {
        ReviewableItem::LearningItem(i)
    }
}
