//! Due queue assembly
//!
//! Pure functions over already-loaded items. Suspended and archived items
//! are filtered by the store before they get here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::item::{ItemKind, ReviewableItem};

/// One row of the review queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub kind: ItemKind,
    pub id: String,
    pub title: String,
    pub priority: f64,
    /// None when the item was never scheduled
    pub due: Option<DateTime<Utc>>,
    /// Minutes
    pub estimated_time: u32,
    /// Graded at least once
    pub reviewed: bool,
}

impl QueueEntry {
    fn from_item(item: &ReviewableItem) -> Self {
        let kind = item.kind();
        Self {
            kind,
            id: item.id().to_string(),
            title: item.title(),
            priority: item.priority(),
            due: item.due(),
            estimated_time: kind.estimated_time(),
            reviewed: item.reps() > 0 || item.last_review().is_some(),
        }
    }
}

/// Summary counts for a queue
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub total_items: usize,
    pub due_today: usize,
    pub documents: usize,
    pub extracts: usize,
    pub learning_items: usize,
    /// Never reviewed
    pub new_items: usize,
    /// Reviewed before and due strictly before now
    pub overdue: usize,
    /// Minutes
    pub total_estimated_time: u32,
}

/// Due items, grouped by kind
///
/// Documents come first, then extracts, then learning items. Within a kind
/// the input order is kept.
pub fn build_due_queue(items: &[ReviewableItem], now: DateTime<Utc>) -> Vec<QueueEntry> {
    let queue: Vec<QueueEntry> = ItemKind::ALL
        .iter()
        .flat_map(|kind| {
            items
                .iter()
                .filter(move |item| item.kind() == *kind && item.is_due(now))
                .map(QueueEntry::from_item)
        })
        .collect();

    tracing::debug!(
        candidates = items.len(),
        due = queue.len(),
        "Assembled review queue"
    );
    queue
}

/// Stats over exactly the entries `build_due_queue` would return
pub fn queue_stats(items: &[ReviewableItem], now: DateTime<Utc>) -> QueueStats {
    stats_for_entries(&build_due_queue(items, now), now)
}

/// Stats over an already-built queue
pub fn stats_for_entries(queue: &[QueueEntry], now: DateTime<Utc>) -> QueueStats {
    let mut stats = QueueStats {
        total_items: queue.len(),
        due_today: queue.len(),
        ..QueueStats::default()
    };

    for entry in queue {
        match entry.kind {
            ItemKind::Document => stats.documents += 1,
            ItemKind::Extract => stats.extracts += 1,
            ItemKind::LearningItem => stats.learning_items += 1,
        }
        if !entry.reviewed {
            stats.new_items += 1;
        } else if entry.due.is_some_and(|due| due < now) {
            stats.overdue += 1;
        }
        stats.total_estimated_time = stats.total_estimated_time.saturating_add(entry.estimated_time);
    }

    stats
}
