//! Card - the memory state the scheduler operates on
//!
//! Every reviewable kind (document, extract, learning item) is translated to
//! and from this one shape. The scheduler never sees item records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fsrs::LearningState;

/// Algorithm-facing scheduling state of one reviewable item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// When the item becomes eligible for review
    pub due: DateTime<Utc>,
    /// Days until retrievability decays to the target retention
    pub stability: f64,
    /// Intrinsic hardness (1.0 = easy, 10.0 = hard; 0.0 = never graded)
    pub difficulty: f64,
    /// Length of the interval that produced `due`, in days
    pub scheduled_days: f64,
    /// Completed gradings
    pub reps: u32,
    /// "Again" gradings given from Review or Relearning
    pub lapses: u32,
    /// Sub-day learning step index. Always 0: scheduling is whole-day only.
    pub learning_steps: u32,
    /// Position in the New/Learning/Review/Relearning state machine
    pub state: LearningState,
    /// When the item was last graded
    pub last_review: Option<DateTime<Utc>>,
}

impl Card {
    /// A card that has never been graded, due at `now`
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            due: now,
            stability: 0.0,
            difficulty: 0.0,
            scheduled_days: 0.0,
            reps: 0,
            lapses: 0,
            learning_steps: 0,
            state: LearningState::New,
            last_review: None,
        }
    }

    /// Whether the card may be reviewed at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due <= now
    }

    /// Whether the card carries an FSRS memory state
    pub fn has_memory(&self) -> bool {
        self.stability.is_finite() && self.stability > 0.0
    }
}
