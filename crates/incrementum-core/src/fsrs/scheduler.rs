//! FSRS-6 Scheduler
//!
//! Applies a grade to a [`Card`] and returns the updated card. Grading is a
//! pure function of `(config, card, now, rating)`: no fuzz, no hidden state,
//! the input card is never mutated.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::algorithm::{
    initial_difficulty_with_weights, initial_stability_with_weights, next_difficulty_with_weights,
    next_forget_stability_with_weights, next_interval_with_decay,
    next_recall_stability_with_weights, retrievability_with_decay,
    same_day_stability_with_weights, MAX_DIFFICULTY, MAX_STABILITY,
};
use crate::card::Card;
use crate::config::{ConfigError, SchedulerConfig};

// ============================================================================
// RATING
// ============================================================================

/// A user's self-assessment of recall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again = 1,
    Hard = 2,
    Good = 3,
    Easy = 4,
}

impl Rating {
    /// All grades, in ascending order
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// Parse an externally supplied 1-4 rating
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(Rating::Again),
            2 => Some(Rating::Hard),
            3 => Some(Rating::Good),
            4 => Some(Rating::Easy),
            _ => None,
        }
    }

    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Grade value used by the FSRS formulas
    pub fn grade(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// LEARNING STATE
// ============================================================================

/// Discrete scheduling state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LearningState {
    #[default]
    New,
    Learning,
    Review,
    Relearning,
}

impl LearningState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningState::New => "new",
            LearningState::Learning => "learning",
            LearningState::Review => "review",
            LearningState::Relearning => "relearning",
        }
    }

    /// Parse a persisted state name; unknown names read as New
    pub fn parse_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "learning" => LearningState::Learning,
            "review" => LearningState::Review,
            "relearning" => LearningState::Relearning,
            _ => LearningState::New,
        }
    }

    /// Short-term phases keep the item in the same session
    pub fn is_short_term(&self) -> bool {
        matches!(self, LearningState::Learning | LearningState::Relearning)
    }
}

impl std::fmt::Display for LearningState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RESULTS
// ============================================================================

/// Outcome of grading one card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResult {
    /// The updated card
    pub card: Card,
    /// The grade that produced it
    pub rating: Rating,
    /// Applied interval in whole days (0 = due again immediately)
    pub interval: u32,
    /// Whole days since the previous review
    pub elapsed_days: u32,
    /// Recall probability at review time (0 for new cards)
    pub retrievability: f64,
}

/// Interval lengths in days for each grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewIntervals {
    pub again: u32,
    pub hard: u32,
    pub good: u32,
    pub easy: u32,
}

/// Outcomes for all four grades, computed without committing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResults {
    pub again: ReviewResult,
    pub hard: ReviewResult,
    pub good: ReviewResult,
    pub easy: ReviewResult,
}

impl PreviewResults {
    pub fn intervals(&self) -> PreviewIntervals {
        PreviewIntervals {
            again: self.again.interval,
            hard: self.hard.interval,
            good: self.good.interval,
            easy: self.easy.interval,
        }
    }

    pub fn get(&self, rating: Rating) -> &ReviewResult {
        match rating {
            Rating::Again => &self.again,
            Rating::Hard => &self.hard,
            Rating::Good => &self.good,
            Rating::Easy => &self.easy,
        }
    }
}

// ============================================================================
// SCHEDULER
// ============================================================================

/// FSRS-6 scheduler bound to one session's configuration
#[derive(Debug, Clone, Default)]
pub struct FSRSScheduler {
    config: SchedulerConfig,
}

impl FSRSScheduler {
    /// Bind a scheduler to a validated configuration
    pub fn new(config: SchedulerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// A fresh card, due immediately
    pub fn new_card(&self, now: DateTime<Utc>) -> Card {
        Card::new(now)
    }

    /// Whole days since the card was last graded
    ///
    /// A reviewed card with no recorded review date is assumed to have been
    /// reviewed on schedule.
    pub fn elapsed_days(&self, card: &Card, now: DateTime<Utc>) -> u32 {
        if card.state == LearningState::New {
            return 0;
        }
        match card.last_review {
            Some(last) => (now - last).num_days().max(0) as u32,
            None if card.scheduled_days.is_finite() && card.scheduled_days > 0.0 => {
                card.scheduled_days.round() as u32
            }
            None => 0,
        }
    }

    /// Probability of recall at `now`
    pub fn current_retrievability(&self, card: &Card, now: DateTime<Utc>) -> f64 {
        if card.state == LearningState::New || !card.has_memory() {
            return 0.0;
        }
        let elapsed = self.elapsed_days(card, now);
        retrievability_with_decay(card.stability, f64::from(elapsed), self.config.decay())
    }

    /// Grade a card at `now`
    pub fn grade(&self, card: &Card, now: DateTime<Utc>, rating: Rating) -> ReviewResult {
        let elapsed_days = self.elapsed_days(card, now);
        let retrievability = self.current_retrievability(card, now);

        let (stability, difficulty) = self.next_memory(card, elapsed_days, retrievability, rating);

        let (state, interval, lapses) = match (card.state, rating) {
            (LearningState::New | LearningState::Learning, Rating::Again | Rating::Hard) => {
                (LearningState::Learning, 0, card.lapses)
            }
            (LearningState::Relearning, Rating::Again) | (LearningState::Review, Rating::Again) => {
                (LearningState::Relearning, 0, card.lapses.saturating_add(1))
            }
            (LearningState::Relearning, Rating::Hard) => {
                (LearningState::Relearning, 0, card.lapses)
            }
            _ => {
                let interval = self.graduated_interval(card, elapsed_days, retrievability, rating);
                (LearningState::Review, interval, card.lapses)
            }
        };

        let due = now
            .checked_add_signed(Duration::days(i64::from(interval)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let applied = ((due - now).num_seconds() as f64 / 86_400.0).max(0.0);

        ReviewResult {
            card: Card {
                due,
                stability,
                difficulty,
                scheduled_days: applied,
                reps: card.reps.saturating_add(1),
                lapses,
                learning_steps: 0,
                state,
                last_review: Some(now),
            },
            rating,
            interval,
            elapsed_days,
            retrievability,
        }
    }

    /// Grade the card once per rating, in isolation
    pub fn preview_all(&self, card: &Card, now: DateTime<Utc>) -> PreviewResults {
        PreviewResults {
            again: self.grade(card, now, Rating::Again),
            hard: self.grade(card, now, Rating::Hard),
            good: self.grade(card, now, Rating::Good),
            easy: self.grade(card, now, Rating::Easy),
        }
    }

    /// New (stability, difficulty) for a grade, never non-finite
    fn next_memory(
        &self,
        card: &Card,
        elapsed_days: u32,
        retrievability: f64,
        rating: Rating,
    ) -> (f64, f64) {
        let w = &self.config.weights;
        let g = rating.grade();

        let (stability, difficulty) = if card.state == LearningState::New || !card.has_memory() {
            (
                initial_stability_with_weights(g, w),
                initial_difficulty_with_weights(g, w),
            )
        } else if card.state.is_short_term() || elapsed_days == 0 {
            (
                same_day_stability_with_weights(card.stability, g, w),
                next_difficulty_with_weights(card.difficulty, g, w),
            )
        } else if rating == Rating::Again {
            (
                next_forget_stability_with_weights(card.difficulty, card.stability, retrievability, w),
                next_difficulty_with_weights(card.difficulty, g, w),
            )
        } else {
            (
                next_recall_stability_with_weights(
                    card.difficulty,
                    card.stability,
                    retrievability,
                    g,
                    w,
                ),
                next_difficulty_with_weights(card.difficulty, g, w),
            )
        };

        let stability = if stability.is_finite() {
            stability
        } else {
            tracing::warn!(rating = %rating, "Non-finite stability computed, keeping previous value");
            finite_or_zero(card.stability).clamp(0.0, MAX_STABILITY)
        };
        let difficulty = if difficulty.is_finite() {
            difficulty
        } else {
            tracing::warn!(rating = %rating, "Non-finite difficulty computed, keeping previous value");
            finite_or_zero(card.difficulty).clamp(0.0, MAX_DIFFICULTY)
        };

        (stability, difficulty)
    }

    /// Interval in whole days for a card leaving (or staying in) Review
    ///
    /// Hard, Good and Easy are computed together so that
    /// `hard <= good < easy` holds. For a card already in Review, Hard never
    /// drops below the previously scheduled interval: a same-day Hard would
    /// otherwise shrink the schedule through the short-term stability path.
    fn graduated_interval(
        &self,
        card: &Card,
        elapsed_days: u32,
        retrievability: f64,
        rating: Rating,
    ) -> u32 {
        let interval_for = |r: Rating| {
            let (stability, _) = self.next_memory(card, elapsed_days, retrievability, r);
            self.interval_from_stability(stability, card)
        };

        let mut good = interval_for(Rating::Good);
        let hard = if card.state == LearningState::Review {
            let previous = finite_or_zero(card.scheduled_days).round().max(0.0) as u32;
            let hard = interval_for(Rating::Hard).min(good).max(previous);
            good = good.max(hard.saturating_add(1));
            hard
        } else {
            good
        };
        let easy = interval_for(Rating::Easy).max(good.saturating_add(1));

        let max = self.config.maximum_interval;
        match rating {
            Rating::Hard => hard.min(max),
            Rating::Good => good.min(max),
            Rating::Easy => easy.min(max),
            Rating::Again => 0,
        }
    }

    /// Whole-day interval for a stability, in [1, maximum_interval]
    ///
    /// A non-finite interval falls back to the previously scheduled one (or
    /// 0 when there is none), capped at the maximum but not raised to 1.
    fn interval_from_stability(&self, stability: f64, card: &Card) -> u32 {
        let max = f64::from(self.config.maximum_interval.max(1));
        let raw = next_interval_with_decay(
            stability,
            self.config.desired_retention,
            self.config.decay(),
        );
        if raw.is_finite() {
            return raw.round().clamp(1.0, max) as u32;
        }

        tracing::warn!(
            stability,
            "Non-finite interval computed, falling back to previous schedule"
        );
        finite_or_zero(card.scheduled_days).round().clamp(0.0, max) as u32
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
