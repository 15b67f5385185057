//! # Incrementum Core
//!
//! Spaced-repetition scheduling engine for incremental reading. Documents,
//! extracts and flashcards share one FSRS-6 scheduler:
//!
//! - **FSRS-6**: 21-parameter memory model, whole-day intervals, no fuzz
//! - **Uniform items**: every reviewable kind is graded through one `Card` shape
//! - **Due queue**: documents, then extracts, then learning items, with stats
//! - **SQLite storage**: WAL, versioned migrations, optimistic revisions
//! - **Review log**: per-item history and daily review streaks
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chrono::Utc;
//! use incrementum_core::{Document, ReviewService, SchedulerConfig, Storage};
//!
//! // Create storage (uses default platform-specific location)
//! let storage = Storage::new(None)?;
//! let doc = Document::new("The Art of Doing Science and Engineering");
//! storage.insert_document(&doc)?;
//!
//! let service = ReviewService::new(storage, SchedulerConfig::load(None)?)?;
//!
//! // What would each grade do?
//! let intervals = service.preview_intervals(&doc.id, Utc::now())?;
//!
//! // Commit a "Good"
//! let outcome = service.submit_document_rating(&doc.id, 3, None, Utc::now())?;
//! println!("{}", outcome.reason);
//! ```
//!
//! ## Feature Flags
//!
//! - `bundled-sqlite` (default): Compile SQLite into the binary
//! - `encryption`: SQLCipher, keyed by `INCREMENTUM_ENCRYPTION_KEY`

#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod card;
pub mod config;
pub mod fsrs;
pub mod item;
pub mod queue;
pub mod review;
pub mod storage;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use card::Card;

pub use config::{ConfigError, SchedulerConfig};

pub use fsrs::{
    retrievability, FSRSScheduler, LearningState, PreviewIntervals, PreviewResults, Rating,
    ReviewResult, FSRS6_WEIGHTS,
};

pub use item::{
    Document, Extract, ItemKind, ItemType, LearningItem, MemoryState, ReviewableItem,
};

pub use queue::{build_due_queue, queue_stats, QueueEntry, QueueStats};

pub use review::{
    ItemPreview, RatingOutcome, ReviewError, ReviewService, ReviewStatistics, ReviewStreak,
    SchedulingUpdate,
};

pub use storage::{ItemStore, ReviewLog, Storage, StorageError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// FSRS algorithm version (6 = 21 parameters)
pub const FSRS_VERSION: u8 = 6;

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        Document, Extract, FSRSScheduler, ItemKind, ItemStore, LearningItem, QueueEntry,
        QueueStats, Rating, ReviewError, ReviewService, ReviewableItem, SchedulerConfig, Storage,
        StorageError,
    };
}
