//! End-to-end test support for Incrementum
//!
//! - `harness`: isolated on-disk databases
//! - `mocks`: factories for documents, extracts and learning items

pub mod harness;
pub mod mocks;

pub use harness::TestDatabaseManager;
pub use mocks::{BatchConfig, TestDataFactory, TestScenario};
