//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the coaching core to external systems:
//! - `ai` - HTTP policy gateway, retry wrapper and mock provider
//! - `jobs` - background profile refresh worker
//! - `memory` - in-memory repositories for development and tests
//! - `postgres` - PostgreSQL repositories
//! - `storage` - filesystem and in-memory image storage

pub mod ai;
pub mod jobs;
pub mod memory;
pub mod postgres;
pub mod storage;

pub use ai::{HttpProvider, HttpProviderConfig, MockAIProvider, RetryPolicy, RetryingAIProvider};
pub use jobs::{ProfileJobQueue, ProfileRefreshWorker, ProfileWorkerConfig};
pub use memory::{InMemoryContextProfileRepository, InMemoryErrorLedger, InMemoryJournalRepository};
pub use storage::{InMemoryImageStorage, LocalImageStorage};
