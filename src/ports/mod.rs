//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the coaching core and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - the opaque coaching policy model
//! - `JournalRepository` - journals, transcripts and images
//! - `ErrorLedgerRepository` - normalized error ledger
//! - `ContextProfileRepository` - per-user profile blob
//! - `ImageStorage` - upload bytes
//! - `ProfileJobScheduler` / `ProfileJobRunner` - detached profile refresh jobs

mod ai_provider;
mod context_profile_repository;
mod error_ledger_repository;
mod image_storage;
mod journal_repository;
mod profile_job_scheduler;

pub use ai_provider::{AIError, AIProvider, ModelTier, PolicyOutput, PolicyRequest, ResponseFormat};
pub use context_profile_repository::ContextProfileRepository;
pub use error_ledger_repository::ErrorLedgerRepository;
pub use image_storage::{ImageStorage, StorageError, MAX_IMAGE_BYTES};
pub use journal_repository::JournalRepository;
pub use profile_job_scheduler::{JobError, ProfileJobRunner, ProfileJobScheduler, ProfileRefreshJob};
