//! In-memory adapters for development and tests.

mod journal_store;
mod ledger_store;
mod profile_store;

pub use journal_store::InMemoryJournalRepository;
pub use ledger_store::InMemoryErrorLedger;
pub use profile_store::InMemoryContextProfileRepository;
