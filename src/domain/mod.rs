//! Domain layer - pure types and rules of the writing coach.

pub mod coaching;
pub mod foundation;
pub mod journal;
pub mod ledger;
pub mod profile;
