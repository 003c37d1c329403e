//! Context profile handlers.

mod refresh_context_profile;

pub use refresh_context_profile::RefreshContextProfileHandler;
