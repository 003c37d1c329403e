//! Journal module - daily writing sessions and their transcripts.

mod aggregate;
mod image;
mod message;
mod phase;
mod view;

pub use aggregate::{Journal, PhaseTransition};
pub use image::JournalImage;
pub use message::{ChatMessage, MessageType, Sender};
pub use phase::WritingPhase;
pub use view::JournalView;
