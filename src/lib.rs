//! Lingo Coach - AI-guided journal writing for language learners
//!
//! A learner writes one journal per day. The coach helps in phases: it
//! first builds an outline through questions (scaffolding), then assists
//! with the draft (writing), then evaluates the finished entry. Every
//! correction is folded into a per-user error ledger, and each completed
//! journal refreshes a long-lived context profile in the background.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
