//! Background job adapters.

mod profile_worker;

pub use profile_worker::{ProfileJobQueue, ProfileRefreshWorker, ProfileWorkerConfig};
