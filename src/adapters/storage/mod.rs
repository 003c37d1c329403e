//! Storage Adapters
//!
//! Implementations of the ImageStorage port.
//!
//! - **LocalImageStorage** - images as files under a base directory
//! - **InMemoryImageStorage** - images in memory (testing/development)

mod in_memory_image_storage;
mod local_image_storage;

pub use in_memory_image_storage::InMemoryImageStorage;
pub use local_image_storage::LocalImageStorage;
