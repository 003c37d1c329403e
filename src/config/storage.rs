//! Image storage configuration

use serde::Deserialize;
use std::path::PathBuf;

/// Where uploaded images are kept. No directory means in-memory storage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    pub image_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_defaults_to_memory() {
        assert!(StorageConfig::default().image_dir.is_none());
    }
}
