//! Local Filesystem Image Storage - Implementation of ImageStorage.
//!
//! Stores uploaded journal images under a per-journal directory and hands
//! back a reference relative to the base path.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::domain::foundation::JournalId;
use crate::ports::{ImageStorage, StorageError};

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Local filesystem storage for journal images.
///
/// # Directory Structure
///
/// ```text
/// {base_path}/
/// └── journal_{id}/
///     ├── img_{uuid}.jpg
///     └── img_{uuid}.png
/// ```
///
/// Writes go to a `.tmp` file first and are renamed into place after sync.
#[derive(Debug, Clone)]
pub struct LocalImageStorage {
    base_path: PathBuf,
}

impl LocalImageStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Picks a safe extension from the client filename, defaulting to jpg.
    fn extension_for(filename: &str) -> String {
        Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
            .unwrap_or_else(|| "jpg".to_string())
    }

    /// Resolves a stored reference, rejecting anything that escapes the base path.
    fn resolve(&self, reference: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(reference);
        let escapes = reference.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(StorageError::InvalidReference {
                reference: reference.to_string(),
            });
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    async fn store(
        &self,
        journal_id: &JournalId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        StorageError::check_upload(bytes)?;

        let dir_name = format!("journal_{}", journal_id);
        let dir = self.base_path.join(&dir_name);
        fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::io(format!("Failed to create directory {}: {}", dir.display(), e))
        })?;

        let file_name = format!("img_{}.{}", Uuid::new_v4(), Self::extension_for(filename));
        let final_path = dir.join(&file_name);
        let temp_path = dir.join(format!("{}.tmp", file_name));

        let mut file = fs::File::create(&temp_path).await.map_err(|e| {
            StorageError::io(format!("Failed to create {}: {}", temp_path.display(), e))
        })?;
        file.write_all(bytes).await.map_err(|e| {
            StorageError::io(format!("Failed to write {}: {}", temp_path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            StorageError::io(format!("Failed to sync {}: {}", temp_path.display(), e))
        })?;
        fs::rename(&temp_path, &final_path).await.map_err(|e| {
            StorageError::io(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                final_path.display(),
                e
            ))
        })?;

        tracing::debug!(journal_id = %journal_id, size = bytes.len(), "Stored journal image");
        Ok(format!("{}/{}", dir_name, file_name))
    }

    async fn load(&self, reference: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(reference)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(reference))
            }
            Err(e) => Err(StorageError::io(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
