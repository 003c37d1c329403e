//! In-memory image storage for tests and the REPL.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::foundation::JournalId;
use crate::ports::{ImageStorage, StorageError};

#[derive(Default)]
pub struct InMemoryImageStorage {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryImageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl ImageStorage for InMemoryImageStorage {
    async fn store(
        &self,
        journal_id: &JournalId,
        _filename: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        StorageError::check_upload(bytes)?;
        let reference = format!("mem://{}/{}", journal_id, Uuid::new_v4());
        self.blobs
            .write()
            .await
            .insert(reference.clone(), bytes.to_vec());
        Ok(reference)
    }

    async fn load(&self, reference: &str) -> Result<Vec<u8>, StorageError> {
        self.blobs
            .read()
            .await
            .get(reference)
            .cloned()
            .ok_or_else(|| StorageError::not_found(reference))
    }
}
