//! Image Storage Port - durable storage for uploaded journal images.
//!
//! The core only keeps the returned reference; bytes are loaded back when
//! a multimodal prompt needs them.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode, JournalId};

/// Maximum accepted upload size (10MB).
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Port for storing and loading image bytes.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Store bytes for a journal and return a durable reference.
    ///
    /// `filename` is only used to pick an extension.
    async fn store(
        &self,
        journal_id: &JournalId,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError>;

    /// Load bytes previously stored under `reference`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if nothing is stored under the reference
    async fn load(&self, reference: &str) -> Result<Vec<u8>, StorageError>;
}

/// Errors from image storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Image not found: {reference}")]
    NotFound { reference: String },

    #[error("Invalid storage reference: {reference}")]
    InvalidReference { reference: String },

    #[error("Image too large: {size_bytes} bytes (max: {max_bytes})")]
    TooLarge { size_bytes: usize, max_bytes: usize },

    #[error("Empty image upload")]
    Empty,

    #[error("IO error: {message}")]
    Io { message: String },
}

impl StorageError {
    pub fn not_found(reference: impl Into<String>) -> Self {
        Self::NotFound {
            reference: reference.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Checks size limits shared by every implementation.
    pub fn check_upload(bytes: &[u8]) -> Result<(), StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(StorageError::TooLarge {
                size_bytes: bytes.len(),
                max_bytes: MAX_IMAGE_BYTES,
            });
        }
        Ok(())
    }
}

impl From<StorageError> for DomainError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => DomainError::new(ErrorCode::ImageNotFound, err.to_string()),
            StorageError::TooLarge { .. } | StorageError::Empty => {
                DomainError::validation("image", err.to_string())
            }
            StorageError::InvalidReference { .. } | StorageError::Io { .. } => {
                DomainError::new(ErrorCode::StorageError, err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ErrorCategory;

    #[test]
    fn check_upload_rejects_empty_and_oversized() {
        assert_eq!(StorageError::check_upload(&[]), Err(StorageError::Empty));
        let big = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert!(matches!(
            StorageError::check_upload(&big),
            Err(StorageError::TooLarge { .. })
        ));
        assert!(StorageError::check_upload(&[1, 2, 3]).is_ok());
    }

    #[test]
    fn converts_to_domain_categories() {
        let nf: DomainError = StorageError::not_found("x").into();
        assert_eq!(nf.category(), ErrorCategory::NotFound);
        let big: DomainError = StorageError::Empty.into();
        assert_eq!(big.category(), ErrorCategory::Validation);
        let io: DomainError = StorageError::io("disk").into();
        assert_eq!(io.category(), ErrorCategory::Internal);
    }
}
