use persona_core::{AppError, StorageBackend};
use persona_processing::TransformError;
use persona_storage::StorageError;
use std::path::PathBuf;
use thiserror::Error;

/// Multipart payload written to the temp dir, waiting to be processed.
///
/// Owned by the orchestrator once handed to `process_and_store`, which removes the
/// file whatever the outcome. Dropping a staged upload that was never cleaned up
/// (a cancelled request, a panic) removes the file as well.
#[derive(Debug)]
pub struct StagedUpload {
    pub path: PathBuf,
    pub content_type: String,
    pub original_filename: String,
    pub size: usize,
    pending: bool,
}

impl StagedUpload {
    pub(crate) fn new(
        path: PathBuf,
        content_type: String,
        original_filename: String,
        size: usize,
    ) -> Self {
        Self {
            path,
            content_type,
            original_filename,
            size,
            pending: true,
        }
    }

    /// Mark the file as handled by the janitor.
    pub(crate) fn release(&mut self) {
        self.pending = false;
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if !self.pending {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "Staged upload dropped before processing finished, removed"
                );
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    "Failed to remove abandoned staged upload"
                );
            }
        }
    }
}

/// Where a processed image ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub url: String,
    pub key: String,
    pub backend: StorageBackend,
}

/// Upload pipeline errors
#[derive(Debug, Error)]
pub enum UploadError {
    /// The staged file is not a usable image; no backend was tried.
    #[error("Image could not be processed: {0}")]
    Decode(#[from] TransformError),

    /// Local storage failed and no remote backend is configured.
    #[error("Local storage failed: {0}")]
    Local(StorageError),

    /// Remote failed, then the local fallback failed too.
    #[error("All storage backends failed (remote: {remote}; local: {local})")]
    Aggregate {
        remote: StorageError,
        local: StorageError,
    },

    #[error("Failed to stage upload: {0}")]
    Staging(#[source] std::io::Error),

    #[error("Image worker failed: {0}")]
    Worker(String),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Decode(e) => AppError::ImageProcessing(e.to_string()),
            UploadError::Local(_) | UploadError::Aggregate { .. } => {
                AppError::Storage(err.to_string())
            }
            UploadError::Staging(e) => AppError::Internal(format!("Failed to stage upload: {}", e)),
            UploadError::Worker(msg) => AppError::Internal(msg),
        }
    }
}
