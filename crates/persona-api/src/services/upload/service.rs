//! Image upload pipeline
//!
//! stage → transform → key → remote put → (on failure) local put → janitor.
//!
//! The staged file is removed exactly once on every exit path. Backends are tried
//! strictly in order; the local fallback only runs after the remote attempt has
//! definitively failed.

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use persona_core::constants::CHARACTER_ENTITY_KIND;
use persona_core::{ImageConfig, ImageRole, StorageBackend};
use persona_processing::{ImageTransformer, TransformOptions, TransformOverrides};
use persona_storage::keys::build_key;
use persona_storage::StorageSet;
use tokio::io::{AsyncRead, AsyncWriteExt};
use uuid::Uuid;

use super::janitor::{FsJanitor, Janitor};
use super::types::{StagedUpload, StoredImage, UploadError};

pub type Clock = fn() -> DateTime<Utc>;

pub struct UploadOrchestrator {
    storage: StorageSet,
    images: ImageConfig,
    janitor: Arc<dyn Janitor>,
    clock: Clock,
}

impl UploadOrchestrator {
    pub fn new(storage: StorageSet, images: ImageConfig) -> Self {
        Self {
            storage,
            images,
            janitor: Arc::new(FsJanitor),
            clock: Utc::now,
        }
    }

    pub fn with_janitor(mut self, janitor: Arc<dyn Janitor>) -> Self {
        self.janitor = janitor;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.images.max_upload_bytes
    }

    /// Write an uploaded payload to the temp dir under a unique name.
    pub async fn stage(
        &self,
        data: &[u8],
        original_filename: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<StagedUpload, UploadError> {
        self.stage_reader(data, original_filename, content_type)
            .await
    }

    /// Stream an upload into the temp dir. A partially written file is removed
    /// before the error is returned.
    pub async fn stage_reader<R>(
        &self,
        mut reader: R,
        original_filename: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<StagedUpload, UploadError>
    where
        R: AsyncRead + Unpin + Send,
    {
        tokio::fs::create_dir_all(&self.images.tmp_dir)
            .await
            .map_err(UploadError::Staging)?;

        let original_filename = original_filename.unwrap_or("upload").to_string();
        let file_name = match staged_extension(&original_filename) {
            Some(ext) => format!("persona-upload-{}.{}", Uuid::new_v4(), ext),
            None => format!("persona-upload-{}", Uuid::new_v4()),
        };
        let path = self.images.tmp_dir.join(file_name);

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(UploadError::Staging)?;
        let mut staged = StagedUpload::new(
            path,
            content_type
                .unwrap_or("application/octet-stream")
                .to_string(),
            original_filename,
            0,
        );

        let written = match write_staged(&mut reader, &mut file).await {
            Ok(written) => written,
            Err(e) => {
                drop(file);
                tracing::warn!(
                    error = %e,
                    path = %staged.path.display(),
                    "Failed to stage upload"
                );
                self.janitor.remove(&staged.path).await;
                staged.release();
                return Err(UploadError::Staging(e));
            }
        };
        staged.size = written;

        tracing::debug!(
            path = %staged.path.display(),
            size_bytes = staged.size,
            original_filename = %staged.original_filename,
            "Upload staged"
        );

        Ok(staged)
    }

    /// Transform the staged file for `role` and store it, remote first.
    ///
    /// Consumes the staged upload; its file is gone when this returns.
    #[tracing::instrument(skip_all, fields(role = %role, owner_id = %owner_id))]
    pub async fn process_and_store(
        &self,
        mut staged: StagedUpload,
        owner_id: &str,
        role: ImageRole,
        overrides: &TransformOverrides,
    ) -> Result<StoredImage, UploadError> {
        let result = self.run(&staged.path, owner_id, role, overrides).await;
        self.janitor.remove(&staged.path).await;
        staged.release();
        result
    }

    /// Same as `process_and_store`, but on its own task so a dropped request still
    /// finishes (and cleans up) the upload it started.
    pub async fn process_and_store_detached(
        self: &Arc<Self>,
        staged: StagedUpload,
        owner_id: String,
        role: ImageRole,
        overrides: TransformOverrides,
    ) -> Result<StoredImage, UploadError> {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            this.process_and_store(staged, &owner_id, role, &overrides)
                .await
        })
        .await
        .map_err(|e| UploadError::Worker(e.to_string()))?
    }

    /// Remove a staged file that will not be processed.
    pub async fn discard(&self, mut staged: StagedUpload) {
        self.janitor.remove(&staged.path).await;
        staged.release();
    }

    async fn run(
        &self,
        path: &Path,
        owner_id: &str,
        role: ImageRole,
        overrides: &TransformOverrides,
    ) -> Result<StoredImage, UploadError> {
        let options = TransformOptions::merged(self.images.defaults_for(role), overrides);

        let input = path.to_path_buf();
        let processed = tokio::task::spawn_blocking(move || {
            ImageTransformer::transform_file(&input, role, options)
        })
        .await
        .map_err(|e| UploadError::Worker(e.to_string()))??;

        let key = build_key(
            CHARACTER_ENTITY_KIND,
            owner_id,
            role,
            (self.clock)(),
            processed.extension,
        );

        self.store_with_fallback(&processed.data, &key, processed.content_type)
            .await
    }

    async fn store_with_fallback(
        &self,
        data: &Bytes,
        key: &str,
        content_type: &str,
    ) -> Result<StoredImage, UploadError> {
        let mut remote_error = None;

        if let Some(remote) = &self.storage.remote {
            match remote.put(data.clone(), key, content_type).await {
                Ok(url) => {
                    return Ok(StoredImage {
                        url,
                        key: key.to_string(),
                        backend: StorageBackend::Remote,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        key = %key,
                        backend = %StorageBackend::Remote,
                        "Remote upload failed, falling back to local storage"
                    );
                    remote_error = Some(e);
                }
            }
        }

        match self.storage.local.put(data.clone(), key, content_type).await {
            Ok(url) => Ok(StoredImage {
                url,
                key: key.to_string(),
                backend: StorageBackend::Local,
            }),
            Err(local) => {
                tracing::error!(
                    error = %local,
                    key = %key,
                    backend = %StorageBackend::Local,
                    "Local upload failed"
                );
                Err(match remote_error {
                    Some(remote) => UploadError::Aggregate { remote, local },
                    None => UploadError::Local(local),
                })
            }
        }
    }
}

async fn write_staged<R>(reader: &mut R, file: &mut tokio::fs::File) -> std::io::Result<usize>
where
    R: AsyncRead + Unpin + Send,
{
    let written = tokio::io::copy(reader, file).await?;
    file.flush().await?;
    Ok(written as usize)
}

/// Short alphanumeric extension of the client filename, if any.
fn staged_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?.to_lowercase();
    (!ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .then_some(ext)
}
