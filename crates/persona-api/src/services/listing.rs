//! Gallery listings: backend listing filtered by extension and mapped to public URLs.

use persona_core::constants::{CAROUSEL_EXTENSIONS, VIDEO_EXTENSIONS};
use persona_core::GalleryConfig;
use persona_storage::keys::join_key;
use persona_storage::{Storage, StorageError};
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct ListingService {
    storage: Arc<dyn Storage>,
    gallery: GalleryConfig,
}

impl ListingService {
    pub fn new(storage: Arc<dyn Storage>, gallery: GalleryConfig) -> Self {
        Self { storage, gallery }
    }

    /// Public URLs of the files directly under `prefix` whose extension is in
    /// `extensions` (case-insensitive). Backend order is preserved.
    #[tracing::instrument(skip(self, extensions), fields(backend = %self.storage.backend_type()))]
    pub async fn list(
        &self,
        prefix: &str,
        extensions: &[&str],
    ) -> Result<Vec<String>, StorageError> {
        let entries = self.storage.list(prefix).await?;
        let total = entries.len();

        let urls: Vec<String> = entries
            .into_iter()
            .filter(|entry| !entry.is_directory)
            .filter(|entry| has_extension(&entry.name, extensions))
            .map(|entry| self.storage.public_url(&join_key(prefix, &entry.name)))
            .collect();

        tracing::debug!(total, matched = urls.len(), "Gallery listing filtered");

        Ok(urls)
    }

    pub async fn videos(&self) -> Result<Vec<String>, StorageError> {
        self.list(&self.gallery.videos_prefix, VIDEO_EXTENSIONS).await
    }

    pub async fn carousel(&self) -> Result<Vec<String>, StorageError> {
        self.list(&self.gallery.carousel_prefix, CAROUSEL_EXTENSIONS)
            .await
    }
}

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}
