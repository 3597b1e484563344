use async_trait::async_trait;
use std::path::Path;

/// Removes staged temp files once the upload pipeline is done with them.
#[async_trait]
pub trait Janitor: Send + Sync {
    /// Best effort: failures are logged, never returned.
    async fn remove(&self, path: &Path);
}

/// Deletes staged files from the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct FsJanitor;

#[async_trait]
impl Janitor for FsJanitor {
    async fn remove(&self, path: &Path) {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed staged upload");
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    "Failed to remove staged upload"
                );
            }
        }
    }
}
