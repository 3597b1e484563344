use crate::LocalStorage;
#[cfg(feature = "storage-remote")]
use crate::RemoteCdnStorage;
use crate::{Storage, StorageResult};
use persona_core::Config;
use std::sync::Arc;

/// The configured backends, in fallback order.
///
/// `remote` is absent when its credentials are not configured; `local` always exists.
#[derive(Clone)]
pub struct StorageSet {
    pub remote: Option<Arc<dyn Storage>>,
    pub local: Arc<dyn Storage>,
}

impl StorageSet {
    pub fn new(remote: Option<Arc<dyn Storage>>, local: Arc<dyn Storage>) -> Self {
        Self { remote, local }
    }

    /// Backend used for reads such as gallery listings: remote when configured.
    pub fn primary(&self) -> &Arc<dyn Storage> {
        self.remote.as_ref().unwrap_or(&self.local)
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }
}

/// Create the storage backends from configuration
pub async fn create_storage(config: &Config) -> StorageResult<StorageSet> {
    let remote: Option<Arc<dyn Storage>> = match &config.remote_storage {
        #[cfg(feature = "storage-remote")]
        Some(remote_config) => {
            let storage = RemoteCdnStorage::new(remote_config)?;
            tracing::info!(
                zone = %remote_config.storage_zone,
                cdn = %remote_config.cdn_base_url,
                "Remote storage configured"
            );
            Some(Arc::new(storage))
        }
        #[cfg(not(feature = "storage-remote"))]
        Some(_) => {
            tracing::warn!(
                "Remote storage credentials present but storage-remote feature not enabled"
            );
            None
        }
        None => {
            tracing::warn!("Remote storage not configured, uploads will use local storage only");
            None
        }
    };

    let local = LocalStorage::new(
        config.local_storage.base_path.clone(),
        config.local_storage.route_prefix.clone(),
    )
    .await?;
    tracing::info!(
        path = %config.local_storage.base_path.display(),
        route = %config.local_storage.route_prefix,
        "Local storage configured"
    );
    Ok(StorageSet::new(remote, Arc::new(local)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::StorageBackend;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned()).unwrap()
    }

    #[tokio::test]
    async fn test_local_only_without_remote_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("uploads");
        let config = config(&[
            ("ADMIN_API_KEY", "0123456789abcdef0123"),
            ("LOCAL_STORAGE_PATH", path.to_str().unwrap()),
        ]);

        let set = create_storage(&config).await.unwrap();
        assert!(!set.has_remote());
        assert_eq!(set.primary().backend_type(), StorageBackend::Local);
        assert!(path.exists());
    }

    #[cfg(feature = "storage-remote")]
    #[tokio::test]
    async fn test_remote_is_primary_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&[
            ("ADMIN_API_KEY", "0123456789abcdef0123"),
            ("LOCAL_STORAGE_PATH", dir.path().to_str().unwrap()),
            ("BUNNY_STORAGE_ACCESS_KEY", "key"),
            ("BUNNY_STORAGE_ZONE", "zone"),
            ("BUNNY_CDN_BASE_URL", "https://zone.b-cdn.net"),
        ]);

        let set = create_storage(&config).await.unwrap();
        assert!(set.has_remote());
        assert_eq!(set.primary().backend_type(), StorageBackend::Remote);
        assert_eq!(set.local.backend_type(), StorageBackend::Local);
    }
}
