use crate::keys::validate_key;
use crate::traits::{Storage, StorageEntry, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use persona_core::RemoteStorageConfig;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

const ACCESS_KEY_HEADER: &str = "AccessKey";

/// CDN-backed object storage
///
/// Objects are written with an authenticated `PUT {base_url}/{zone}/{key}` and served
/// from `{cdn_base_url}/{key}`. Every network failure, timeout and non-2xx status is
/// surfaced as an error; nothing is reported as stored unless the provider said so.
#[derive(Clone)]
pub struct RemoteCdnStorage {
    client: reqwest::Client,
    base_url: String,
    storage_zone: String,
    access_key: String,
    cdn_base_url: String,
}

/// Listing entry as returned by the storage API
#[derive(Debug, Deserialize)]
struct RemoteObject {
    #[serde(rename = "ObjectName")]
    object_name: String,
    #[serde(rename = "IsDirectory", default)]
    is_directory: bool,
}

impl RemoteCdnStorage {
    /// Create a new RemoteCdnStorage instance from configuration
    pub fn new(config: &RemoteStorageConfig) -> StorageResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(RemoteCdnStorage {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            storage_zone: config.storage_zone.trim_matches('/').to_string(),
            access_key: config.access_key.clone(),
            cdn_base_url: config.cdn_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Storage API URL for a key or prefix; each path segment is percent-encoded.
    fn api_url(&self, path: &str) -> String {
        let encoded = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/{}/{}",
            self.base_url,
            urlencoding::encode(&self.storage_zone),
            encoded
        )
    }

    fn describe(err: &reqwest::Error) -> String {
        if err.is_timeout() {
            format!("request timed out: {}", err)
        } else if err.is_connect() {
            format!("connection failed: {}", err)
        } else {
            err.to_string()
        }
    }

    async fn error_body(response: reqwest::Response) -> String {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        format!("status {}: {}", status, text)
    }
}

#[async_trait]
impl Storage for RemoteCdnStorage {
    async fn put(
        &self,
        data: Bytes,
        storage_key: &str,
        content_type: &str,
    ) -> StorageResult<String> {
        validate_key(storage_key)?;
        let size = data.len();
        let start = std::time::Instant::now();

        let response = self
            .client
            .put(self.api_url(storage_key))
            .header(ACCESS_KEY_HEADER, &self.access_key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    zone = %self.storage_zone,
                    key = %storage_key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Remote upload failed"
                );
                StorageError::UploadFailed(Self::describe(&e))
            })?;

        if !response.status().is_success() {
            let details = Self::error_body(response).await;
            tracing::error!(
                zone = %self.storage_zone,
                key = %storage_key,
                size_bytes = size,
                details = %details,
                "Remote upload rejected"
            );
            return Err(StorageError::UploadFailed(details));
        }

        let url = self.public_url(storage_key);

        tracing::info!(
            zone = %self.storage_zone,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Remote upload successful"
        );

        Ok(url)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        validate_key(storage_key)?;

        let response = self
            .client
            .delete(self.api_url(storage_key))
            .header(ACCESS_KEY_HEADER, &self.access_key)
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed(Self::describe(&e)))?;

        let status = response.status();
        if status.is_success() || status == StatusCode::NOT_FOUND {
            tracing::info!(
                zone = %self.storage_zone,
                key = %storage_key,
                "Remote delete successful"
            );
            return Ok(());
        }

        Err(StorageError::DeleteFailed(Self::error_body(response).await))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<StorageEntry>> {
        let trimmed = prefix.trim_matches('/');
        if !trimmed.is_empty() {
            validate_key(trimmed)?;
        }
        // Directory listings require the trailing slash.
        let url = if trimmed.is_empty() {
            self.api_url("")
        } else {
            format!("{}/", self.api_url(trimmed))
        };

        let response = self
            .client
            .get(url)
            .header(ACCESS_KEY_HEADER, &self.access_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| StorageError::ListFailed(Self::describe(&e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(Vec::new()),
            status if !status.is_success() => {
                return Err(StorageError::ListFailed(Self::error_body(response).await))
            }
            _ => {}
        }

        let objects: Vec<RemoteObject> = response
            .json()
            .await
            .map_err(|e| StorageError::ListFailed(format!("Invalid listing response: {}", e)))?;

        tracing::debug!(
            zone = %self.storage_zone,
            prefix = %trimmed,
            count = objects.len(),
            "Remote listing fetched"
        );

        Ok(objects
            .into_iter()
            .map(|o| StorageEntry {
                name: o.object_name,
                is_directory: o.is_directory,
            })
            .collect())
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("{}/{}", self.cdn_base_url, storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Remote
    }
}

#[cfg(all(test, feature = "storage-remote"))]
mod tests {
    use super::*;
    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct StubState {
        objects: Arc<Mutex<HashMap<String, (Vec<u8>, String)>>>,
        fail_puts: bool,
        slow: bool,
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get("AccessKey").and_then(|v| v.to_str().ok()) == Some("secret")
    }

    async fn put_object(
        State(state): State<StubState>,
        Path(path): Path<String>,
        headers: HeaderMap,
        body: Bytes,
    ) -> AxumStatus {
        if state.slow {
            tokio::time::sleep(Duration::from_secs(3)).await;
        }
        if !authorized(&headers) {
            return AxumStatus::UNAUTHORIZED;
        }
        if state.fail_puts {
            return AxumStatus::INTERNAL_SERVER_ERROR;
        }
        let content_type = headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        state
            .objects
            .lock()
            .unwrap()
            .insert(path, (body.to_vec(), content_type));
        AxumStatus::CREATED
    }

    async fn get_object(
        State(state): State<StubState>,
        Path(path): Path<String>,
        headers: HeaderMap,
    ) -> axum::response::Response {
        use axum::response::IntoResponse;
        if !authorized(&headers) {
            return AxumStatus::UNAUTHORIZED.into_response();
        }
        let objects = state.objects.lock().unwrap();
        if let Some(dir) = path.strip_suffix('/') {
            // zone/dir/ -> listing of direct children
            let prefix = format!("{}/", dir);
            let mut names: Vec<serde_json::Value> = Vec::new();
            let mut dirs = std::collections::BTreeSet::new();
            let mut keys: Vec<&String> = objects.keys().collect();
            keys.sort();
            for key in keys {
                if let Some(rest) = key.strip_prefix(&prefix) {
                    match rest.split_once('/') {
                        Some((sub, _)) => {
                            dirs.insert(sub.to_string());
                        }
                        None => names.push(serde_json::json!({
                            "ObjectName": rest,
                            "IsDirectory": false,
                            "Length": 1
                        })),
                    }
                }
            }
            for d in dirs {
                names.push(serde_json::json!({ "ObjectName": d, "IsDirectory": true }));
            }
            return Json(names).into_response();
        }
        match objects.get(&path) {
            Some((data, _)) => data.clone().into_response(),
            None => AxumStatus::NOT_FOUND.into_response(),
        }
    }

    async fn delete_object(
        State(state): State<StubState>,
        Path(path): Path<String>,
    ) -> AxumStatus {
        match state.objects.lock().unwrap().remove(&path) {
            Some(_) => AxumStatus::OK,
            None => AxumStatus::NOT_FOUND,
        }
    }

    async fn spawn_stub(state: StubState) -> String {
        let app = Router::new()
            .route(
                "/{*path}",
                get(get_object).put(put_object).delete(delete_object),
            )
            .with_state(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config(base_url: String, access_key: &str, timeout_secs: u64) -> RemoteStorageConfig {
        RemoteStorageConfig {
            access_key: access_key.to_string(),
            storage_zone: "zone".to_string(),
            base_url,
            cdn_base_url: "https://zone.b-cdn.net/".to_string(),
            timeout_secs,
        }
    }

    #[tokio::test]
    async fn test_put_sends_access_key_and_returns_cdn_url() {
        let state = StubState::default();
        let base = spawn_stub(state.clone()).await;
        let storage = RemoteCdnStorage::new(&config(base, "secret", 5)).unwrap();

        let key = "characters/1/profile-1700000000000.webp";
        let url = storage.put(Bytes::from_static(b"webp-bytes"), key, "image/webp").await.unwrap();

        assert_eq!(url, format!("https://zone.b-cdn.net/{}", key));
        let objects = state.objects.lock().unwrap();
        let (data, content_type) = objects.get(&format!("zone/{}", key)).unwrap();
        assert_eq!(data, b"webp-bytes");
        assert_eq!(content_type, "image/webp");
    }

    #[tokio::test]
    async fn test_non_success_status_is_upload_failure() {
        let state = StubState {
            fail_puts: true,
            ..Default::default()
        };
        let base = spawn_stub(state).await;
        let storage = RemoteCdnStorage::new(&config(base, "secret", 5)).unwrap();

        let result = storage.put(Bytes::from_static(b"x"), "a/b.webp", "image/webp").await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }

    #[tokio::test]
    async fn test_wrong_access_key_is_upload_failure() {
        let base = spawn_stub(StubState::default()).await;
        let storage = RemoteCdnStorage::new(&config(base, "wrong", 5)).unwrap();

        let result = storage.put(Bytes::from_static(b"x"), "a/b.webp", "image/webp").await;
        match result {
            Err(StorageError::UploadFailed(msg)) => assert!(msg.contains("401")),
            other => panic!("expected upload failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_upload_failure() {
        let state = StubState {
            slow: true,
            ..Default::default()
        };
        let base = spawn_stub(state).await;
        let storage = RemoteCdnStorage::new(&config(base, "secret", 1)).unwrap();

        let result = storage.put(Bytes::from_static(b"x"), "a/b.webp", "image/webp").await;
        match result {
            Err(StorageError::UploadFailed(msg)) => assert!(msg.contains("timed out")),
            other => panic!("expected timeout failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_upload_failure() {
        // Port 9 (discard) on localhost is closed in test environments.
        let storage =
            RemoteCdnStorage::new(&config("http://127.0.0.1:9".to_string(), "secret", 2)).unwrap();
        let result = storage.put(Bytes::from_static(b"x"), "a/b.webp", "image/webp").await;
        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
    }

    #[tokio::test]
    async fn test_put_then_list_maps_back_to_url() {
        let base = spawn_stub(StubState::default()).await;
        let storage = RemoteCdnStorage::new(&config(base, "secret", 5)).unwrap();

        let key = "characters/9/profile-1700000000001.webp";
        let url = storage.put(Bytes::from_static(b"a"), key, "image/webp").await.unwrap();
        storage
            .put(Bytes::from_static(b"b"), "characters/9/old/thing.webp", "image/webp")
            .await
            .unwrap();

        let entries = storage.list("characters/9").await.unwrap();
        assert!(entries.contains(&StorageEntry::directory("old")));
        let urls: Vec<String> = entries
            .iter()
            .filter(|e| !e.is_directory)
            .map(|e| storage.public_url(&crate::keys::join_key("characters/9", &e.name)))
            .collect();
        assert_eq!(urls, vec![url]);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let state = StubState::default();
        let base = spawn_stub(state.clone()).await;
        let storage = RemoteCdnStorage::new(&config(base, "secret", 5)).unwrap();

        storage
            .put(Bytes::from_static(b"payload"), "x/y.webp", "image/webp")
            .await
            .unwrap();
        assert!(state.objects.lock().unwrap().contains_key("zone/x/y.webp"));

        storage.delete("x/y.webp").await.unwrap();
        storage.delete("x/y.webp").await.unwrap();
        assert!(state.objects.lock().unwrap().is_empty());
    }
}
