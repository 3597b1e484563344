//! Hand-written doubles shared by the service unit tests.

use crate::services::upload::Janitor;
use async_trait::async_trait;
use bytes::Bytes;
use persona_core::StorageBackend;
use persona_storage::{Storage, StorageEntry, StorageError, StorageResult};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory storage backend with a switchable failure mode.
pub struct MockStorage {
    backend: StorageBackend,
    url_prefix: String,
    fail_puts: bool,
    pub objects: Mutex<HashMap<String, Vec<u8>>>,
    pub put_calls: Mutex<Vec<String>>,
    /// Address of each buffer handed to `put`
    pub put_buffers: Mutex<Vec<usize>>,
    pub listing: Mutex<Vec<StorageEntry>>,
    pub call_log: Option<Arc<Mutex<Vec<String>>>>,
}

impl MockStorage {
    pub fn new(backend: StorageBackend) -> Self {
        let url_prefix = match backend {
            StorageBackend::Remote => "https://cdn.test".to_string(),
            StorageBackend::Local => "/uploads".to_string(),
        };
        Self {
            backend,
            url_prefix,
            fail_puts: false,
            objects: Mutex::new(HashMap::new()),
            put_calls: Mutex::new(Vec::new()),
            put_buffers: Mutex::new(Vec::new()),
            listing: Mutex::new(Vec::new()),
            call_log: None,
        }
    }

    pub fn failing(backend: StorageBackend) -> Self {
        Self {
            fail_puts: true,
            ..Self::new(backend)
        }
    }

    pub fn with_call_log(mut self, log: Arc<Mutex<Vec<String>>>) -> Self {
        self.call_log = Some(log);
        self
    }

    pub fn with_listing(self, entries: Vec<StorageEntry>) -> Self {
        *self.listing.lock().unwrap() = entries;
        self
    }

    pub fn put_count(&self) -> usize {
        self.put_calls.lock().unwrap().len()
    }

    pub fn object(&self, storage_key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(storage_key).cloned()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn put(
        &self,
        data: Bytes,
        storage_key: &str,
        _content_type: &str,
    ) -> StorageResult<String> {
        self.put_calls.lock().unwrap().push(storage_key.to_string());
        self.put_buffers.lock().unwrap().push(data.as_ptr() as usize);
        if let Some(log) = &self.call_log {
            log.lock().unwrap().push(format!("{}:put", self.backend));
        }
        if self.fail_puts {
            return Err(match self.backend {
                StorageBackend::Remote => {
                    StorageError::UploadFailed("connection refused".to_string())
                }
                StorageBackend::Local => StorageError::UploadFailed("disk full".to_string()),
            });
        }
        self.objects
            .lock()
            .unwrap()
            .insert(storage_key.to_string(), data.to_vec());
        Ok(self.public_url(storage_key))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().remove(storage_key);
        Ok(())
    }

    async fn list(&self, _prefix: &str) -> StorageResult<Vec<StorageEntry>> {
        Ok(self.listing.lock().unwrap().clone())
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("{}/{}", self.url_prefix, storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        self.backend
    }
}

/// Janitor that records every removal and then deletes the file.
#[derive(Default)]
pub struct CountingJanitor {
    pub removed: Mutex<Vec<PathBuf>>,
}

impl CountingJanitor {
    pub fn count(&self) -> usize {
        self.removed.lock().unwrap().len()
    }
}

#[async_trait]
impl Janitor for CountingJanitor {
    async fn remove(&self, path: &Path) {
        self.removed.lock().unwrap().push(path.to_path_buf());
        let _ = tokio::fs::remove_file(path).await;
    }
}

/// Encoded PNG with a simple gradient.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 200, 255])
    });
    let mut buffer = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}
