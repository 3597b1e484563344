//! In-memory stand-in for the remote CDN backend.

use async_trait::async_trait;
use bytes::Bytes;
use persona_storage::{Storage, StorageBackend, StorageEntry, StorageError, StorageResult};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub const CDN_BASE: &str = "https://cdn.test";

/// Keeps objects in insertion order so listings are deterministic.
#[derive(Default)]
pub struct MemoryRemote {
    objects: Mutex<Vec<(String, Vec<u8>)>>,
    puts: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every put fails, as if the CDN were unreachable.
    pub fn failing() -> Self {
        let remote = Self::default();
        remote.set_failing(true);
        remote
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    /// Seed an object without counting it as an upload.
    pub fn insert(&self, key: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .push((key.to_string(), data.to_vec()));
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, data)| data.clone())
    }

    /// Object bytes behind a public URL returned by this backend.
    pub fn get_by_url(&self, url: &str) -> Option<Vec<u8>> {
        let key = url.strip_prefix(CDN_BASE)?.trim_start_matches('/');
        self.get(key)
    }
}

#[async_trait]
impl Storage for MemoryRemote {
    async fn put(
        &self,
        data: Bytes,
        storage_key: &str,
        _content_type: &str,
    ) -> StorageResult<String> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed(
                "connection failed: remote unreachable".to_string(),
            ));
        }
        let mut objects = self.objects.lock().unwrap();
        objects.retain(|(k, _)| k != storage_key);
        objects.push((storage_key.to_string(), data.to_vec()));
        Ok(self.public_url(storage_key))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().retain(|(k, _)| k != storage_key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<StorageEntry>> {
        let prefix = format!("{}/", prefix.trim_matches('/'));
        let mut entries: Vec<StorageEntry> = Vec::new();
        for (key, _) in self.objects.lock().unwrap().iter() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            let entry = match rest.split_once('/') {
                Some((dir, _)) => StorageEntry::directory(dir),
                None => StorageEntry::file(rest),
            };
            if !entries.contains(&entry) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    fn public_url(&self, storage_key: &str) -> String {
        format!("{}/{}", CDN_BASE, storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Remote
    }
}
