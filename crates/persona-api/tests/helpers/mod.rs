//! Test helpers: build state and router for integration tests.
//!
//! Everything runs in-process: the in-memory repository, local storage in a temp
//! dir and an optional in-memory stand-in for the remote CDN.

#![allow(dead_code)]

pub mod chat;
pub mod fixtures;
pub mod storage;

use axum_test::TestServer;
use persona_api::services::ChatCompletionClient;
use persona_api::setup::{routes, services::build_state};
use persona_core::Config;
use persona_db::InMemoryCharacterRepository;
use persona_storage::{LocalStorage, Storage, StorageSet};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

use storage::MemoryRemote;

/// Admin key configured for every test app.
pub const TEST_ADMIN_KEY: &str = "test-admin-key-0123456789";

/// Upload limit used by the test config (2 MiB).
pub const TEST_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;

pub struct TestApp {
    pub server: TestServer,
    pub remote: Option<Arc<MemoryRemote>>,
    pub storage_dir: TempDir,
    pub tmp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn remote(&self) -> &MemoryRemote {
        self.remote.as_deref().expect("test app has no remote storage")
    }

    /// Files left in the upload staging dir.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.tmp_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Files written by the local backend, recursively.
    pub fn local_files(&self) -> usize {
        count_files(self.storage_dir.path())
    }
}

#[derive(Default)]
pub struct TestAppOptions {
    pub remote: Option<Arc<MemoryRemote>>,
    pub chat: Option<Arc<dyn ChatCompletionClient>>,
}

/// App with a healthy remote backend and no chat provider.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestAppOptions {
        remote: Some(Arc::new(MemoryRemote::new())),
        chat: None,
    })
    .await
}

pub async fn setup_test_app_with(options: TestAppOptions) -> TestApp {
    let storage_dir = tempfile::tempdir().expect("Failed to create storage dir");
    let tmp_dir = tempfile::tempdir().expect("Failed to create staging dir");

    let config = Arc::new(create_test_config(storage_dir.path(), tmp_dir.path()));

    let local = LocalStorage::new(
        storage_dir.path(),
        config.local_storage.route_prefix.clone(),
    )
    .await
    .expect("Failed to create local storage");

    let storage = StorageSet::new(
        options
            .remote
            .clone()
            .map(|remote| remote as Arc<dyn Storage>),
        Arc::new(local),
    );

    let state = build_state(
        config.clone(),
        Arc::new(InMemoryCharacterRepository::new()),
        None,
        storage,
        options.chat,
    );
    let router = routes::setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to start test server");

    TestApp {
        server,
        remote: options.remote,
        storage_dir,
        tmp_dir,
    }
}

pub fn create_test_config(storage_dir: &Path, tmp_dir: &Path) -> Config {
    let storage_dir = storage_dir.display().to_string();
    let tmp_dir = tmp_dir.display().to_string();
    Config::from_lookup(|key| match key {
        "ADMIN_API_KEY" => Some(TEST_ADMIN_KEY.to_string()),
        "LOCAL_STORAGE_PATH" => Some(storage_dir.clone()),
        "LOCAL_STORAGE_ROUTE" => Some("/uploads".to_string()),
        "UPLOAD_TMP_DIR" => Some(tmp_dir.clone()),
        "MAX_UPLOAD_BYTES" => Some(TEST_MAX_UPLOAD_BYTES.to_string()),
        _ => None,
    })
    .expect("Failed to build test config")
}

fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}
