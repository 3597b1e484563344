//! Upload pipeline: staging, processing, storage with fallback, cleanup

pub mod janitor;
pub mod service;
pub mod types;

pub use janitor::{FsJanitor, Janitor};
pub use service::UploadOrchestrator;
pub use types::{StagedUpload, StoredImage, UploadError};
