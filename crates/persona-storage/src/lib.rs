//! Persona Storage Library
//!
//! This crate provides the storage abstraction and its two implementations: the
//! CDN-backed remote object store and the local filesystem fallback.
//!
//! # Storage key format
//!
//! Every backend uses the same key layout:
//!
//! `{entity_kind}/{owner_id}/{role}-{epoch_millis}.{ext}`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends stay consistent.

pub mod factory;
pub mod keys;
pub mod local;
#[cfg(feature = "storage-remote")]
pub mod remote;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_storage, StorageSet};
pub use local::LocalStorage;
pub use persona_core::StorageBackend;
#[cfg(feature = "storage-remote")]
pub use remote::RemoteCdnStorage;
pub use traits::{Storage, StorageEntry, StorageError, StorageResult};
