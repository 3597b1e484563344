//! Shared key generation for storage backends.
//!
//! Key format: `{entity_kind}/{owner_id}/{role}-{epoch_millis}.{ext}`. The millisecond
//! timestamp keeps repeated uploads for the same owner and role apart without a
//! counter or lock; replaced keys are left behind as orphans.

use chrono::{DateTime, Utc};
use persona_core::ImageRole;

use crate::traits::{StorageError, StorageResult};

/// Build the storage key for one upload.
pub fn build_key(
    entity_kind: &str,
    owner_id: &str,
    role: ImageRole,
    now: DateTime<Utc>,
    extension: &str,
) -> String {
    format!(
        "{}{}-{}.{}",
        owner_prefix(entity_kind, owner_id),
        role.as_str(),
        now.timestamp_millis(),
        extension.trim_start_matches('.')
    )
}

/// Prefix under which every object of one owner lives (with trailing slash).
pub fn owner_prefix(entity_kind: &str, owner_id: &str) -> String {
    format!("{}/{}/", entity_kind, owner_id)
}

/// Join a listing prefix and an entry name into a key.
pub fn join_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

/// Reject keys that could escape a backend root.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if storage_key.starts_with('/')
        || storage_key.starts_with('\\')
        || storage_key.split(['/', '\\']).any(|segment| segment == "..")
    {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}
