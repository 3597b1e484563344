use std::fmt::{Display, Formatter, Result as FmtResult};

/// Storage backend types
///
/// `Remote` is the CDN-backed object store; `Local` is the on-disk fallback
/// served through a static route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Remote,
    Local,
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Remote => write!(f, "remote"),
            StorageBackend::Local => write!(f, "local"),
        }
    }
}
