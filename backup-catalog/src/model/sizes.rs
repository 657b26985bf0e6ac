//! Raw storage reports supplied by the size-measurement collaborator.

use serde::{Deserialize, Serialize};

/// Byte counts reported for one application.
///
/// `data_bytes` is the platform's total for the data directory and includes
/// the cache.
pub trait StorageStats {
    fn app_bytes(&self) -> u64;
    fn cache_bytes(&self) -> u64;
    fn data_bytes(&self) -> u64;
}

/// Plain storage report, as read from an inventory file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSizeReport {
    pub app_bytes: u64,
    pub cache_bytes: u64,
    pub data_bytes: u64,
}

impl StorageStats for RawSizeReport {
    fn app_bytes(&self) -> u64 {
        self.app_bytes
    }

    fn cache_bytes(&self) -> u64 {
        self.cache_bytes
    }

    fn data_bytes(&self) -> u64 {
        self.data_bytes
    }
}
