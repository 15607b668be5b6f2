//! Content storage configuration.

use serde::{Deserialize, Serialize};

/// 500 MiB, the largest accepted upload.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// Byte storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for uploaded content. Also the prefix of every
    /// locator handed out, so changing it orphans existing records.
    #[serde(default = "default_root")]
    pub root: String,
    /// Maximum upload size in bytes.
    #[serde(default = "default_max_upload")]
    pub max_upload_size_bytes: u64,
    /// Directory where multipart bodies are spooled before hashing.
    /// Empty means the system temporary directory.
    #[serde(default)]
    pub spool_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            max_upload_size_bytes: default_max_upload(),
            spool_dir: String::new(),
        }
    }
}

impl StorageConfig {
    /// Resolve the spool directory, falling back to the system temp dir.
    pub fn spool_path(&self) -> std::path::PathBuf {
        if self.spool_dir.is_empty() {
            std::env::temp_dir()
        } else {
            std::path::PathBuf::from(&self.spool_dir)
        }
    }
}

fn default_root() -> String {
    "./share".to_string()
}

fn default_max_upload() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}
