//! Value objects handed back to callers of the share lifecycle.

use serde::{Deserialize, Serialize};

/// Outcome of an upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareResult {
    /// Locator of the stored bytes; `None` for text-only shares.
    pub locator: Option<String>,
    /// Access code to hand to recipients.
    pub code: String,
    /// True when identical content was already shared and nothing new was written.
    pub deduplicated: bool,
}

/// A download reference. Carries the derived key instead of the storage path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareReference {
    /// Access key bound to the share's id and code.
    pub key: String,
    /// Access code.
    pub code: String,
    /// Whether there is file content behind the reference.
    pub has_file: bool,
}

/// Preview data for a share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareDetail {
    /// Inline text payload.
    pub text: Option<String>,
    /// File name as the uploader named it, recovered from the locator.
    pub file_name: Option<String>,
}
