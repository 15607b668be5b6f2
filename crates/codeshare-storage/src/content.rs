//! Places uploads under collision-resistant names and hands back locators
//! of the form `<root>/<base>_<suffix><ext>`.

use std::sync::Arc;

use tracing::{debug, error};

use codeshare_core::error::{AppError, ErrorKind};
use codeshare_core::result::AppResult;
use codeshare_core::traits::storage::{ByteStream, StorageProvider};

use crate::incoming::IncomingFile;

/// Writes uploaded content to byte storage and resolves locators back to it.
#[derive(Debug, Clone)]
pub struct ContentStore {
    provider: Arc<dyn StorageProvider>,
    /// Locator prefix; the configured storage root without a trailing slash.
    root: String,
}

impl ContentStore {
    /// Create a content store over a provider rooted at `root`.
    pub fn new(provider: Arc<dyn StorageProvider>, root: &str) -> Self {
        let trimmed = root.trim_end_matches('/');
        Self {
            provider,
            root: if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() },
        }
    }

    /// Persist an uploaded file and return its locator.
    ///
    /// Empty uploads are rejected before anything is created on disk.
    pub async fn store(&self, file: &IncomingFile) -> AppResult<String> {
        if file.size() == 0 {
            return Err(AppError::validation("Uploaded file is empty"));
        }

        self.provider.create_dir("").await.map_err(|e| {
            error!(root = %self.root, error = %e, "Storage root could not be created");
            AppError::new(
                ErrorKind::Storage,
                format!("Failed to create storage directory: {}", e.message),
            )
        })?;

        let name = storage_file_name(file.file_name(), &random_suffix());
        let stream = file.open().await?;
        let written = self.provider.write_stream(&name, stream).await?;

        debug!(name = %name, bytes = written, "Stored upload");
        Ok(self.locator_for(&name))
    }

    /// Open stored content for streaming.
    pub async fn open(&self, locator: &str) -> AppResult<ByteStream> {
        self.provider.read(self.relative_path(locator)?).await
    }

    /// Remove stored content. Missing content is not an error.
    pub async fn remove(&self, locator: &str) -> AppResult<()> {
        self.provider.delete(self.relative_path(locator)?).await
    }

    /// The file name the uploader used, recovered from a locator.
    ///
    /// Strips the storage root and the `_<suffix>` token in front of the
    /// extension, then puts the extension back.
    pub fn original_name(&self, locator: &str) -> String {
        let stored = locator
            .strip_prefix(self.root.as_str())
            .map(|rest| rest.trim_start_matches('/'))
            .unwrap_or_else(|| locator.rsplit('/').next().unwrap_or(locator));
        original_file_name(stored)
    }

    fn locator_for(&self, name: &str) -> String {
        if self.root == "/" {
            format!("/{name}")
        } else {
            format!("{}/{name}", self.root)
        }
    }

    fn relative_path<'a>(&self, locator: &'a str) -> AppResult<&'a str> {
        locator
            .strip_prefix(self.root.as_str())
            .map(|rest| rest.trim_start_matches('/'))
            .filter(|rest| !rest.is_empty())
            .ok_or_else(|| AppError::not_found("Stored content not found"))
    }
}

/// Split a file name into stem and extension (with its dot).
///
/// The extension starts at the last dot, so `archive.tar.gz` yields
/// `("archive.tar", ".gz")` and `README` yields `("README", "")`.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

/// Build `<base>_<suffix><ext>` from the uploader's file name.
///
/// Only the final path component of the original name is kept.
fn storage_file_name(original: &str, suffix: &str) -> String {
    let base_name = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let base_name = match base_name {
        "" | "." | ".." => "file",
        other => other,
    };
    let (stem, ext) = split_extension(base_name);
    format!("{stem}_{suffix}{ext}")
}

fn original_file_name(stored: &str) -> String {
    let (stem, ext) = split_extension(stored);
    let stem = match stem.rfind('_') {
        Some(idx) => &stem[..idx],
        None => stem,
    };
    format!("{stem}{ext}")
}

/// Eight hex characters from 32 random bits.
fn random_suffix() -> String {
    format!("{:08x}", rand::random::<u32>())
}
