//! Uploaded file bodies spooled to disk so they can be read more than once.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use codeshare_core::error::{AppError, ErrorKind};
use codeshare_core::result::AppResult;
use codeshare_core::traits::storage::ByteStream;

/// An uploaded file waiting to be fingerprinted and stored.
///
/// The content can be opened any number of times. A spooled file is
/// removed from disk when this value is dropped.
#[derive(Debug)]
pub struct IncomingFile {
    file_name: String,
    path: PathBuf,
    size: u64,
    _spool: Option<TempPath>,
}

impl IncomingFile {
    /// Wrap an existing file. Its size is read from the filesystem.
    pub async fn from_path(path: impl Into<PathBuf>, file_name: impl Into<String>) -> AppResult<Self> {
        let path = path.into();
        let meta = tokio::fs::metadata(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::validation("No file uploaded")
            } else {
                AppError::with_source(ErrorKind::Storage, "Failed to stat uploaded file", e)
            }
        })?;
        Ok(Self {
            file_name: file_name.into(),
            path,
            size: meta.len(),
            _spool: None,
        })
    }

    /// Copy a request body stream into a scratch file under `dir`.
    ///
    /// Fails with a validation error as soon as more than `max_size` bytes
    /// have arrived; the partial scratch file is removed.
    pub async fn spool<S, E>(
        stream: S,
        file_name: impl Into<String>,
        dir: &Path,
        max_size: u64,
    ) -> AppResult<Self>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create spool directory: {}", dir.display()),
                e,
            )
        })?;

        let temp_path = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(dir)
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to create spool file", e))?
            .into_temp_path();

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to open spool file", e))?;

        let mut stream = std::pin::pin!(stream);
        let mut size = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| AppError::with_source(ErrorKind::Validation, "Failed to read upload", e))?;
            size += chunk.len() as u64;
            if size > max_size {
                return Err(AppError::validation(format!(
                    "File exceeds maximum upload size of {max_size} bytes"
                )));
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to spool upload", e))?;
        }
        file.flush()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to flush spool file", e))?;

        debug!(path = ?temp_path, bytes = size, "Spooled upload");

        Ok(Self {
            file_name: file_name.into(),
            path: temp_path.to_path_buf(),
            size,
            _spool: Some(temp_path),
        })
    }

    /// The name the uploader gave the file.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Content length in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Open the content as a byte stream.
    pub async fn open(&self) -> AppResult<ByteStream> {
        let file = tokio::fs::File::open(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::validation("No file uploaded")
            } else {
                AppError::with_source(ErrorKind::Storage, "Failed to open uploaded file", e)
            }
        })?;
        Ok(Box::pin(ReaderStream::new(file)))
    }
}
