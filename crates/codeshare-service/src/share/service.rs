//! Share lifecycle manager.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use codeshare_core::error::{AppError, ErrorKind};
use codeshare_core::result::AppResult;
use codeshare_core::traits::storage::ByteStream;
use codeshare_database::repositories::share::ShareRepository;
use codeshare_entity::share::{
    CreateShare, Share, ShareDetail, ShareReference, ShareResult, ShareStatus,
};
use codeshare_storage::{ContentStore, IncomingFile, fingerprint};

use super::code::CodeGenerator;
use super::expiry::ExpiryPolicy;

/// Request to create a share.
#[derive(Debug, Default)]
pub struct UploadShare {
    /// Uploaded file, if any.
    pub file: Option<IncomingFile>,
    /// Inline text, if any.
    pub text: Option<String>,
    /// Lifetime quantity; 0 never expires.
    pub expire_quantity: i64,
    /// Raw lifetime unit code (1 minutes, 2 hours, 3 days; other values minutes).
    pub expire_unit: i64,
    /// Caller-chosen access code, used verbatim when non-empty.
    pub custom_code: Option<String>,
}

/// An authorized download, ready to stream.
pub struct ShareDownload {
    /// Name the uploader gave the file.
    pub file_name: String,
    /// Content bytes.
    pub stream: ByteStream,
}

impl std::fmt::Debug for ShareDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareDownload")
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// Orchestrates upload, resolve, authorize and detail over the record
/// store and the content store.
#[derive(Debug, Clone)]
pub struct ShareService {
    /// Share record store.
    share_repo: Arc<dyn ShareRepository>,
    /// Uploaded content storage.
    content: Arc<ContentStore>,
    /// Codes and keys.
    codes: CodeGenerator,
    /// Expiry evaluation.
    expiry: ExpiryPolicy,
    /// Largest accepted upload in bytes.
    max_upload_size: u64,
    /// Generated codes tried before giving up on a free one.
    code_attempts: u32,
}

impl ShareService {
    /// Creates a new share service.
    pub fn new(
        share_repo: Arc<dyn ShareRepository>,
        content: Arc<ContentStore>,
        expiry: ExpiryPolicy,
        max_upload_size: u64,
        code_attempts: u32,
    ) -> Self {
        Self {
            share_repo,
            content,
            codes: CodeGenerator::new(),
            expiry,
            max_upload_size,
            code_attempts: code_attempts.max(1),
        }
    }

    /// Creates a share from a file and/or text.
    ///
    /// A file whose bytes were shared before yields the existing share's
    /// locator and code; nothing new is written.
    pub async fn upload(&self, req: UploadShare) -> AppResult<ShareResult> {
        if req.expire_quantity < 0 {
            return Err(AppError::validation("Expire time must not be negative"));
        }

        let text = req.text.filter(|t| !t.is_empty());
        let custom_code = req.custom_code.filter(|c| !c.is_empty());

        match req.file {
            Some(file) => {
                self.upload_file(
                    &file,
                    text,
                    req.expire_quantity,
                    req.expire_unit,
                    custom_code.as_deref(),
                )
                .await
            }
            None => {
                let Some(text) = text else {
                    return Err(AppError::validation("A file or text is required"));
                };
                self.upload_text(text, req.expire_quantity, req.expire_unit, custom_code.as_deref())
                    .await
            }
        }
    }

    async fn upload_file(
        &self,
        file: &IncomingFile,
        text: Option<String>,
        expire_quantity: i64,
        expire_unit: i64,
        custom_code: Option<&str>,
    ) -> AppResult<ShareResult> {
        if file.size() > self.max_upload_size {
            return Err(AppError::validation(format!(
                "File exceeds maximum upload size of {} bytes",
                self.max_upload_size
            )));
        }
        if file.size() == 0 {
            return Err(AppError::validation("Uploaded file is empty"));
        }

        let id = fingerprint(file.open().await?).await?;

        if let Some(existing) = self.share_repo.find_by_id(&id).await? {
            info!(share_id = %id, code = %existing.code, "Duplicate upload, reusing share");
            return Ok(deduplicated(existing));
        }

        let locator = self.content.store(file).await?;

        let code = match self.allocate_code(custom_code).await {
            Ok(code) => code,
            Err(e) => {
                self.discard(&locator).await;
                return Err(e);
            }
        };

        let data = CreateShare {
            id: id.clone(),
            locator: Some(locator.clone()),
            text,
            expire_quantity,
            expire_unit,
            code,
        };

        match self.share_repo.create(&data).await {
            Ok(share) => {
                info!(
                    share_id = %share.id,
                    code = %share.code,
                    bytes = file.size(),
                    expire_quantity,
                    expire_unit = ?share.unit(),
                    "File share created"
                );
                Ok(ShareResult {
                    locator: share.locator,
                    code: share.code,
                    deduplicated: false,
                })
            }
            Err(e) if e.kind == ErrorKind::Conflict => {
                // Another upload of the same bytes won the insert.
                self.discard(&locator).await;
                match self.share_repo.find_by_id(&id).await? {
                    Some(existing) => {
                        info!(share_id = %id, code = %existing.code, "Concurrent duplicate upload, reusing share");
                        Ok(deduplicated(existing))
                    }
                    None => Err(e),
                }
            }
            Err(e) => {
                self.discard(&locator).await;
                Err(e)
            }
        }
    }

    async fn upload_text(
        &self,
        text: String,
        expire_quantity: i64,
        expire_unit: i64,
        custom_code: Option<&str>,
    ) -> AppResult<ShareResult> {
        let data = CreateShare {
            id: Uuid::new_v4().simple().to_string(),
            locator: None,
            text: Some(text),
            expire_quantity,
            expire_unit,
            code: self.allocate_code(custom_code).await?,
        };

        let share = self.share_repo.create(&data).await?;
        info!(
            share_id = %share.id,
            code = %share.code,
            expire_quantity,
            expire_unit = ?share.unit(),
            "Text share created"
        );

        Ok(ShareResult {
            locator: None,
            code: share.code,
            deduplicated: false,
        })
    }

    /// Resolves a code to a download reference and marks the share accessed.
    ///
    /// A failed status write is logged and does not block the reference.
    pub async fn resolve(&self, code: &str) -> AppResult<ShareReference> {
        let share = self.load_live(code).await?;
        let key = self.codes.derive_key(&share.id, &share.code);

        if share.status != ShareStatus::Accessed {
            match self
                .share_repo
                .update_status(&share.id, ShareStatus::Accessed)
                .await
            {
                Ok(true) => debug!(share_id = %share.id, "Share marked accessed"),
                Ok(false) => warn!(share_id = %share.id, "Share vanished before status update"),
                Err(e) => warn!(share_id = %share.id, error = %e, "Failed to mark share accessed"),
            }
        }

        Ok(ShareReference {
            key,
            has_file: share.has_file(),
            code: share.code,
        })
    }

    /// Checks `key` against the share for `code` and returns its locator.
    pub async fn authorize(&self, key: &str, code: &str) -> AppResult<String> {
        let share = self.load_live(code).await?;

        if !self.codes.verify_key(key, &share.id, &share.code) {
            info!(code = %code, "Download key mismatch");
            return Err(AppError::key_mismatch("Access key does not match share code"));
        }

        share
            .locator
            .ok_or_else(|| AppError::not_found("Share has no file"))
    }

    /// Authorizes a download and opens the content for streaming.
    pub async fn download(&self, key: &str, code: &str) -> AppResult<ShareDownload> {
        let locator = self.authorize(key, code).await?;
        let stream = self.content.open(&locator).await?;
        Ok(ShareDownload {
            file_name: self.content.original_name(&locator),
            stream,
        })
    }

    /// Preview data for the share behind `code`. Does not change its status.
    pub async fn detail(&self, code: &str) -> AppResult<ShareDetail> {
        let share = self.load_live(code).await?;
        Ok(ShareDetail {
            file_name: share
                .locator
                .as_deref()
                .map(|locator| self.content.original_name(locator)),
            text: share.text,
        })
    }

    async fn load_live(&self, code: &str) -> AppResult<Share> {
        let share = self
            .share_repo
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No share for code {code}")))?;

        if let Err(e) = self.expiry.ensure_live(&share) {
            debug!(share_id = %share.id, code = %code, "Share expired");
            return Err(e);
        }
        Ok(share)
    }

    async fn allocate_code(&self, custom_code: Option<&str>) -> AppResult<String> {
        if custom_code.is_some() {
            return Ok(self.codes.issue_code(custom_code));
        }

        for attempt in 1..=self.code_attempts {
            let code = self.codes.issue_code(None);
            if self.share_repo.find_by_code(&code).await?.is_none() {
                return Ok(code);
            }
            debug!(attempt, "Generated code already taken");
        }

        Err(AppError::conflict("Could not allocate a free share code"))
    }

    /// Best-effort removal of bytes that no record will point at.
    async fn discard(&self, locator: &str) {
        if let Err(e) = self.content.remove(locator).await {
            warn!(error = %e, "Failed to remove orphaned upload");
        }
    }
}

fn deduplicated(share: Share) -> ShareResult {
    ShareResult {
        locator: share.locator,
        code: share.code,
        deduplicated: true,
    }
}
