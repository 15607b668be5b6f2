//! Request DTOs with validation.

use std::borrow::Cow;

use validator::{Validate, ValidationError, ValidationErrors};

use codeshare_core::error::AppError;
use codeshare_service::UploadShare;
use codeshare_storage::IncomingFile;

/// Longest accepted custom access code.
pub const MAX_CODE_LEN: u64 = 64;

/// Longest accepted inline text, in characters.
pub const MAX_TEXT_LEN: u64 = 1_000_000;

/// Typed form of `POST /api/upload`.
///
/// Multipart fields: `file`, `text`, `code`, `expireTime`, `expireUnit`.
#[derive(Debug, Default, Validate)]
#[validate(schema(function = "validate_has_content"))]
pub struct UploadRequest {
    /// Spooled `file` part.
    pub file: Option<IncomingFile>,
    /// `text` part.
    #[validate(length(max = MAX_TEXT_LEN, message = "Text is too long"))]
    pub text: Option<String>,
    /// `code` part; a caller-chosen access code.
    #[validate(
        length(min = 1, max = MAX_CODE_LEN, message = "Code must be 1 to 64 characters"),
        custom(function = "validate_code_chars")
    )]
    pub code: Option<String>,
    /// `expireTime` part; 0 never expires.
    #[validate(range(min = 0, message = "expireTime must not be negative"))]
    pub expire_time: i64,
    /// `expireUnit` part: 1 minutes, 2 hours, 3 days.
    pub expire_unit: i64,
}

fn validate_has_content(req: &UploadRequest) -> Result<(), ValidationError> {
    if req.file.is_none() && req.text.is_none() {
        return Err(ValidationError::new("content_required")
            .with_message(Cow::Borrowed("A file or text is required")));
    }
    Ok(())
}

/// Codes travel as a single path segment, so only letters, digits, `-`
/// and `_` are accepted.
fn validate_code_chars(code: &str) -> Result<(), ValidationError> {
    if code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Ok(());
    }
    Err(ValidationError::new("code_charset")
        .with_message(Cow::Borrowed("Code may only contain letters, digits, '-' and '_'")))
}

impl UploadRequest {
    /// Validates the request and converts it into a service call.
    pub fn into_upload(self) -> Result<UploadShare, AppError> {
        self.validate().map_err(validation_error)?;
        Ok(UploadShare {
            file: self.file,
            text: self.text,
            expire_quantity: self.expire_time,
            expire_unit: self.expire_unit,
            custom_code: self.code,
        })
    }
}

/// Flattens validator output into one validation error.
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{field} is invalid"),
            })
        })
        .collect();
    messages.sort();
    AppError::validation(messages.join("; "))
}

/// Parses an integer form field. An empty value means 0.
pub fn parse_int_field(name: &str, value: &str) -> Result<i64, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse()
        .map_err(|_| AppError::validation(format!("{name} must be an integer")))
}
