//! Share upload, resolve, detail, and download handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::extract::multipart::Field;
use axum::http::{StatusCode, header};
use axum::response::Response;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Deserialize;
use tracing::info;

use codeshare_core::error::AppError;
use codeshare_storage::IncomingFile;

use crate::dto::request::{UploadRequest, parse_int_field};
use crate::dto::response::{ApiResponse, DetailResponse, UploadResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// Query string of the download route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DownloadQuery {
    /// Access key from the resolved link.
    #[serde(default)]
    pub key: Option<String>,
    /// Access code.
    #[serde(default)]
    pub code: Option<String>,
}

/// POST /api/upload
///
/// The `file` part is spooled to disk as it arrives; the upload is refused
/// as soon as it passes the size ceiling.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<UploadResponse>>, ApiError> {
    let storage = &state.config.storage;
    let mut req = UploadRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Malformed upload form: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = match field.file_name() {
                    Some(file_name) if !file_name.is_empty() => file_name.to_string(),
                    // An empty file input.
                    _ => continue,
                };
                let incoming = IncomingFile::spool(
                    field,
                    file_name,
                    &storage.spool_path(),
                    storage.max_upload_size_bytes,
                )
                .await?;
                req.file = Some(incoming);
            }
            "text" => req.text = non_empty(read_text(field).await?),
            "code" => req.code = non_empty(read_text(field).await?),
            "expireTime" => req.expire_time = parse_int_field("expireTime", &read_text(field).await?)?,
            "expireUnit" => req.expire_unit = parse_int_field("expireUnit", &read_text(field).await?)?,
            _ => {}
        }
    }

    let result = state.share_service.upload(req.into_upload()?).await?;

    Ok(Json(ApiResponse::with_msg(
        "Upload successful",
        UploadResponse::from(result),
    )))
}

/// GET /api/share/{code}
///
/// Returns the download link for a file share, `null` for a text share.
pub async fn get_share(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<Option<String>>>, ApiError> {
    let reference = state.share_service.resolve(&code).await?;

    let link = reference.has_file.then(|| {
        let share = &state.config.share;
        format!(
            "{}{}?key={}&code={}",
            share.public_base_url.trim_end_matches('/'),
            share.download_path,
            utf8_percent_encode(&reference.key, NON_ALPHANUMERIC),
            utf8_percent_encode(&reference.code, NON_ALPHANUMERIC),
        )
    });

    Ok(Json(ApiResponse::ok(link)))
}

/// GET /api/share/detail/{code}
pub async fn get_detail(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<DetailResponse>>, ApiError> {
    let detail = state.share_service.detail(&code).await?;
    Ok(Json(ApiResponse::ok(DetailResponse::from(detail))))
}

/// GET /share/download?key=..&code=..
///
/// Streams the file without buffering it.
pub async fn download(
    State(state): State<AppState>,
    Query(query): Query<DownloadQuery>,
) -> Result<Response, ApiError> {
    let (Some(key), Some(code)) = (non_empty_opt(query.key), non_empty_opt(query.code)) else {
        return Err(AppError::validation("key and code are required").into());
    };

    let download = state.share_service.download(&key, &code).await?;
    info!(code = %code, file_name = %download.file_name, "Download started");

    let content_type = mime_guess::from_path(&download.file_name)
        .first_or_octet_stream()
        .to_string();

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&download.file_name),
        )
        .body(Body::from_stream(download.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    let name = field.name().unwrap_or_default().to_string();
    field
        .text()
        .await
        .map_err(|e| AppError::validation(format!("Failed to read field {name}: {e}")))
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn non_empty_opt(value: Option<String>) -> Option<String> {
    value.and_then(non_empty)
}

/// `attachment` disposition with an ASCII fallback name and the exact
/// UTF-8 name in `filename*`.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        utf8_percent_encode(file_name, NON_ALPHANUMERIC)
    )
}
