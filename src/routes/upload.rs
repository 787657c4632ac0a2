use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::FormRejection,
        Multipart, Query, State,
    },
    http::{header::CONTENT_LENGTH, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use futures::TryStreamExt;

use super::{listing_url, redirect_back};
use crate::error::{AppError, AppResult};
use crate::fs::{make_directory, FsError};
use crate::state::AppState;
use crate::types::{MkdirForm, TargetQuery};

/// Allowance for multipart framing on top of `upload.max_bytes`.
pub const MULTIPART_OVERHEAD: u64 = 64 * 1024;

/// Name of the multipart field carrying the file.
const FILE_FIELD: &str = "file";

/// `POST /upload?path=<dir>`: stores the multipart field `file` in `<dir>`.
pub async fn upload(
    State(state): State<AppState>,
    Query(target): Query<TargetQuery>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let result = store_upload(&state, &target.path, &headers, multipart).await;
    if result.is_err() {
        state.metrics.inc_uploads_rejected();
    }
    result
}

async fn store_upload(
    state: &AppState,
    target: &str,
    headers: &HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let limit = state.uploads.max_bytes();
    let announced = headers.get(CONTENT_LENGTH).and_then(|v| v.to_str().ok()).and_then(|v| v.parse::<u64>().ok());
    if announced.map(|len| len > limit.saturating_add(MULTIPART_OVERHEAD)).unwrap_or(false) {
        return Err(AppError::PayloadTooLarge { limit });
    }

    let mut multipart = multipart.map_err(|e| AppError::BadRequest(format!("invalid upload form: {}", e)))?;
    while let Some(field) = multipart.next_field().await.map_err(|e| AppError::from(field_error(e, limit)))? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("file field has no filename".to_string()))?;

        let content = field.map_err(move |e| field_error(e, limit));
        let stored = state.uploads.store(target, &filename, content).await?;
        state.metrics.record_upload(stored.bytes);

        let dir = stored.path.parent().map(|p| state.resolver.to_logical(p)).unwrap_or_else(|| "/".to_string());
        return Ok(Redirect::to(&listing_url(&dir)).into_response());
    }
    Err(AppError::BadRequest(format!("missing multipart field '{}'", FILE_FIELD)))
}

fn field_error(err: MultipartError, limit: u64) -> FsError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        FsError::PayloadTooLarge { limit }
    } else {
        FsError::Stream(err.body_text())
    }
}

/// `POST /mkdir?path=<dir>` with form field `dirname`, taken verbatim.
pub async fn mkdir(
    State(state): State<AppState>,
    Query(target): Query<TargetQuery>,
    headers: HeaderMap,
    form: Result<Form<MkdirForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = form.map_err(|e| AppError::BadRequest(format!("invalid form: {}", e)))?;
    let created = make_directory(&state.resolver, &target.path, &form.dirname).await?;
    state.metrics.inc_directories_created();

    let parent = created.parent().map(|p| state.resolver.to_logical(p)).unwrap_or_else(|| "/".to_string());
    Ok(redirect_back(&headers, &listing_url(&parent)).into_response())
}
