// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handler

use axum::{
    body::Bytes,
    extract::{FromRequest, Request, State},
    http::{header, HeaderMap},
    Json,
};
use axum_extra::extract::Multipart;
use tracing::{debug, info, warn};

use super::request::{upload_input, DetectInput, DetectRequest};
use super::response::DetectResponse;
use crate::api::errors::{ApiError, ApiErrorResponse};
use crate::api::http_server::AppState;

/// POST /detect - Check a label for BHT
///
/// # Request
/// - `multipart/form-data` with an `image` file field (png, jpg, jpeg, gif, webp)
/// - or a JSON body `{"text": "..."}`, or `{"image": "<base64>"}`
///
/// # Response
/// - `has_bht`, `matches` (text + character position), `confidence`
/// - `extracted_text` for images, `input_text` for text
/// - `status`: `degraded` with a `warning` when OCR could not run
///
/// # Errors
/// - 400 Bad Request: disallowed file type, or no text or image
/// - 500 Internal Server Error: the detection task failed
pub async fn detect_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<DetectResponse>, ApiErrorResponse> {
    let input = if is_multipart(request.headers()) {
        read_multipart(request, &state).await
    } else {
        read_json(request, &state).await
    }
    .map_err(|e| {
        warn!("Rejected detect request: {}", e);
        e
    })?;

    let pipeline = state.pipeline.clone();
    let result = tokio::task::spawn_blocking(move || match input {
        DetectInput::Text(text) => pipeline.text_mode(&text),
        DetectInput::Image(bytes) => pipeline.image_mode(&bytes),
    })
    .await
    .map_err(|e| ApiError::InternalError(e.to_string()))?;

    info!(
        "Detection ({:?}): has_bht={}, {} match(es), {:?}",
        result.method,
        result.has_match,
        result.matches.len(),
        result.status
    );

    Ok(Json(result.into()))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

async fn read_multipart(request: Request, state: &AppState) -> Result<DetectInput, ApiError> {
    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        debug!("Received upload {:?} ({} bytes)", file_name, bytes.len());

        return upload_input(file_name.as_deref(), bytes.to_vec(), state.max_upload_bytes);
    }

    Err(ApiError::EmptyInput)
}

async fn read_json(request: Request, state: &AppState) -> Result<DetectInput, ApiError> {
    let body = Bytes::from_request(request, state)
        .await
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;

    DetectRequest::from_json_bytes(&body)
        .ok_or(ApiError::EmptyInput)?
        .into_input(state.max_upload_bytes)
}
