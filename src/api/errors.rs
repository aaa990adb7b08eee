// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Upload with a missing or disallowed file extension
    UnsupportedFormat(String),
    /// Neither text nor image supplied
    EmptyInput,
    InvalidRequest(String),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let error = match self {
            ApiError::UnsupportedFormat(_) => {
                "Invalid file. Use PNG, JPG, JPEG, GIF or WEBP.".to_string()
            }
            ApiError::EmptyInput => "No text or image provided.".to_string(),
            ApiError::InvalidRequest(msg) => msg.clone(),
            ApiError::InternalError(msg) => format!("Processing failed: {}", msg),
        };

        ErrorResponse {
            success: false,
            error,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::UnsupportedFormat(_) | ApiError::EmptyInput | ApiError::InvalidRequest(_) => {
                400
            }
            ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::UnsupportedFormat(name) => write!(f, "Unsupported file: {}", name),
            ApiError::EmptyInput => write!(f, "No text or image provided"),
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

/// Axum response wrapper for [`ApiError`]
#[derive(Debug)]
pub struct ApiErrorResponse(pub ApiError);

impl From<ApiError> for ApiErrorResponse {
    fn from(error: ApiError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let error_response = self.0.to_response();

        (status, Json(error_response)).into_response()
    }
}
