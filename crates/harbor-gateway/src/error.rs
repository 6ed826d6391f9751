// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use harbor_account::AccountError;

/// Errors a handler can surface; each maps to one status code.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Authenticated, but not allowed to perform the operation.
    #[error("forbidden")]
    Forbidden,

    /// The operation requires a session.
    #[error("authentication required")]
    Unauthorized,

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Bind or serve failure; never reaches a response body.
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Account(AccountError::InvalidParams(_)) => StatusCode::BAD_REQUEST,
            Self::Account(AccountError::UsernameTaken) => StatusCode::CONFLICT,
            Self::Account(AccountError::InvalidCredentials) => StatusCode::UNAUTHORIZED,
            Self::Account(AccountError::Storage(_)) | Self::Account(AccountError::Hash(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Token(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal detail stays in the logs, not in the response body.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "internal error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
