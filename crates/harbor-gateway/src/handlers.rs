// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account route handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use harbor_account::{CreateAccountParams, UserRecord};

use crate::error::GatewayError;
use crate::server::GatewayState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub client_key: String,
    pub user: UserRecord,
}

/// `POST /v1/account/register`.
///
/// Open by default; when an admin username is configured, only that
/// authenticated user may register accounts.
pub async fn register(
    State(state): State<GatewayState>,
    caller: Option<Extension<UserRecord>>,
    Json(params): Json<CreateAccountParams>,
) -> Result<(StatusCode, Json<UserRecord>), GatewayError> {
    if let Some(admin) = &state.admin_username {
        match caller {
            None => return Err(GatewayError::Unauthorized),
            Some(Extension(user)) if user.username != *admin => {
                return Err(GatewayError::Forbidden);
            }
            Some(_) => {}
        }
    }
    let record = state.accounts.create_account(params).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `POST /v1/account/login`.
pub async fn login(
    State(state): State<GatewayState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, GatewayError> {
    let user = state
        .accounts
        .authenticate(&request.username, &request.password)
        .await?;
    let token = state.signer.issue(&user.id)?;
    let client_key = state.accounts.client_key(&user);
    info!(username = %user.username, "login succeeded");
    Ok(Json(LoginResponse {
        token,
        client_key,
        user,
    }))
}

/// `GET /v1/account/current`; the auth middleware resolved the caller.
pub async fn current(Extension(user): Extension<UserRecord>) -> Json<UserRecord> {
    Json(user)
}
