// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token authentication for the gateway.
//!
//! Tokens are HS256 JWTs whose subject is the user id. `require_auth`
//! rejects requests without a valid token; `attach_auth` only annotates the
//! request, leaving the policy to the handler (registration is open unless
//! an admin username is configured).

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use harbor_account::UserRecord;

use crate::server::GatewayState;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// User id.
    sub: String,
    /// Expiry as a unix timestamp.
    exp: i64,
}

/// Issues and verifies session tokens.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(ttl_secs as i64),
        }
    }

    /// Sign a token for the user, expiring after the configured lifetime.
    pub fn issue(&self, user_id: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify a token and return the user id it was issued for.
    pub fn verify(&self, token: &str) -> Option<String> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims.sub)
            .ok()
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn authenticated_user(state: &GatewayState, request: &Request) -> Option<UserRecord> {
    let token = bearer_token(request)?;
    let user_id = state.signer.verify(token)?;
    match state.accounts.find_by_id(&user_id).await {
        Ok(user) => user,
        Err(err) => {
            tracing::warn!(error = %err, "user lookup during auth failed");
            None
        }
    }
}

/// Middleware rejecting requests without a valid session; on success the
/// resolved [`UserRecord`] lands in the request extensions.
pub async fn require_auth(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    match authenticated_user(&state, &request).await {
        Some(user) => {
            request.extensions_mut().insert(user);
            Ok(next.run(request).await)
        }
        None => Err(StatusCode::UNAUTHORIZED),
    }
}

/// Middleware annotating the request with the caller when a valid session
/// is presented, without rejecting anonymous requests.
pub async fn attach_auth(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(user) = authenticated_user(&state, &request).await {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}
