// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router assembly and the HTTP server loop.

use std::sync::Arc;

use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use harbor_account::AccountManager;
use harbor_config::GatewayConfig;

use crate::auth::{attach_auth, require_auth, TokenSigner};
use crate::error::GatewayError;
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub accounts: Arc<AccountManager>,
    pub signer: Arc<TokenSigner>,
    /// When set, only this authenticated user may register accounts.
    pub admin_username: Option<String>,
}

/// Assemble the account routes.
///
/// Login is open; current requires a session; register carries the session
/// when present and the handler enforces the admin policy.
pub fn router(state: GatewayState) -> Router {
    let open = Router::new().route("/v1/account/login", post(handlers::login));
    let register = Router::new()
        .route("/v1/account/register", post(handlers::register))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            attach_auth,
        ));
    let protected = Router::new()
        .route("/v1/account/current", get(handlers::current))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(open)
        .merge(register)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the shutdown future resolves.
pub async fn serve(
    config: &GatewayConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), GatewayError> {
    let app = router(state);
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("gateway listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use harbor_config::{StorageBackend, StorageConfig};
    use harbor_db::Database;
    use serde_json::{json, Value};
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn state(dir: &std::path::Path, admin_username: Option<&str>) -> GatewayState {
        let db = Arc::new(Database::new(StorageConfig {
            backend: StorageBackend::Sqlite,
            data_dir: dir.to_string_lossy().into_owned(),
            ..StorageConfig::default()
        }));
        GatewayState {
            accounts: Arc::new(AccountManager::new(db, "test-server-secret")),
            signer: Arc::new(TokenSigner::new("test-signing-secret", 3600)),
            admin_username: admin_username.map(str::to_string),
        }
    }

    fn post_json(uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn get_with_token(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn alice() -> Value {
        json!({
            "name": "Alice",
            "email": "alice@example.com",
            "username": "alice",
            "password": "hunter22",
        })
    }

    #[tokio::test]
    async fn register_login_current_flow() {
        let dir = tempdir().unwrap();
        let app = router(state(dir.path(), None));

        let created = app
            .clone()
            .oneshot(post_json("/v1/account/register", alice(), None))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let created = body_json(created).await;
        assert_eq!(created["username"], json!("alice"));
        assert!(created.get("password").is_none());

        let login = app
            .clone()
            .oneshot(post_json(
                "/v1/account/login",
                json!({"username": "alice", "password": "hunter22"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(login.status(), StatusCode::OK);
        let login = body_json(login).await;
        let token = login["token"].as_str().unwrap();
        assert_eq!(login["client_key"].as_str().unwrap().len(), 64);
        assert!(login["user"].get("password").is_none());

        let current = app
            .oneshot(get_with_token("/v1/account/current", Some(token)))
            .await
            .unwrap();
        assert_eq!(current.status(), StatusCode::OK);
        let current = body_json(current).await;
        assert_eq!(current["id"], login["user"]["id"]);
    }

    #[tokio::test]
    async fn current_requires_a_valid_session() {
        let dir = tempdir().unwrap();
        let app = router(state(dir.path(), None));

        let anonymous = app
            .clone()
            .oneshot(get_with_token("/v1/account/current", None))
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let garbage = app
            .oneshot(get_with_token("/v1/account/current", Some("not-a-token")))
            .await
            .unwrap();
        assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let dir = tempdir().unwrap();
        let app = router(state(dir.path(), None));

        let first = app
            .clone()
            .oneshot(post_json("/v1/account/register", alice(), None))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = app
            .oneshot(post_json("/v1/account/register", alice(), None))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn invalid_params_are_bad_requests() {
        let dir = tempdir().unwrap();
        let app = router(state(dir.path(), None));
        let mut bad = alice();
        bad["password"] = json!("short");
        let response = app
            .oneshot(post_json("/v1/account/register", bad, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("password"));
    }

    #[tokio::test]
    async fn wrong_credentials_are_unauthorized() {
        let dir = tempdir().unwrap();
        let app = router(state(dir.path(), None));
        app.clone()
            .oneshot(post_json("/v1/account/register", alice(), None))
            .await
            .unwrap();

        let response = app
            .oneshot(post_json(
                "/v1/account/login",
                json!({"username": "alice", "password": "wrong"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_gating_controls_registration() {
        let dir = tempdir().unwrap();
        let state = state(dir.path(), Some("root"));

        // Seed the admin and one regular account directly.
        for (name, username) in [("Root", "root"), ("Alice", "alice")] {
            state
                .accounts
                .create_account(harbor_account::CreateAccountParams {
                    name: name.into(),
                    email: None,
                    username: username.into(),
                    password: "hunter22".into(),
                })
                .await
                .unwrap();
        }
        let admin_token = issue_for(&state, "root").await;
        let user_token = issue_for(&state, "alice").await;
        let app = router(state);

        let body = json!({
            "name": "Bob", "username": "bob", "password": "hunter22",
        });

        let anonymous = app
            .clone()
            .oneshot(post_json("/v1/account/register", body.clone(), None))
            .await
            .unwrap();
        assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

        let non_admin = app
            .clone()
            .oneshot(post_json(
                "/v1/account/register",
                body.clone(),
                Some(&user_token),
            ))
            .await
            .unwrap();
        assert_eq!(non_admin.status(), StatusCode::FORBIDDEN);

        let admin = app
            .oneshot(post_json("/v1/account/register", body, Some(&admin_token)))
            .await
            .unwrap();
        assert_eq!(admin.status(), StatusCode::CREATED);
    }

    async fn issue_for(state: &GatewayState, username: &str) -> String {
        let user = state.accounts.authenticate(username, "hunter22").await.unwrap();
        state.signer.issue(&user.id).unwrap()
    }
}
