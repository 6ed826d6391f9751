// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway built on axum.
//!
//! Serves the account routes:
//! - `POST /v1/account/register` (admin-gated when configured)
//! - `POST /v1/account/login`
//! - `GET /v1/account/current` (bearer auth)
//!
//! Session tokens are signed JWTs; login additionally returns the per-user
//! client key.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use auth::TokenSigner;
pub use error::GatewayError;
pub use server::{router, serve, GatewayState};
