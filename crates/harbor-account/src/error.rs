// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for the account layer.

use thiserror::Error;

use harbor_core::DbError;

/// Errors surfaced by [`AccountManager`](crate::AccountManager).
///
/// `InvalidCredentials` is deliberately uniform: an unknown username and a
/// wrong password are indistinguishable to the caller.
#[derive(Debug, Error)]
pub enum AccountError {
    /// Registration parameters violate the account rules.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The requested username already exists.
    #[error("username is already taken")]
    UsernameTaken,

    /// Unknown username or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The persistence layer failed.
    #[error("storage error: {0}")]
    Storage(#[from] DbError),

    /// Password hashing or verification machinery failed.
    #[error("hashing error: {0}")]
    Hash(String),
}
