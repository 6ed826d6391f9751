// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error taxonomy for the persistence layer.

use thiserror::Error;

/// Errors surfaced by table adapters and the database facade.
///
/// Errors resolve only the caller of the failing operation; they never abort
/// sibling queued operations on the same adapter or operations on other
/// adapters. The type is `Clone` so a failed shared-connection attempt can
/// propagate to every adapter awaiting it.
#[derive(Debug, Clone, Error)]
pub enum DbError {
    /// The backend is unreachable or a handle could not be created.
    #[error("connection error: {0}")]
    Connection(String),

    /// A row or value violates the declared schema, or an unsupported
    /// column type reached value formatting.
    #[error("validation error: {0}")]
    Validation(String),

    /// The backend rejected a compiled operation.
    #[error("query execution error: {0}")]
    QueryExecution(String),
}

impl DbError {
    /// Wrap an arbitrary driver error as a [`DbError::Connection`].
    pub fn connection(err: impl std::fmt::Display) -> Self {
        Self::Connection(err.to_string())
    }

    /// Wrap an arbitrary driver error as a [`DbError::QueryExecution`].
    pub fn query(err: impl std::fmt::Display) -> Self {
        Self::QueryExecution(err.to_string())
    }
}
