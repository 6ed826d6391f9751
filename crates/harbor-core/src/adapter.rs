// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The backend-agnostic table-adapter contract.

use async_trait::async_trait;

use crate::entity::Entity;
use crate::error::DbError;
use crate::query::{Conditions, QueryOptions};

/// Rows to insert. The backend assigns identity for an absent primary key.
#[derive(Debug, Clone, Default)]
pub struct InsertRequest {
    pub data: Vec<Entity>,
}

impl InsertRequest {
    pub fn rows(data: Vec<Entity>) -> Self {
        Self { data }
    }

    pub fn row(entity: Entity) -> Self {
        Self { data: vec![entity] }
    }
}

/// Replacement values plus an optional row filter.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    pub updater: Entity,
    pub conditions: Option<Conditions>,
}

/// Row filter for deletion; `None` removes every row.
#[derive(Debug, Clone, Default)]
pub struct DeleteRequest {
    pub conditions: Option<Conditions>,
}

/// Schema-typed CRUD against one logical entity.
///
/// One adapter instance exists per logical entity for the process lifetime.
/// Every operation funnels through a strict FIFO queue internal to the
/// adapter: at most one backend-touching operation is in flight per table,
/// operations complete in submission order, and a failed operation resolves
/// only its own caller — the queue keeps draining.
///
/// `open()` and `close()` are idempotent. For the shared-connection
/// document backend, `close()` only physically disconnects once no other
/// adapter holds the connection.
#[async_trait]
pub trait TableAdapter: Send + Sync {
    /// Acquire the backend handle. Fails with [`DbError::Connection`] if the
    /// backend is unreachable or the handle cannot be created.
    async fn open(&self) -> Result<(), DbError>;

    /// Release the backend handle, draining queued operations first.
    async fn close(&self) -> Result<(), DbError>;

    /// Insert rows; returns the inserted entities with assigned identity.
    async fn insert(&self, request: InsertRequest) -> Result<Vec<Entity>, DbError>;

    /// Return matching rows honoring selector, order-by, and limit.
    /// No match yields an empty list, not an error.
    async fn get_all(&self, options: QueryOptions) -> Result<Vec<Entity>, DbError>;

    /// Apply replacement values to matching rows; returns the post-update
    /// matching rows.
    async fn update(&self, request: UpdateRequest) -> Result<Vec<Entity>, DbError>;

    /// Remove matching rows; returns the pre-deletion snapshot.
    async fn delete(&self, request: DeleteRequest) -> Result<Vec<Entity>, DbError>;
}
