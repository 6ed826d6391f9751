// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for the Harbor persistence layer.
//!
//! This crate defines the backend-agnostic pieces shared by every storage
//! backend: column/schema descriptors, the query condition language, the
//! dynamic entity representation, the [`TableAdapter`] contract, and the
//! [`DbError`] taxonomy. Backend implementations live in `harbor-db`.

pub mod adapter;
pub mod entity;
pub mod error;
pub mod query;
pub mod schema;

// Re-export key items at crate root for ergonomic imports.
pub use adapter::{DeleteRequest, InsertRequest, TableAdapter, UpdateRequest};
pub use entity::Entity;
pub use error::DbError;
pub use query::{Conditions, Operator, OrderBy, QueryOptions, SortDirection};
pub use schema::{Column, ColumnType, TableSchema};
