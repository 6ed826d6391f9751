// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pluggable persistence layer for Harbor.
//!
//! Implements the `harbor-core` [`TableAdapter`](harbor_core::TableAdapter)
//! contract against two structurally different backends: embedded relational
//! files (rusqlite via tokio-rusqlite, one file per logical entity) and a
//! networked document store (MongoDB, one shared refcounted connection).
//! Every adapter serializes its operations through a private FIFO queue, so
//! at most one backend-touching operation per table is ever in flight.
//!
//! The [`Database`] facade owns one lazily-built adapter per logical entity
//! and selects the backend from [`harbor_config::StorageConfig`].

pub mod entities;
pub mod facade;
pub mod mongo;
pub mod queue;
pub mod sqlite;

pub use facade::Database;
pub use mongo::MongoTableAdapter;
pub use mongo::connection::{Connect, ConnectionManager, MongoConnectionManager, MongoConnector};
pub use sqlite::SqliteTableAdapter;
