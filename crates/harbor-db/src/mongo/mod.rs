// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Networked document-store backend.
//!
//! All adapters in a process share one client through the refcounted
//! [`connection::ConnectionManager`]; an adapter's `close()` only physically
//! disconnects once it is the last holder. Conditions compile to native
//! filter documents, never to query text.

pub mod adapter;
pub mod builder;
pub mod connection;
pub mod convert;

pub use adapter::MongoTableAdapter;
pub use builder::MongoQueryBuilder;
pub use connection::{Connect, ConnectionManager, MongoConnectionManager, MongoConnector};
