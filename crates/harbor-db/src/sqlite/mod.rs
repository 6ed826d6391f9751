// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded relational file backend.
//!
//! Each logical entity maps to one SQLite file under the configured data
//! directory; the table name equals the entity name. All operations compile
//! to literal SQL text via [`builder::SqlBuilder`] and execute on the
//! adapter's FIFO queue through tokio-rusqlite's background thread.

pub mod adapter;
pub mod builder;

pub use adapter::SqliteTableAdapter;
pub use builder::SqlBuilder;
