// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamic entity representation.
//!
//! Rows cross the adapter boundary as ordered JSON maps so that callers can
//! work with any declared schema without per-entity codegen. Entity-specific
//! layers (e.g. `harbor-account`) convert these maps into typed structs.

use serde_json::{Map, Value};

/// One row of a logical entity: column name -> value.
///
/// Values use the column's logical type: booleans are `Value::Bool`
/// regardless of how a backend stores them, numbers are `Value::Number`,
/// and JSON columns hold whatever the backend returned (native documents
/// from the document store, stored text from the relational store).
pub type Entity = Map<String, Value>;

/// Build an entity from `(column, value)` pairs.
///
/// Convenience for call sites and tests; preserves insertion order.
pub fn entity_from_pairs<I, K>(pairs: I) -> Entity
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
