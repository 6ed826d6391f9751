// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query condition language.
//!
//! Conditions are per-column lists of `(operator, value)` pairs; every pair
//! across every column is ANDed. Backend-specific builders compile them
//! into SQL text or native filter documents.

use serde_json::Value;

/// Comparison operator applied to one column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Neq,
    Lt,
    Gt,
    Gte,
    Lte,
}

/// One `(operator, value)` pair constraining a column.
#[derive(Debug, Clone)]
pub struct Condition {
    pub op: Operator,
    pub value: Value,
}

/// Ordered mapping column -> conditions; all pairs ANDed.
#[derive(Debug, Clone, Default)]
pub struct Conditions(Vec<(String, Vec<Condition>)>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one condition, returning the extended set.
    pub fn and(mut self, column: impl Into<String>, op: Operator, value: Value) -> Self {
        let column = column.into();
        match self.0.iter_mut().find(|(c, _)| *c == column) {
            Some((_, list)) => list.push(Condition { op, value }),
            None => self.0.push((column, vec![Condition { op, value }])),
        }
        self
    }

    /// Shorthand for the common equality case.
    pub fn eq(self, column: impl Into<String>, value: Value) -> Self {
        self.and(column, Operator::Eq, value)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(column, conditions)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Condition])> {
        self.0.iter().map(|(c, list)| (c.as_str(), list.as_slice()))
    }

    /// Column names referenced by these conditions.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(c, _)| c.as_str())
    }
}

/// Sort direction for an order-by clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One order-by entry.
#[derive(Debug, Clone)]
pub struct OrderBy {
    pub column: String,
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Options for a read query: conditions, selected columns, ordering, limit.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Row filter; `None` matches everything.
    pub conditions: Option<Conditions>,
    /// Columns to return; `None` returns all declared columns.
    pub selector: Option<Vec<String>>,
    /// Order-by entries, applied in sequence.
    pub order_by: Vec<OrderBy>,
    /// Maximum number of rows to return.
    pub limit: Option<u64>,
}

impl QueryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = Some(conditions);
        self
    }

    pub fn select<I, K>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.selector = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Every column name referenced by these options.
    pub fn referenced_columns(&self) -> Vec<&str> {
        let mut names = Vec::new();
        if let Some(conditions) = &self.conditions {
            names.extend(conditions.columns());
        }
        if let Some(selector) = &self.selector {
            names.extend(selector.iter().map(String::as_str));
        }
        names.extend(self.order_by.iter().map(|o| o.column.as_str()));
        names
    }
}
