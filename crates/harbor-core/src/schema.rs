// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity schema descriptors.
//!
//! A [`TableSchema`] is an ordered mapping of column name to [`Column`]
//! descriptor, declared once per logical entity at process start and
//! immutable afterwards. Backends translate it into their native form
//! (CREATE TABLE statements, collection validators).

use serde_json::Value;

use crate::error::DbError;

/// Primitive type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Number,
    Boolean,
    /// Arbitrary structured data. Stored as text by the relational backend
    /// and as native documents by the document backend.
    Json,
}

/// Declaration of a single column: primitive type, nullability, primary key.
///
/// A `Column` is a plain immutable value. The combinators return a new
/// value rather than mutating in place, so declarations read as
/// `Column::string().primary_key()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub ty: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
}

impl Column {
    const fn new(ty: ColumnType) -> Self {
        Self {
            ty,
            nullable: false,
            primary_key: false,
        }
    }

    pub const fn string() -> Self {
        Self::new(ColumnType::String)
    }

    pub const fn number() -> Self {
        Self::new(ColumnType::Number)
    }

    pub const fn boolean() -> Self {
        Self::new(ColumnType::Boolean)
    }

    pub const fn json() -> Self {
        Self::new(ColumnType::Json)
    }

    /// Returns a copy of this column marked nullable.
    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    /// Returns a copy of this column marked as the primary key.
    pub const fn primary_key(self) -> Self {
        Self {
            primary_key: true,
            ..self
        }
    }

    /// Whether a JSON value is acceptable for this column's declared type.
    ///
    /// `Null` is acceptable only for nullable columns. JSON columns accept
    /// any value shape.
    pub fn accepts(&self, value: &Value) -> bool {
        match value {
            Value::Null => self.nullable,
            _ => match self.ty {
                ColumnType::String => value.is_string(),
                ColumnType::Number => value.is_number(),
                ColumnType::Boolean => value.is_boolean(),
                ColumnType::Json => true,
            },
        }
    }
}

/// Ordered schema of one logical entity.
#[derive(Debug, Clone)]
pub struct TableSchema {
    entity: String,
    columns: Vec<(String, Column)>,
}

impl TableSchema {
    /// Declare a schema for the named entity from `(column, descriptor)`
    /// pairs. Declaration order is preserved and significant: backends emit
    /// columns in this order.
    pub fn new<I, K>(entity: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = (K, Column)>,
        K: Into<String>,
    {
        Self {
            entity: entity.into(),
            columns: columns.into_iter().map(|(k, c)| (k.into(), c)).collect(),
        }
    }

    /// Name of the logical entity (equals the table/collection name).
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Iterate columns in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(k, c)| (k.as_str(), c))
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, c)| c)
    }

    /// The primary-key column, if declared.
    pub fn primary_key(&self) -> Option<(&str, &Column)> {
        self.columns
            .iter()
            .find(|(_, c)| c.primary_key)
            .map(|(k, c)| (k.as_str(), c))
    }

    /// Verify that every referenced column name exists in this schema.
    pub fn check_columns<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), DbError> {
        for name in names {
            if self.column(name).is_none() {
                return Err(DbError::Validation(format!(
                    "unknown column `{name}` for entity `{}`",
                    self.entity
                )));
            }
        }
        Ok(())
    }

    /// Validate one row for insertion.
    ///
    /// Rejects unknown columns, missing non-nullable columns, and values
    /// whose JSON kind contradicts the declared type. The primary key may
    /// be absent: the backend assigns identity.
    pub fn check_insert(&self, row: &crate::entity::Entity) -> Result<(), DbError> {
        self.check_columns(row.keys().map(String::as_str))?;
        for (name, column) in self.columns() {
            match row.get(name) {
                Some(value) => {
                    if !column.accepts(value) {
                        return Err(DbError::Validation(format!(
                            "column `{name}` of entity `{}` rejects value `{value}`",
                            self.entity
                        )));
                    }
                }
                None => {
                    if !column.nullable && !column.primary_key {
                        return Err(DbError::Validation(format!(
                            "missing non-nullable column `{name}` for entity `{}`",
                            self.entity
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Validate replacement values for an update.
    ///
    /// Rejects unknown columns, attempts to overwrite the primary key
    /// (immutable after creation), and type mismatches.
    pub fn check_update(&self, updater: &crate::entity::Entity) -> Result<(), DbError> {
        self.check_columns(updater.keys().map(String::as_str))?;
        for (name, value) in updater {
            let column = self
                .column(name)
                .ok_or_else(|| DbError::Validation(format!("unknown column `{name}`")))?;
            if column.primary_key {
                return Err(DbError::Validation(format!(
                    "primary-key column `{name}` of entity `{}` is immutable",
                    self.entity
                )));
            }
            if !column.accepts(value) {
                return Err(DbError::Validation(format!(
                    "column `{name}` of entity `{}` rejects value `{value}`",
                    self.entity
                )));
            }
        }
        Ok(())
    }
}
