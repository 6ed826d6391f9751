// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQL statement builder for the relational backend.
//!
//! Compiles schemas, conditions, and options into literal statement text.
//! Values are formatted by declared column type: strings and JSON are
//! single-quoted with `''` escaping, booleans render as 0/1, numbers are
//! never quoted. Column-name validity is the adapter's responsibility;
//! the builder only formats values.

use std::sync::Arc;

use serde_json::Value;

use harbor_core::{Conditions, DbError, Entity, Operator, QueryOptions, SortDirection, TableSchema};

/// Compiler from schema + conditions + options to SQL text.
#[derive(Debug, Clone)]
pub struct SqlBuilder {
    schema: Arc<TableSchema>,
}

impl SqlBuilder {
    pub fn new(schema: Arc<TableSchema>) -> Self {
        Self { schema }
    }

    fn table(&self) -> &str {
        self.schema.entity()
    }

    /// The idempotent table definition derived from the schema.
    ///
    /// Number and boolean columns take INTEGER affinity, string and JSON
    /// columns take TEXT; PRIMARY KEY and NOT NULL carry over.
    pub fn create_table(&self) -> String {
        let columns: Vec<String> = self
            .schema
            .columns()
            .map(|(name, column)| {
                let mut parts = vec![name.to_string(), affinity(column.ty).to_string()];
                if column.primary_key {
                    parts.push("PRIMARY KEY".to_string());
                }
                if !column.nullable {
                    parts.push("NOT NULL".to_string());
                }
                parts.join(" ")
            })
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.table(),
            columns.join(", ")
        )
    }

    /// SELECT honoring selector, conditions, order-by, and limit.
    pub fn select(&self, options: &QueryOptions) -> Result<String, DbError> {
        let columns = match &options.selector {
            Some(selector) if !selector.is_empty() => selector.join(", "),
            _ => "*".to_string(),
        };
        let mut sql = format!("SELECT {columns} FROM {}", self.table());
        if let Some(clause) = self.where_clause(options.conditions.as_ref())? {
            sql.push_str(&format!(" WHERE {clause}"));
        }
        if !options.order_by.is_empty() {
            let order: Vec<String> = options
                .order_by
                .iter()
                .map(|o| {
                    let direction = match o.direction {
                        SortDirection::Asc => "ASC",
                        SortDirection::Desc => "DESC",
                    };
                    format!("{} {direction}", o.column)
                })
                .collect();
            sql.push_str(&format!(" ORDER BY {}", order.join(", ")));
        }
        if let Some(limit) = options.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        Ok(sql)
    }

    /// Multi-row INSERT over every declared column, in declaration order.
    ///
    /// Rows are expected to be normalized by the adapter: identity assigned,
    /// absent nullable columns present as `Null`.
    pub fn insert(&self, rows: &[Entity]) -> Result<String, DbError> {
        let columns: Vec<&str> = self.schema.columns().map(|(name, _)| name).collect();
        let mut tuples = Vec::with_capacity(rows.len());
        for row in rows {
            let mut values = Vec::with_capacity(columns.len());
            for &column in &columns {
                let value = row.get(column).unwrap_or(&Value::Null);
                values.push(self.format_value(column, value)?);
            }
            tuples.push(format!("({})", values.join(", ")));
        }
        Ok(format!(
            "INSERT INTO {} ({}) VALUES {}",
            self.table(),
            columns.join(", "),
            tuples.join(", ")
        ))
    }

    /// UPDATE applying the replacement values to matching rows.
    pub fn update(
        &self,
        updater: &Entity,
        conditions: Option<&Conditions>,
    ) -> Result<String, DbError> {
        let mut assignments = Vec::with_capacity(updater.len());
        for (column, value) in updater {
            assignments.push(format!("{column} = {}", self.format_value(column, value)?));
        }
        let mut sql = format!("UPDATE {} SET {}", self.table(), assignments.join(", "));
        if let Some(clause) = self.where_clause(conditions)? {
            sql.push_str(&format!(" WHERE {clause}"));
        }
        Ok(sql)
    }

    /// DELETE for matching rows.
    pub fn delete(&self, conditions: Option<&Conditions>) -> Result<String, DbError> {
        let mut sql = format!("DELETE FROM {}", self.table());
        if let Some(clause) = self.where_clause(conditions)? {
            sql.push_str(&format!(" WHERE {clause}"));
        }
        Ok(sql)
    }

    /// Render conditions as an ANDed WHERE body; `None` when empty.
    fn where_clause(&self, conditions: Option<&Conditions>) -> Result<Option<String>, DbError> {
        let Some(conditions) = conditions else {
            return Ok(None);
        };
        if conditions.is_empty() {
            return Ok(None);
        }
        let mut tokens = Vec::new();
        for (column, list) in conditions.iter() {
            for condition in list {
                tokens.push(format!(
                    "{column} {} {}",
                    operator_token(condition.op),
                    self.format_value(column, &condition.value)?
                ));
            }
        }
        Ok(Some(tokens.join(" AND ")))
    }

    /// Format one value as a SQL literal according to the column's declared
    /// type. A value whose JSON kind contradicts the declaration is a
    /// validation defect.
    fn format_value(&self, column: &str, value: &Value) -> Result<String, DbError> {
        let descriptor = self.schema.column(column).ok_or_else(|| {
            DbError::Validation(format!(
                "unknown column `{column}` for entity `{}`",
                self.table()
            ))
        })?;
        if value.is_null() {
            return Ok("NULL".to_string());
        }
        use harbor_core::ColumnType::*;
        match (descriptor.ty, value) {
            (Boolean, Value::Bool(b)) => Ok(if *b { "1" } else { "0" }.to_string()),
            (Number, Value::Number(n)) => Ok(n.to_string()),
            (String, Value::String(s)) => Ok(quote(s)),
            (Json, v) => {
                let text = serde_json::to_string(v)
                    .map_err(|e| DbError::Validation(format!("unserializable JSON value: {e}")))?;
                Ok(quote(&text))
            }
            _ => Err(DbError::Validation(format!(
                "column `{column}` of entity `{}` rejects value `{value}`",
                self.table()
            ))),
        }
    }
}

fn affinity(ty: harbor_core::ColumnType) -> &'static str {
    use harbor_core::ColumnType::*;
    match ty {
        Number | Boolean => "INTEGER",
        String | Json => "TEXT",
    }
}

fn operator_token(op: Operator) -> &'static str {
    match op {
        Operator::Eq => "=",
        Operator::Neq => "!=",
        Operator::Lt => "<",
        Operator::Gt => ">",
        Operator::Gte => ">=",
        Operator::Lte => "<=",
    }
}

/// Single-quote a string literal, escaping embedded quotes by doubling.
fn quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_core::entity::entity_from_pairs;
    use harbor_core::{Column, OrderBy};
    use serde_json::json;

    fn builder() -> SqlBuilder {
        SqlBuilder::new(Arc::new(TableSchema::new(
            "user_info",
            [
                ("id", Column::string().primary_key()),
                ("username", Column::string()),
                ("age", Column::number()),
                ("active", Column::boolean()),
                ("profile", Column::json().nullable()),
            ],
        )))
    }

    #[test]
    fn create_table_carries_constraints_and_affinity() {
        assert_eq!(
            builder().create_table(),
            "CREATE TABLE IF NOT EXISTS user_info (\
             id TEXT PRIMARY KEY NOT NULL, \
             username TEXT NOT NULL, \
             age INTEGER NOT NULL, \
             active INTEGER NOT NULL, \
             profile TEXT)"
        );
    }

    #[test]
    fn select_composes_conditions_order_and_limit() {
        let options = QueryOptions::new()
            .conditions(
                Conditions::new()
                    .eq("username", json!("alice"))
                    .and("age", Operator::Gte, json!(18)),
            )
            .select(["id", "username"])
            .order_by(OrderBy::desc("age"))
            .limit(5);
        assert_eq!(
            builder().select(&options).unwrap(),
            "SELECT id, username FROM user_info \
             WHERE username = 'alice' AND age >= 18 \
             ORDER BY age DESC LIMIT 5"
        );
    }

    #[test]
    fn select_without_options_reads_everything() {
        assert_eq!(
            builder().select(&QueryOptions::new()).unwrap(),
            "SELECT * FROM user_info"
        );
    }

    #[test]
    fn string_values_escape_embedded_quotes() {
        let options = QueryOptions::new()
            .conditions(Conditions::new().eq("username", json!("o'brien")));
        assert_eq!(
            builder().select(&options).unwrap(),
            "SELECT * FROM user_info WHERE username = 'o''brien'"
        );
    }

    #[test]
    fn booleans_render_as_integers() {
        let sql = builder()
            .update(
                &entity_from_pairs([("active", json!(true))]),
                Some(&Conditions::new().eq("active", json!(false))),
            )
            .unwrap();
        assert_eq!(sql, "UPDATE user_info SET active = 1 WHERE active = 0");
    }

    #[test]
    fn json_values_are_stringified_then_quoted() {
        let rows = vec![entity_from_pairs([
            ("id", json!("u-1")),
            ("username", json!("alice")),
            ("age", json!(30)),
            ("active", json!(true)),
            ("profile", json!({"bio": "it's me"})),
        ])];
        assert_eq!(
            builder().insert(&rows).unwrap(),
            "INSERT INTO user_info (id, username, age, active, profile) \
             VALUES ('u-1', 'alice', 30, 1, '{\"bio\":\"it''s me\"}')"
        );
    }

    #[test]
    fn absent_values_insert_as_null() {
        let rows = vec![entity_from_pairs([
            ("id", json!("u-2")),
            ("username", json!("bob")),
            ("age", json!(40)),
            ("active", json!(false)),
        ])];
        let sql = builder().insert(&rows).unwrap();
        assert!(sql.ends_with("('u-2', 'bob', 40, 0, NULL)"), "{sql}");
    }

    #[test]
    fn type_mismatch_is_a_validation_error() {
        let options =
            QueryOptions::new().conditions(Conditions::new().eq("age", json!("not-a-number")));
        let err = builder().select(&options).unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[test]
    fn delete_without_conditions_targets_all_rows() {
        assert_eq!(
            builder().delete(None).unwrap(),
            "DELETE FROM user_info"
        );
    }
}
