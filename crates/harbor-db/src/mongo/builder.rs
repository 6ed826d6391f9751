// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filter and option builder for the document backend.
//!
//! Conditions compile to native filter documents with `$eq`-family
//! operators; the primary-key column addresses `_id`. Values are checked
//! against the declared column type before they reach the wire.

use std::sync::Arc;

use mongodb::bson::{doc, Bson, Document};
use serde_json::Value;

use harbor_core::{
    Column, ColumnType, Conditions, DbError, Entity, Operator, OrderBy, SortDirection, TableSchema,
};

use crate::mongo::convert::{id_to_bson, json_to_bson, ID_FIELD};

/// Compiler from schema + conditions + options to BSON documents.
#[derive(Debug, Clone)]
pub struct MongoQueryBuilder {
    schema: Arc<TableSchema>,
}

impl MongoQueryBuilder {
    pub fn new(schema: Arc<TableSchema>) -> Self {
        Self { schema }
    }

    fn is_primary_key(&self, column: &str) -> bool {
        self.schema.primary_key().map(|(name, _)| name) == Some(column)
    }

    /// Native filter document; empty conditions produce the match-all `{}`.
    pub fn filter(&self, conditions: Option<&Conditions>) -> Result<Document, DbError> {
        let mut filter = Document::new();
        let Some(conditions) = conditions else {
            return Ok(filter);
        };
        for (column, list) in conditions.iter() {
            let descriptor = self.descriptor(column)?;
            let mut ops = Document::new();
            for condition in list {
                if !condition.value.is_null() && !descriptor.accepts(&condition.value) {
                    return Err(DbError::Validation(format!(
                        "column `{column}` of entity `{}` rejects value `{}`",
                        self.schema.entity(),
                        condition.value
                    )));
                }
                ops.insert(operator_token(condition.op), self.value(column, &condition.value));
            }
            filter.insert(self.field(column), ops);
        }
        Ok(filter)
    }

    /// Inclusion-style projection; `_id` is suppressed unless the
    /// primary-key column was selected.
    pub fn projection(&self, selector: Option<&[String]>) -> Option<Document> {
        let selector = selector?;
        if selector.is_empty() {
            return None;
        }
        let mut projection = doc! { ID_FIELD: 0 };
        for column in selector {
            if self.is_primary_key(column) {
                projection.insert(ID_FIELD, 1);
            } else {
                projection.insert(column.clone(), 1);
            }
        }
        Some(projection)
    }

    /// Sort document in entry order, 1 ascending and -1 descending.
    pub fn sort(&self, order_by: &[OrderBy]) -> Option<Document> {
        if order_by.is_empty() {
            return None;
        }
        let mut sort = Document::new();
        for entry in order_by {
            let direction = match entry.direction {
                SortDirection::Asc => 1,
                SortDirection::Desc => -1,
            };
            sort.insert(self.field(&entry.column), direction);
        }
        Some(sort)
    }

    /// `$set` document applying the replacement values.
    pub fn update_doc(&self, updater: &Entity) -> Result<Document, DbError> {
        let mut set = Document::new();
        for (column, value) in updater {
            self.descriptor(column)?;
            set.insert(self.field(column), self.value(column, value));
        }
        Ok(doc! { "$set": set })
    }

    /// `$jsonSchema` validator enforced on the collection at first open.
    pub fn collection_validator(&self) -> Document {
        let mut properties = Document::new();
        let mut required = vec![ID_FIELD.to_string()];
        for (name, column) in self.schema.columns() {
            let field = if column.primary_key {
                ID_FIELD.to_string()
            } else {
                name.to_string()
            };
            properties.insert(field.clone(), doc! { "bsonType": bson_types(column) });
            if !column.nullable && !column.primary_key {
                required.push(field);
            }
        }
        doc! {
            "$jsonSchema": {
                "bsonType": "object",
                "required": required,
                "properties": properties,
            }
        }
    }

    fn descriptor(&self, column: &str) -> Result<&Column, DbError> {
        self.schema.column(column).ok_or_else(|| {
            DbError::Validation(format!(
                "unknown column `{column}` for entity `{}`",
                self.schema.entity()
            ))
        })
    }

    fn field(&self, column: &str) -> String {
        if self.is_primary_key(column) {
            ID_FIELD.to_string()
        } else {
            column.to_string()
        }
    }

    fn value(&self, column: &str, value: &Value) -> Bson {
        if self.is_primary_key(column) {
            id_to_bson(value)
        } else {
            json_to_bson(value)
        }
    }
}

/// Clamp a row limit to the driver's signed argument instead of wrapping.
pub(crate) fn find_limit(limit: u64) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn operator_token(op: Operator) -> &'static str {
    match op {
        Operator::Eq => "$eq",
        Operator::Neq => "$ne",
        Operator::Lt => "$lt",
        Operator::Gt => "$gt",
        Operator::Gte => "$gte",
        Operator::Lte => "$lte",
    }
}

/// BSON type names a column admits, for the collection validator.
fn bson_types(column: &Column) -> Bson {
    let mut names: Vec<Bson> = match column.ty {
        ColumnType::String => vec!["string".into()],
        ColumnType::Number => vec!["int".into(), "long".into(), "double".into()],
        ColumnType::Boolean => vec!["bool".into()],
        ColumnType::Json => vec!["object".into(), "array".into()],
    };
    if column.primary_key {
        names.insert(0, "objectId".into());
    }
    if column.nullable {
        names.push("null".into());
    }
    Bson::Array(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_core::entity::entity_from_pairs;
    use mongodb::bson::oid::ObjectId;
    use serde_json::json;

    fn builder() -> MongoQueryBuilder {
        MongoQueryBuilder::new(Arc::new(TableSchema::new(
            "user_info",
            [
                ("id", Column::string().primary_key()),
                ("username", Column::string()),
                ("age", Column::number()),
                ("email", Column::string().nullable()),
            ],
        )))
    }

    #[test]
    fn conditions_compile_to_native_operators() {
        let filter = builder()
            .filter(Some(
                &Conditions::new()
                    .eq("username", json!("alice"))
                    .and("age", Operator::Gte, json!(18))
                    .and("age", Operator::Lt, json!(65)),
            ))
            .unwrap();
        assert_eq!(
            filter,
            doc! {
                "username": { "$eq": "alice" },
                "age": { "$gte": 18_i64, "$lt": 65_i64 },
            }
        );
    }

    #[test]
    fn inequality_uses_the_native_token() {
        let filter = builder()
            .filter(Some(&Conditions::new().and(
                "username",
                Operator::Neq,
                json!("alice"),
            )))
            .unwrap();
        assert_eq!(filter, doc! { "username": { "$ne": "alice" } });
    }

    #[test]
    fn primary_key_conditions_address_wire_id() {
        let oid = ObjectId::new();
        let filter = builder()
            .filter(Some(&Conditions::new().eq("id", json!(oid.to_hex()))))
            .unwrap();
        assert_eq!(filter, doc! { "_id": { "$eq": oid } });
    }

    #[test]
    fn empty_conditions_match_everything() {
        assert_eq!(builder().filter(None).unwrap(), Document::new());
        assert_eq!(
            builder().filter(Some(&Conditions::new())).unwrap(),
            Document::new()
        );
    }

    #[test]
    fn projection_is_inclusion_style_and_suppresses_wire_id() {
        let projection = builder()
            .projection(Some(&["username".to_string(), "age".to_string()]))
            .unwrap();
        assert_eq!(projection, doc! { "_id": 0, "username": 1, "age": 1 });

        let with_id = builder()
            .projection(Some(&["id".to_string(), "username".to_string()]))
            .unwrap();
        assert_eq!(with_id, doc! { "_id": 1, "username": 1 });
    }

    #[test]
    fn sort_maps_directions_to_signs() {
        let sort = builder()
            .sort(&[OrderBy::desc("age"), OrderBy::asc("username")])
            .unwrap();
        assert_eq!(sort, doc! { "age": -1, "username": 1 });
    }

    #[test]
    fn update_values_wrap_in_set() {
        let update = builder()
            .update_doc(&entity_from_pairs([("email", json!("a@b.c"))]))
            .unwrap();
        assert_eq!(update, doc! { "$set": { "email": "a@b.c" } });
    }

    #[test]
    fn oversized_limits_clamp_instead_of_wrapping() {
        assert_eq!(find_limit(5), 5);
        assert_eq!(find_limit(i64::MAX as u64), i64::MAX);
        assert_eq!(find_limit(u64::MAX), i64::MAX);
    }

    #[test]
    fn type_mismatch_is_a_validation_error() {
        let err = builder()
            .filter(Some(&Conditions::new().eq("age", json!("not-a-number"))))
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[test]
    fn validator_lists_required_fields_and_admissible_types() {
        let validator = builder().collection_validator();
        let schema = validator.get_document("$jsonSchema").unwrap();
        let required: Vec<&str> = schema
            .get_array("required")
            .unwrap()
            .iter()
            .map(|b| b.as_str().unwrap())
            .collect();
        assert_eq!(required, vec!["_id", "username", "age"]);
        let email = schema
            .get_document("properties")
            .unwrap()
            .get_document("email")
            .unwrap();
        assert_eq!(
            email.get_array("bsonType").unwrap().as_slice(),
            &[Bson::String("string".into()), Bson::String("null".into())]
        );
    }
}
