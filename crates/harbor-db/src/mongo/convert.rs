// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON <-> BSON bridging.
//!
//! Entities cross the adapter boundary as JSON values; inside the backend
//! they live as BSON documents keyed by `_id`. The primary-key column maps
//! to `_id` in both directions, with object ids exposed as their 24-char
//! hex form.

use mongodb::bson::{oid::ObjectId, Bson, Document};
use serde_json::Value;

use harbor_core::{Entity, TableSchema};

/// Wire name of the document identity field.
pub const ID_FIELD: &str = "_id";

pub fn json_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Bson::Int64(i)
            } else {
                Bson::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(map) => Bson::Document(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_bson(v)))
                .collect(),
        ),
    }
}

pub fn bson_to_json(bson: &Bson) -> Value {
    match bson {
        Bson::Null => Value::Null,
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Int32(i) => Value::Number((*i as i64).into()),
        Bson::Int64(i) => Value::Number((*i).into()),
        Bson::Double(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Bson::String(s) => Value::String(s.clone()),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or(Value::Null),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(doc) => Value::Object(
            doc.iter()
                .map(|(k, v)| (k.to_string(), bson_to_json(v)))
                .collect(),
        ),
        _ => Value::Null,
    }
}

/// Map a primary-key value to its `_id` representation. A 24-char hex
/// string becomes a real object id; anything else is stored as-is.
pub fn id_to_bson(value: &Value) -> Bson {
    if let Value::String(s) = value {
        if let Ok(oid) = ObjectId::parse_str(s) {
            return Bson::ObjectId(oid);
        }
    }
    json_to_bson(value)
}

/// Turn one entity into the document to insert, renaming the primary key
/// to `_id`. An absent primary key stays absent: the backend assigns one.
pub fn entity_to_document(schema: &TableSchema, entity: &Entity) -> Document {
    let pk = schema.primary_key().map(|(name, _)| name);
    let mut doc = Document::new();
    for (key, value) in entity {
        if Some(key.as_str()) == pk {
            doc.insert(ID_FIELD, id_to_bson(value));
        } else {
            doc.insert(key.clone(), json_to_bson(value));
        }
    }
    doc
}

/// Turn one stored document back into an entity, renaming `_id` to the
/// primary-key column and keeping the schema's column order.
pub fn document_to_entity(schema: &TableSchema, doc: &Document) -> Entity {
    let pk = schema.primary_key().map(|(name, _)| name);
    let mut entity = Entity::new();
    for (name, _) in schema.columns() {
        let stored = if Some(name) == pk {
            doc.get(ID_FIELD)
        } else {
            doc.get(name)
        };
        if let Some(bson) = stored {
            entity.insert(name.to_string(), bson_to_json(bson));
        }
    }
    entity
}
