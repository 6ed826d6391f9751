// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account records and registration parameters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use harbor_core::Entity;

use crate::error::AccountError;

/// One stored account. The password field holds the PHC hash, never
/// plaintext, and is excluded from serialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl UserRecord {
    /// Decode a stored entity into a record.
    pub fn from_entity(entity: Entity) -> Result<Self, AccountError> {
        serde_json::from_value(Value::Object(entity))
            .map_err(|e| AccountError::Storage(harbor_core::DbError::Validation(e.to_string())))
    }
}

/// Registration input, validated before it touches storage.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccountParams {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub username: String,
    pub password: String,
}

impl CreateAccountParams {
    pub fn validate(&self) -> Result<(), AccountError> {
        if self.name.trim().is_empty() {
            return Err(AccountError::InvalidParams("name must not be empty".into()));
        }
        if !(3..=128).contains(&self.username.chars().count()) {
            return Err(AccountError::InvalidParams(
                "username must be 3 to 128 characters".into(),
            ));
        }
        if !(6..=128).contains(&self.password.chars().count()) {
            return Err(AccountError::InvalidParams(
                "password must be 6 to 128 characters".into(),
            ));
        }
        Ok(())
    }

    /// The entity to insert: no id (the backend assigns identity), password
    /// already replaced with its hash by the caller.
    pub fn into_entity(self, password_hash: String) -> Entity {
        let mut entity = Map::new();
        entity.insert("name".into(), Value::String(self.name));
        entity.insert(
            "email".into(),
            self.email.map(Value::String).unwrap_or(Value::Null),
        );
        entity.insert("username".into(), Value::String(self.username));
        entity.insert("password".into(), Value::String(password_hash));
        entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use harbor_core::entity::entity_from_pairs;
    use serde_json::json;

    fn params() -> CreateAccountParams {
        CreateAccountParams {
            name: "Alice".into(),
            email: Some("alice@example.com".into()),
            username: "alice".into(),
            password: "hunter22".into(),
        }
    }

    #[test]
    fn valid_params_pass() {
        params().validate().unwrap();
    }

    #[test]
    fn out_of_range_fields_are_rejected() {
        let mut p = params();
        p.name = "   ".into();
        assert!(matches!(p.validate(), Err(AccountError::InvalidParams(_))));

        let mut p = params();
        p.username = "ab".into();
        assert!(matches!(p.validate(), Err(AccountError::InvalidParams(_))));

        let mut p = params();
        p.password = "short".into();
        assert!(matches!(p.validate(), Err(AccountError::InvalidParams(_))));
    }

    #[test]
    fn record_round_trips_through_an_entity() {
        let entity = entity_from_pairs([
            ("id", json!("u-1")),
            ("name", json!("Alice")),
            ("email", json!(null)),
            ("username", json!("alice")),
            ("password", json!("$argon2id$...")),
        ]);
        let record = UserRecord::from_entity(entity).unwrap();
        assert_eq!(record.id, "u-1");
        assert_eq!(record.email, None);
    }

    #[test]
    fn serialized_record_never_exposes_the_password() {
        let record = UserRecord {
            id: "u-1".into(),
            name: "Alice".into(),
            email: None,
            username: "alice".into(),
            password: "$argon2id$...".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["username"], json!("alice"));
    }

    #[test]
    fn absent_email_inserts_as_null() {
        let mut p = params();
        p.email = None;
        let entity = p.into_entity("hash".into());
        assert_eq!(entity["email"], json!(null));
        assert!(entity.get("id").is_none());
    }
}
