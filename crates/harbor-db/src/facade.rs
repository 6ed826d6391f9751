// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The database facade.
//!
//! Owns one adapter per logical entity, built lazily on first access and
//! opened before it is handed out. The backend comes from
//! [`StorageConfig::backend`] and is fixed for the process lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::info;

use harbor_config::{StorageBackend, StorageConfig};
use harbor_core::{DbError, TableAdapter, TableSchema};

use crate::entities::user_info_schema;
use crate::mongo::{MongoConnectionManager, MongoConnector, MongoTableAdapter};
use crate::sqlite::SqliteTableAdapter;

type AdapterCell = Arc<OnceCell<Arc<dyn TableAdapter>>>;

/// Entry point to persistence: schema registry plus adapter cache.
pub struct Database {
    storage: StorageConfig,
    schemas: HashMap<String, Arc<TableSchema>>,
    manager: Arc<MongoConnectionManager>,
    // One cell per entity so first opens of distinct entities proceed
    // concurrently; the map lock is only held to look the cell up.
    adapters: Mutex<HashMap<String, AdapterCell>>,
}

impl Database {
    /// Build the facade with Harbor's declared entities registered.
    pub fn new(storage: StorageConfig) -> Self {
        let manager = Arc::new(MongoConnectionManager::new(MongoConnector::new(
            storage.mongodb_url.clone(),
            storage.mongodb_database.clone(),
        )));
        let mut db = Self {
            storage,
            schemas: HashMap::new(),
            manager,
            adapters: Mutex::new(HashMap::new()),
        };
        db.register(user_info_schema());
        db
    }

    /// Register an additional entity schema. Must happen before the first
    /// `get()` for that entity.
    pub fn register(&mut self, schema: TableSchema) {
        self.schemas
            .insert(schema.entity().to_string(), Arc::new(schema));
    }

    /// The opened adapter for an entity, built on first access.
    ///
    /// Concurrent first accesses of the same entity share one build and
    /// open; a failed open leaves the cell empty, so the next access
    /// retries. Distinct entities open independently of each other.
    pub async fn get(&self, entity: &str) -> Result<Arc<dyn TableAdapter>, DbError> {
        let cell = {
            let mut adapters = self.adapters.lock().await;
            adapters.entry(entity.to_string()).or_default().clone()
        };
        let adapter = cell
            .get_or_try_init(|| async {
                let schema = self
                    .schemas
                    .get(entity)
                    .cloned()
                    .ok_or_else(|| DbError::Validation(format!("unknown entity `{entity}`")))?;

                let adapter: Arc<dyn TableAdapter> = match self.storage.backend {
                    StorageBackend::Sqlite => Arc::new(SqliteTableAdapter::new(
                        schema,
                        self.storage.data_dir.clone(),
                    )),
                    StorageBackend::Mongo => Arc::new(MongoTableAdapter::new(
                        schema,
                        self.manager.clone(),
                        self.storage.mongodb_database.clone(),
                    )),
                };
                adapter.open().await?;
                info!(entity, backend = ?self.storage.backend, "table adapter opened");
                Ok::<_, DbError>(adapter)
            })
            .await?;
        Ok(adapter.clone())
    }

    /// Close every open adapter, draining their queues. The first failure
    /// is reported, but every adapter is still closed.
    pub async fn shutdown(&self) -> Result<(), DbError> {
        let drained: Vec<_> = self.adapters.lock().await.drain().collect();
        let mut first_error = None;
        for (entity, cell) in drained {
            let Some(adapter) = cell.get() else { continue };
            if let Err(err) = adapter.close().await {
                info!(entity = %entity, error = %err, "adapter close failed");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::USER_INFO;
    use harbor_core::entity::entity_from_pairs;
    use harbor_core::{Conditions, InsertRequest, QueryOptions};
    use serde_json::json;
    use tempfile::tempdir;

    fn sqlite_storage(dir: &std::path::Path) -> StorageConfig {
        StorageConfig {
            backend: StorageBackend::Sqlite,
            data_dir: dir.to_string_lossy().into_owned(),
            ..StorageConfig::default()
        }
    }

    fn account(username: &str) -> harbor_core::Entity {
        entity_from_pairs([
            ("name", json!(username)),
            ("username", json!(username)),
            ("password", json!("secret-hash")),
        ])
    }

    #[tokio::test]
    async fn get_builds_once_and_reuses_the_adapter() {
        let dir = tempdir().unwrap();
        let db = Database::new(sqlite_storage(dir.path()));

        let first = db.get(USER_INFO).await.unwrap();
        let second = db.get(USER_INFO).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        db.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_entity_is_a_validation_error() {
        let dir = tempdir().unwrap();
        let db = Database::new(sqlite_storage(dir.path()));
        let err = match db.get("no_such_entity").await {
            Ok(_) => panic!("unknown entity must not resolve to an adapter"),
            Err(err) => err,
        };
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn concurrent_first_access_shares_one_adapter() {
        let dir = tempdir().unwrap();
        let db = Database::new(sqlite_storage(dir.path()));

        let (a, b) = futures::join!(db.get(USER_INFO), db.get(USER_INFO));
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        db.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn distinct_entities_open_independently() {
        let dir = tempdir().unwrap();
        let mut db = Database::new(sqlite_storage(dir.path()));
        db.register(harbor_core::TableSchema::new(
            "audit_log",
            [
                ("id", harbor_core::Column::string().primary_key()),
                ("message", harbor_core::Column::string()),
            ],
        ));

        let (users, audit) = futures::join!(db.get(USER_INFO), db.get("audit_log"));
        users.unwrap();
        audit.unwrap();
        assert!(dir.path().join("user_info.db").exists());
        assert!(dir.path().join("audit_log.db").exists());
        db.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn registered_entity_round_trips_through_the_facade() {
        let dir = tempdir().unwrap();
        let db = Database::new(sqlite_storage(dir.path()));

        let users = db.get(USER_INFO).await.unwrap();
        users
            .insert(InsertRequest::row(account("alice")))
            .await
            .unwrap();
        let found = users
            .get_all(QueryOptions::new().conditions(Conditions::new().eq("username", json!("alice"))))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0]["email"], json!(null));

        db.shutdown().await.unwrap();
        assert!(dir.path().join("user_info.db").exists());
    }

    #[tokio::test]
    async fn shutdown_allows_reopening() {
        let dir = tempdir().unwrap();
        let db = Database::new(sqlite_storage(dir.path()));

        let users = db.get(USER_INFO).await.unwrap();
        users
            .insert(InsertRequest::row(account("bob")))
            .await
            .unwrap();
        db.shutdown().await.unwrap();

        // A fresh adapter sees the data persisted by the previous one.
        let users = db.get(USER_INFO).await.unwrap();
        let found = users.get_all(QueryOptions::new()).await.unwrap();
        assert_eq!(found.len(), 1);
        db.shutdown().await.unwrap();
    }
}
