// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Document-store implementation of the table-adapter contract.
//!
//! One adapter owns one collection named after the entity. `open()` acquires
//! the shared client through the connection manager and installs the schema
//! validator on the collection; `close()` releases the claim, and the last
//! release disconnects.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::Document;
use mongodb::error::ErrorKind;
use tokio::sync::Mutex;
use tracing::debug;

use harbor_core::{
    DbError, DeleteRequest, Entity, InsertRequest, QueryOptions, TableAdapter, TableSchema,
    UpdateRequest,
};

use crate::mongo::builder::MongoQueryBuilder;
use crate::mongo::connection::MongoConnectionManager;
use crate::mongo::convert::{bson_to_json, document_to_entity, entity_to_document};
use crate::queue::OpQueue;

const NAMESPACE_EXISTS: i32 = 48;

/// Table adapter backed by one collection on the shared client.
pub struct MongoTableAdapter {
    queue: OpQueue,
    inner: Arc<Inner>,
}

struct Inner {
    schema: Arc<TableSchema>,
    builder: MongoQueryBuilder,
    database: String,
    manager: Arc<MongoConnectionManager>,
    collection: Mutex<Option<mongodb::Collection<Document>>>,
}

impl MongoTableAdapter {
    pub fn new(
        schema: Arc<TableSchema>,
        manager: Arc<MongoConnectionManager>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            queue: OpQueue::new(schema.entity()),
            inner: Arc::new(Inner {
                builder: MongoQueryBuilder::new(schema.clone()),
                schema,
                database: database.into(),
                manager,
                collection: Mutex::new(None),
            }),
        }
    }
}

#[async_trait]
impl TableAdapter for MongoTableAdapter {
    async fn open(&self) -> Result<(), DbError> {
        let inner = self.inner.clone();
        self.queue
            .run(async move {
                let mut guard = inner.collection.lock().await;
                if guard.is_some() {
                    return Ok(());
                }
                let entity = inner.schema.entity().to_string();
                let client = inner.manager.acquire(&entity).await?;
                let db = client.database(&inner.database);
                let created = db
                    .create_collection(&entity)
                    .validator(inner.builder.collection_validator())
                    .await;
                if let Err(err) = created {
                    // Creation races with other processes; an existing
                    // namespace keeps its validator.
                    let exists = matches!(
                        *err.kind,
                        ErrorKind::Command(ref c) if c.code == NAMESPACE_EXISTS
                    );
                    if !exists {
                        inner.manager.release(&entity).await?;
                        return Err(DbError::connection(err));
                    }
                }
                debug!(collection = %entity, "document collection opened");
                *guard = Some(db.collection::<Document>(&entity));
                Ok(())
            })
            .await
    }

    async fn close(&self) -> Result<(), DbError> {
        let inner = self.inner.clone();
        self.queue
            .run(async move {
                let released = inner.collection.lock().await.take();
                if released.is_some() {
                    inner.manager.release(inner.schema.entity()).await?;
                    debug!(collection = %inner.schema.entity(), "document collection closed");
                }
                Ok(())
            })
            .await
    }

    async fn insert(&self, request: InsertRequest) -> Result<Vec<Entity>, DbError> {
        let inner = self.inner.clone();
        self.queue
            .run(async move {
                if request.data.is_empty() {
                    return Ok(Vec::new());
                }
                let mut docs = Vec::with_capacity(request.data.len());
                for row in &request.data {
                    inner.schema.check_insert(row)?;
                    docs.push(entity_to_document(&inner.schema, row));
                }
                let collection = require_collection(&inner).await?;
                let outcome = collection
                    .insert_many(docs)
                    .await
                    .map_err(DbError::query)?;

                let pk = inner.schema.primary_key().map(|(name, _)| name.to_string());
                let mut inserted = Vec::with_capacity(request.data.len());
                for (index, row) in request.data.into_iter().enumerate() {
                    let mut entity = Entity::new();
                    for (name, _) in inner.schema.columns() {
                        let value = if Some(name) == pk.as_deref() {
                            match row.get(name) {
                                Some(given) => given.clone(),
                                None => outcome
                                    .inserted_ids
                                    .get(&index)
                                    .map(bson_to_json)
                                    .unwrap_or(serde_json::Value::Null),
                            }
                        } else {
                            row.get(name).cloned().unwrap_or(serde_json::Value::Null)
                        };
                        entity.insert(name.to_string(), value);
                    }
                    inserted.push(entity);
                }
                Ok(inserted)
            })
            .await
    }

    async fn get_all(&self, options: QueryOptions) -> Result<Vec<Entity>, DbError> {
        let inner = self.inner.clone();
        self.queue.run(async move { fetch(&inner, &options).await }).await
    }

    async fn update(&self, request: UpdateRequest) -> Result<Vec<Entity>, DbError> {
        let inner = self.inner.clone();
        self.queue
            .run(async move {
                inner.schema.check_update(&request.updater)?;
                let filter = inner.builder.filter(request.conditions.as_ref())?;
                let update = inner.builder.update_doc(&request.updater)?;
                let collection = require_collection(&inner).await?;
                collection
                    .update_many(filter, update)
                    .await
                    .map_err(DbError::query)?;
                // Post-update state of the matching rows.
                let readback = QueryOptions {
                    conditions: request.conditions,
                    ..QueryOptions::default()
                };
                fetch(&inner, &readback).await
            })
            .await
    }

    async fn delete(&self, request: DeleteRequest) -> Result<Vec<Entity>, DbError> {
        let inner = self.inner.clone();
        self.queue
            .run(async move {
                // Snapshot first; both steps run inside this one queued job.
                let snapshot_options = QueryOptions {
                    conditions: request.conditions.clone(),
                    ..QueryOptions::default()
                };
                let snapshot = fetch(&inner, &snapshot_options).await?;
                let filter = inner.builder.filter(request.conditions.as_ref())?;
                let collection = require_collection(&inner).await?;
                collection
                    .delete_many(filter)
                    .await
                    .map_err(DbError::query)?;
                Ok(snapshot)
            })
            .await
    }
}

async fn require_collection(inner: &Inner) -> Result<mongodb::Collection<Document>, DbError> {
    inner.collection.lock().await.clone().ok_or_else(|| {
        DbError::Connection(format!("table `{}` is not open", inner.schema.entity()))
    })
}

async fn fetch(inner: &Inner, options: &QueryOptions) -> Result<Vec<Entity>, DbError> {
    inner.schema.check_columns(options.referenced_columns())?;
    let filter = inner.builder.filter(options.conditions.as_ref())?;
    let collection = require_collection(inner).await?;

    let mut find = collection.find(filter);
    if let Some(projection) = inner.builder.projection(options.selector.as_deref()) {
        find = find.projection(projection);
    }
    if let Some(sort) = inner.builder.sort(&options.order_by) {
        find = find.sort(sort);
    }
    if let Some(limit) = options.limit {
        find = find.limit(crate::mongo::builder::find_limit(limit));
    }
    let docs: Vec<Document> = find
        .await
        .map_err(DbError::query)?
        .try_collect()
        .await
        .map_err(DbError::query)?;
    Ok(docs
        .iter()
        .map(|doc| document_to_entity(&inner.schema, doc))
        .collect())
}
