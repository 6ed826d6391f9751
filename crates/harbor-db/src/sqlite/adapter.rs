// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the table-adapter contract.
//!
//! One adapter owns one database file named `<entity>.db` under the data
//! directory, created together with the directory on first `open()`. All
//! operations run through the adapter's FIFO queue; inside an operation the
//! statement executes on tokio-rusqlite's background thread.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use harbor_core::{
    Column, ColumnType, DbError, DeleteRequest, Entity, InsertRequest, QueryOptions, TableAdapter,
    TableSchema, UpdateRequest,
};

use crate::queue::OpQueue;
use crate::sqlite::builder::SqlBuilder;

/// Table adapter backed by one embedded relational file.
pub struct SqliteTableAdapter {
    queue: OpQueue,
    inner: Arc<Inner>,
}

struct Inner {
    schema: Arc<TableSchema>,
    builder: SqlBuilder,
    dir: PathBuf,
    path: PathBuf,
    // Populated by open(), cleared by close(). Only ever touched from the
    // queue worker, so the lock is uncontended.
    conn: Mutex<Option<tokio_rusqlite::Connection>>,
}

impl SqliteTableAdapter {
    /// Create an adapter for the entity; no file is touched until `open()`.
    pub fn new(schema: Arc<TableSchema>, data_dir: impl Into<PathBuf>) -> Self {
        let dir = data_dir.into();
        let path = dir.join(format!("{}.db", schema.entity()));
        Self {
            queue: OpQueue::new(schema.entity()),
            inner: Arc::new(Inner {
                builder: SqlBuilder::new(schema.clone()),
                schema,
                dir,
                path,
                conn: Mutex::new(None),
            }),
        }
    }
}

#[async_trait]
impl TableAdapter for SqliteTableAdapter {
    async fn open(&self) -> Result<(), DbError> {
        let inner = self.inner.clone();
        self.queue
            .run(async move {
                let mut guard = inner.conn.lock().await;
                if guard.is_some() {
                    return Ok(());
                }
                tokio::fs::create_dir_all(&inner.dir).await.map_err(|e| {
                    DbError::Connection(format!(
                        "cannot create data directory {}: {e}",
                        inner.dir.display()
                    ))
                })?;
                let conn = tokio_rusqlite::Connection::open(inner.path.clone())
                    .await
                    .map_err(DbError::connection)?;
                let ddl = inner.builder.create_table();
                conn.call(move |c| -> tokio_rusqlite::Result<()> {
                    c.execute_batch(&ddl)?;
                    Ok(())
                })
                .await
                .map_err(DbError::connection)?;
                debug!(path = %inner.path.display(), "sqlite table opened");
                *guard = Some(conn);
                Ok(())
            })
            .await
    }

    async fn close(&self) -> Result<(), DbError> {
        let inner = self.inner.clone();
        self.queue
            .run(async move {
                let conn = inner.conn.lock().await.take();
                if let Some(conn) = conn {
                    conn.close().await.map_err(DbError::connection)?;
                    debug!(table = %inner.schema.entity(), "sqlite table closed");
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
                let rows = normalize_rows(&inner.schema, request.data)?;
                let sql = inner.builder.insert(&rows)?;
                execute(&inner, sql).await?;
                Ok(rows)
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
                if let Some(conditions) = &request.conditions {
                    inner.schema.check_columns(conditions.columns())?;
                }
                let sql = inner
                    .builder
                    .update(&request.updater, request.conditions.as_ref())?;
                execute(&inner, sql).await?;
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
                // Snapshot first; both steps run inside this one queued job,
                // so no sibling operation can interleave.
                let snapshot_options = QueryOptions {
                    conditions: request.conditions.clone(),
                    ..QueryOptions::default()
                };
                let snapshot = fetch(&inner, &snapshot_options).await?;
                let sql = inner.builder.delete(request.conditions.as_ref())?;
                execute(&inner, sql).await?;
                Ok(snapshot)
            })
            .await
    }
}

/// Clone the open connection handle or fail with a connection error.
async fn require_conn(inner: &Inner) -> Result<tokio_rusqlite::Connection, DbError> {
    inner.conn.lock().await.clone().ok_or_else(|| {
        DbError::Connection(format!("table `{}` is not open", inner.schema.entity()))
    })
}

async fn execute(inner: &Inner, sql: String) -> Result<usize, DbError> {
    let conn = require_conn(inner).await?;
    conn.call(move |c| -> tokio_rusqlite::Result<usize> { Ok(c.execute(&sql, [])?) })
        .await
        .map_err(DbError::query)
}

/// Run a SELECT and accumulate the full decoded row list before resolving.
async fn fetch(inner: &Inner, options: &QueryOptions) -> Result<Vec<Entity>, DbError> {
    inner.schema.check_columns(options.referenced_columns())?;
    let sql = inner.builder.select(options)?;
    let conn = require_conn(inner).await?;
    let schema = inner.schema.clone();
    conn.call(move |c| -> tokio_rusqlite::Result<Vec<Entity>> {
        let mut stmt = c.prepare(&sql)?;
        let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut entity = Entity::new();
            for (i, name) in names.iter().enumerate() {
                entity.insert(name.clone(), decode(schema.column(name), row.get_ref(i)?));
            }
            out.push(entity);
        }
        Ok(out)
    })
    .await
    .map_err(DbError::query)
}

/// Validate rows and normalize them to full-width entities: identity
/// assigned for an absent string primary key, absent nullable columns
/// explicit as `Null`.
fn normalize_rows(schema: &TableSchema, data: Vec<Entity>) -> Result<Vec<Entity>, DbError> {
    let mut out = Vec::with_capacity(data.len());
    for row in data {
        schema.check_insert(&row)?;
        let mut normalized = Entity::new();
        for (name, column) in schema.columns() {
            match row.get(name) {
                Some(value) => {
                    normalized.insert(name.to_string(), value.clone());
                }
                None if column.primary_key => {
                    if column.ty == ColumnType::String {
                        normalized.insert(
                            name.to_string(),
                            Value::String(uuid::Uuid::new_v4().to_string()),
                        );
                    } else {
                        return Err(DbError::Validation(format!(
                            "cannot generate identity for non-string primary key `{name}`"
                        )));
                    }
                }
                None => {
                    normalized.insert(name.to_string(), Value::Null);
                }
            }
        }
        out.push(normalized);
    }
    Ok(out)
}

/// Map a stored SQLite value back to the column's logical type.
///
/// Booleans come back as logical booleans; JSON columns come back as their
/// stored text, never auto-deserialized.
fn decode(column: Option<&Column>, value: rusqlite::types::ValueRef<'_>) -> Value {
    use rusqlite::types::ValueRef;
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => match column {
            Some(c) if c.ty == ColumnType::Boolean => Value::Bool(i != 0),
            _ => Value::Number(i.into()),
        },
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(_) => Value::Null,
    }
}
