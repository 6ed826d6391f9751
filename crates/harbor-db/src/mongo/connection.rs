// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Refcounted shared connection management.
//!
//! Every adapter in the process acquires the same physical client through
//! one [`ConnectionManager`]. The first acquire dials; concurrent acquires
//! during the dial share the in-flight attempt instead of dialing again.
//! Releases are counted, and only the release of the last holder physically
//! disconnects.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use mongodb::bson::doc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use harbor_core::DbError;

/// Dialing seam between the manager and the actual driver.
#[async_trait]
pub trait Connect: Send + Sync + 'static {
    type Handle: Clone + Send + Sync + 'static;

    async fn connect(&self) -> Result<Self::Handle, DbError>;
    async fn disconnect(&self, handle: Self::Handle) -> Result<(), DbError>;
}

enum Slot<H> {
    Idle,
    /// A dial is in flight; late acquirers await this same attempt.
    Connecting(Shared<BoxFuture<'static, Result<H, DbError>>>),
    Ready(H),
}

struct State<H> {
    slot: Slot<H>,
    holders: HashSet<String>,
    /// Bumped whenever the slot moves to a new dial attempt or back to
    /// `Idle`. A waiter resuming after `attempt.await` may only install its
    /// result while the generation it tagged is still current; a stale
    /// result belongs to a slot life that has already ended (for instance a
    /// handle the last release disconnected) and must not be reinstalled.
    generation: u64,
}

/// Shared client with per-holder refcounting.
pub struct ConnectionManager<C: Connect> {
    connector: Arc<C>,
    state: Mutex<State<C::Handle>>,
}

impl<C: Connect> ConnectionManager<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector: Arc::new(connector),
            state: Mutex::new(State {
                slot: Slot::Idle,
                holders: HashSet::new(),
                generation: 0,
            }),
        }
    }

    /// Acquire the shared handle on behalf of `holder`.
    ///
    /// Dials at most once per outage: a failure resets the slot so the next
    /// acquire retries, and every waiter of the failed attempt gets the
    /// same error. The holder is only registered on success. A waiter whose
    /// attempt was outlived by the slot (the connection already released
    /// and disconnected, or the attempt superseded) discards the stale
    /// result and starts over instead of corrupting the slot.
    pub async fn acquire(&self, holder: &str) -> Result<C::Handle, DbError> {
        loop {
            let (attempt, tag) = {
                let mut state = self.state.lock().await;
                match &state.slot {
                    Slot::Ready(handle) => {
                        let handle = handle.clone();
                        state.holders.insert(holder.to_string());
                        return Ok(handle);
                    }
                    Slot::Connecting(shared) => (shared.clone(), state.generation),
                    Slot::Idle => {
                        let connector = self.connector.clone();
                        let shared = async move { connector.connect().await }
                            .boxed()
                            .shared();
                        state.slot = Slot::Connecting(shared.clone());
                        state.generation += 1;
                        (shared, state.generation)
                    }
                }
            };

            let result = attempt.await;
            let mut state = self.state.lock().await;
            match result {
                Ok(handle) if state.generation == tag => {
                    if !matches!(state.slot, Slot::Ready(_)) {
                        state.slot = Slot::Ready(handle.clone());
                        debug!("shared connection established");
                    }
                    state.holders.insert(holder.to_string());
                    return Ok(handle);
                }
                Ok(_) => {
                    // The slot moved on while this waiter was suspended;
                    // the handle may already be disconnected.
                    debug!("discarding stale dial result, retrying acquire");
                }
                Err(err) => {
                    if state.generation == tag && matches!(state.slot, Slot::Connecting(_)) {
                        state.slot = Slot::Idle;
                        state.generation += 1;
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Release `holder`'s claim; disconnects when it was the last one.
    /// Releasing an unknown holder is a no-op.
    pub async fn release(&self, holder: &str) -> Result<(), DbError> {
        let handle = {
            let mut state = self.state.lock().await;
            if !state.holders.remove(holder) {
                return Ok(());
            }
            if !state.holders.is_empty() {
                return Ok(());
            }
            match std::mem::replace(&mut state.slot, Slot::Idle) {
                Slot::Ready(handle) => {
                    state.generation += 1;
                    handle
                }
                other => {
                    state.slot = other;
                    return Ok(());
                }
            }
        };
        info!("last holder released, disconnecting shared connection");
        self.connector.disconnect(handle).await
    }

    #[cfg(test)]
    async fn holder_count(&self) -> usize {
        self.state.lock().await.holders.len()
    }
}

/// Live dialer for the document store.
pub struct MongoConnector {
    url: String,
    database: String,
}

impl MongoConnector {
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
        }
    }
}

#[async_trait]
impl Connect for MongoConnector {
    type Handle = mongodb::Client;

    async fn connect(&self) -> Result<Self::Handle, DbError> {
        let client = mongodb::Client::with_uri_str(&self.url)
            .await
            .map_err(DbError::connection)?;
        // Drivers connect lazily; ping so open() fails fast on a bad URL.
        client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(DbError::connection)?;
        Ok(client)
    }

    async fn disconnect(&self, handle: Self::Handle) -> Result<(), DbError> {
        handle.shutdown().await;
        Ok(())
    }
}

/// Manager type used by the live document adapters.
pub type MongoConnectionManager = ConnectionManager<MongoConnector>;
