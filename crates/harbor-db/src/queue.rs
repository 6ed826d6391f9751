// SPDX-FileCopyrightText: 2026 Harbor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-table FIFO operation queue.
//!
//! Each adapter owns one [`OpQueue`]: an unbounded channel of boxed jobs
//! drained by a single dedicated worker task. Submission order is completion
//! order, at most one job runs at a time, and a failed job resolves only its
//! own caller — the worker keeps draining.

use std::future::Future;

use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use harbor_core::DbError;

type Job = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// FIFO serialization point for one table's operations.
///
/// Dropping the queue lets the worker exit once the backlog drains.
pub struct OpQueue {
    label: String,
    tx: mpsc::UnboundedSender<Job>,
}

impl OpQueue {
    /// Spawn the worker task for a table. Must be called within a tokio
    /// runtime context.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let worker_label = label.clone();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                job().await;
            }
            debug!(table = %worker_label, "operation queue closed");
        });
        Self { label, tx }
    }

    /// Enqueue one operation and await its result.
    ///
    /// The operation is appended to the queue synchronously, before the
    /// returned future is first polled, so call order is submission order.
    /// The result reaches only this caller; the worker proceeds to the next
    /// queued item whether the operation succeeded or failed.
    pub fn run<T, F>(&self, operation: F) -> impl Future<Output = Result<T, DbError>> + use<T, F>
    where
        F: Future<Output = Result<T, DbError>> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let job: Job = Box::new(move || {
            Box::pin(async move {
                // The receiver may be gone if the caller gave up waiting;
                // the operation still ran to completion in order.
                let _ = done_tx.send(operation.await);
            })
        });
        let submitted = self
            .tx
            .send(job)
            .map_err(|_| DbError::Connection(format!("operation queue for `{}` is closed", self.label)));
        async move {
            submitted?;
            done_rx
                .await
                .map_err(|_| DbError::Connection("operation worker terminated".to_string()))?
        }
    }
}
