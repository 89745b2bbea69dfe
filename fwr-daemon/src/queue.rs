// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work Queue: a bounded FIFO channel of `FileEvent`, tolerant of multiple
//! producers, that applies backpressure (blocks) rather than dropping events
//! when full.

use filewatchrest_core::FileEvent;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("work queue closed")]
    Closed,
    #[error("cancelled before enqueue")]
    Cancelled,
}

#[derive(Clone)]
pub struct QueueProducer {
    tx: mpsc::Sender<FileEvent>,
}

impl QueueProducer {
    /// Enqueues `event`, blocking (applying backpressure) while the queue is
    /// full. Returns `Cancelled` without enqueueing if `cancel` fires first.
    pub async fn enqueue(
        &self,
        event: FileEvent,
        cancel: &CancellationToken,
    ) -> Result<(), QueueError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(QueueError::Cancelled),
            result = self.tx.send(event) => result.map_err(|_| QueueError::Closed),
        }
    }
}

pub struct QueueConsumer {
    rx: mpsc::Receiver<FileEvent>,
}

impl QueueConsumer {
    pub async fn dequeue(&mut self) -> Option<FileEvent> {
        self.rx.recv().await
    }
}

/// Create a bounded work queue with capacity `capacity` (at least 1).
pub fn work_queue(capacity: usize) -> (QueueProducer, QueueConsumer) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    (QueueProducer { tx }, QueueConsumer { rx })
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
