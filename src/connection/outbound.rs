//! Bounded outbound queue between producers and the writer task.
//!
//! The queue never blocks a producer. Capacity is enforced explicitly rather
//! than by the channel alone, which lets a zero capacity mean "every enqueue
//! overflows" even though Tokio channels need room for at least one item, and
//! lets capacities beyond Tokio's permit limit behave as effectively unbounded.

use bytes::Bytes;
use tokio::sync::{Semaphore, mpsc};

/// Entry drained by the writer task.
#[derive(Debug)]
pub(super) enum Item {
    /// Bytes to write to the stream.
    Data(Bytes),
    /// No more data follows; close the stream once reached.
    Stop,
}

/// Result of a non-blocking enqueue attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Enqueue {
    Queued,
    /// `capacity` items are already waiting.
    Full,
    /// The queue was closed or the writer task has gone away.
    Disconnected,
}

/// Producer side of the outbound queue.
pub(super) struct OutboundQueue {
    tx: Option<mpsc::Sender<Item>>,
    capacity: usize,
}

impl OutboundQueue {
    /// Create a queue holding at most `capacity` pending items.
    pub(super) fn bounded(capacity: usize) -> (Self, mpsc::Receiver<Item>) {
        let (tx, rx) = mpsc::channel(capacity.clamp(1, Semaphore::MAX_PERMITS));
        (
            Self {
                tx: Some(tx),
                capacity,
            },
            rx,
        )
    }

    /// Items queued but not yet taken by the writer task.
    pub(super) fn pending(&self) -> usize {
        self.tx
            .as_ref()
            .map_or(0, |tx| tx.max_capacity() - tx.capacity())
    }

    /// Attempt to queue `item` without waiting.
    pub(super) fn try_enqueue(&self, item: Item) -> Enqueue {
        let Some(tx) = &self.tx else {
            return Enqueue::Disconnected;
        };
        if self.pending() >= self.capacity {
            return Enqueue::Full;
        }
        match tx.try_send(item) {
            Ok(()) => Enqueue::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => Enqueue::Full,
            Err(mpsc::error::TrySendError::Closed(_)) => Enqueue::Disconnected,
        }
    }

    /// Drop the producer so the writer observes closure once drained.
    pub(super) fn close(&mut self) { self.tx = None; }
}
