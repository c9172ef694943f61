//! State shared between a connection handle and its writer task.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::info;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{CloseReason, ConnectionId, state::Lifecycle};
use crate::hooks::ConnectionHooks;

pub(super) struct Shared<R> {
    pub(super) id: ConnectionId,
    pub(super) capacity: usize,
    lifecycle: Mutex<Lifecycle>,
    pub(super) reader: tokio::sync::Mutex<Option<R>>,
    /// Cancelled once teardown begins.
    pub(super) closed: CancellationToken,
    hooks: ConnectionHooks,
}

impl<R> Shared<R> {
    pub(super) fn new(
        id: ConnectionId,
        capacity: usize,
        lifecycle: Lifecycle,
        reader: R,
        closed: CancellationToken,
        hooks: ConnectionHooks,
    ) -> Self {
        Self {
            id,
            capacity,
            lifecycle: Mutex::new(lifecycle),
            reader: tokio::sync::Mutex::new(Some(reader)),
            closed,
            hooks,
        }
    }

    /// Acquire the lifecycle lock.
    ///
    /// No code path panics while holding the lock, so a poisoned guard still
    /// holds consistent state and is recovered.
    pub(super) fn lock(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop the read half unless a read currently holds it; an in-flight read
    /// observes `closed` and drops it itself.
    pub(super) fn release_reader(&self) {
        if let Ok(mut reader) = self.reader.try_lock() {
            reader.take();
        }
    }

    /// Run the side effects of a transition into the terminal state.
    ///
    /// Must be called after the lifecycle lock is released, because hooks may
    /// call back into the connection.
    pub(super) fn after_teardown(&self, teardown: Option<CloseReason>) {
        let Some(reason) = teardown else {
            return;
        };
        self.release_reader();
        if reason == CloseReason::Overflow {
            debug!(
                id = %self.id,
                capacity = self.capacity,
                "connection destroyed: outbound queue full"
            );
            crate::metrics::inc_overflow_destroys();
            self.hooks.on_overflow(self.id, self.capacity);
        }
        info!(
            "connection closed: id={}, reason={reason}, wireconn_active_connections={}",
            self.id,
            super::active_connection_count(),
        );
        self.hooks.on_close(self.id, reason);
    }
}
