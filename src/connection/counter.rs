//! Process-wide count of connections whose writer task is still alive.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use super::ConnectionId;

static LIVE_WRITERS: AtomicU64 = AtomicU64::new(0);

/// Registration of one connection in the live count.
///
/// Created with the connection and moved into its writer task; dropping it
/// when the task exits removes the connection from the count and from the
/// `wireconn_connections_active` gauge.
pub(super) struct ActiveConnection {
    id: ConnectionId,
}

impl ActiveConnection {
    pub(super) fn register(id: ConnectionId) -> Self {
        LIVE_WRITERS.fetch_add(1, Ordering::Relaxed);
        crate::metrics::inc_connections();
        Self { id }
    }
}

impl Drop for ActiveConnection {
    fn drop(&mut self) {
        let remaining = LIVE_WRITERS.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
        crate::metrics::dec_connections();
        trace!(id = %self.id, remaining, "writer task exited");
    }
}

/// Number of connections whose writer task has not yet exited.
///
/// A destroyed connection stays counted until its writer has dropped the
/// stream.
#[must_use]
pub fn active_connection_count() -> u64 { LIVE_WRITERS.load(Ordering::Relaxed) }
