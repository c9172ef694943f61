//! A byte-stream connection with a queued, single-writer output path.
//!
//! [`Connection`] owns one [`Transport`]. Producers on any thread call
//! [`Connection::write`], which only enqueues; a dedicated Tokio task drains
//! the queue in order and performs the socket writes. The queue is bounded:
//! a peer that cannot keep up is disconnected instead of stalling producers.
//!
//! Two termination protocols are available. [`Connection::close`] lets the
//! writer flush everything already queued before closing the stream, whereas
//! [`Connection::destroy`] discards queued data and aborts the stream.

mod counter;
mod id;
mod outbound;
mod shared;
mod state;
mod writer;

use std::{io, sync::Arc};

use bytes::Bytes;
pub use counter::active_connection_count;
use counter::ActiveConnection;
pub use id::ConnectionId;
use log::{error, info, warn};
use outbound::{Item, OutboundQueue};
use shared::Shared;
use state::Lifecycle;
pub use state::{CloseReason, ConnectionState};
use tokio::{io::AsyncReadExt, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use writer::WriterTask;

use crate::{
    config::ConnectionConfig,
    error::ConnectionClosed,
    hooks::ConnectionHooks,
    transport::Transport,
};

/// A stream wrapper with a bounded, asynchronously drained write queue.
///
/// Writing never blocks and never fails from the caller's point of view;
/// liveness is observed through [`read`](Self::read) or
/// [`state`](Self::state). The connection is `Send + Sync`; share it across
/// threads with an [`Arc`].
///
/// Dropping the connection closes it gracefully.
///
/// # Examples
///
/// ```no_run
/// use tokio::net::TcpStream;
/// use wireconn::Connection;
///
/// # async fn demo() -> std::io::Result<()> {
/// let stream = TcpStream::connect("127.0.0.1:7878").await?;
/// let conn = Connection::new(stream, 64);
/// conn.write("hello");
/// conn.copy_and_write(b" world");
/// conn.close();
/// # Ok(())
/// # }
/// ```
pub struct Connection<T: Transport> {
    shared: Arc<Shared<T::ReadHalf>>,
    local_addr: Option<T::Addr>,
    peer_addr: Option<T::Addr>,
    writer: Option<JoinHandle<()>>,
}

impl<T: Transport> Connection<T> {
    /// Wrap `stream`, allowing at most `capacity` buffers to wait for the
    /// writer task.
    ///
    /// Any capacity is accepted; values beyond what a Tokio channel can hold
    /// are limited to that maximum.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime, since the writer task is
    /// spawned immediately.
    #[must_use]
    pub fn new(stream: T, capacity: usize) -> Self {
        Self::with_config(
            stream,
            ConnectionConfig::default().write_queue_capacity(capacity),
            ConnectionHooks::default(),
        )
    }

    /// Wrap `stream` using the supplied configuration and hooks.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn with_config(stream: T, config: ConnectionConfig, hooks: ConnectionHooks) -> Self {
        let id = ConnectionId::next();
        let local_addr = lookup_addr(id, "local", stream.local_addr());
        let peer_addr = lookup_addr(id, "peer", stream.peer_addr());
        let (reader, writer) = stream.into_split();

        let closed = CancellationToken::new();
        let (queue, rx) = OutboundQueue::bounded(config.queue_capacity());
        let shared = Arc::new(Shared::new(
            id,
            config.queue_capacity(),
            Lifecycle::new(queue, closed.clone()),
            reader,
            closed,
            hooks,
        ));

        let active = ActiveConnection::register(id);
        info!(
            "connection opened: id={id}, peer={peer_addr:?}, wireconn_active_connections={}",
            active_connection_count()
        );
        let task = WriterTask::new(
            writer,
            rx,
            Arc::clone(&shared),
            config.aborts_on_destroy(),
            active,
        );
        let handle = tokio::spawn(task.run());

        Self {
            shared,
            local_addr,
            peer_addr,
            writer: Some(handle),
        }
    }

    /// Queue `buf` for writing.
    ///
    /// Ownership of the buffer passes to the connection. Empty buffers and
    /// writes after [`close`](Self::close) or [`destroy`](Self::destroy) are
    /// ignored. If the queue is already full the connection is destroyed and
    /// `buf` is discarded.
    ///
    /// Buffers are written in the order their `write` calls acquired the
    /// connection lock.
    pub fn write(&self, buf: impl Into<Bytes>) {
        let buf = buf.into();
        let teardown = {
            let mut lifecycle = self.shared.lock();
            if !lifecycle.is_open() || buf.is_empty() {
                return;
            }
            lifecycle.enqueue(Item::Data(buf))
        };
        self.shared.after_teardown(teardown);
    }

    /// Copy `buf` and queue the copy, leaving the caller free to reuse it.
    pub fn copy_and_write(&self, buf: &[u8]) { self.write(Bytes::copy_from_slice(buf)); }

    /// Stop accepting writes and close the stream once queued data is
    /// written.
    ///
    /// Never waits for I/O. Has no effect unless the connection is open. If
    /// the queue has no room for the stop marker the connection is destroyed
    /// instead.
    pub fn close(&self) {
        let teardown = self.shared.lock().begin_close();
        self.shared.after_teardown(teardown);
    }

    /// Discard queued data and abort the stream.
    ///
    /// The connection stops accepting writes and pending reads fail before
    /// this returns, but the stream itself is closed by the writer task the
    /// next time it runs. Await [`closed`](Self::closed) or
    /// [`join`](Self::join) to observe teardown.
    ///
    /// Has no effect unless the connection is open; in particular it does not
    /// interrupt a graceful close already in progress.
    pub fn destroy(&self) {
        let teardown = {
            let mut lifecycle = self.shared.lock();
            if !lifecycle.is_open() {
                return;
            }
            lifecycle.destroy(CloseReason::Aborted)
        };
        self.shared.after_teardown(teardown);
    }

    /// Read bytes from the stream into `buf`.
    ///
    /// Reads are unbuffered and pass straight through to the transport. The
    /// connection assumes a single logical reader: concurrent calls are
    /// serialised but the order in which they observe data is unspecified.
    ///
    /// # Errors
    ///
    /// Returns transport errors unchanged. Once the connection is torn down,
    /// pending and future reads fail with [`io::ErrorKind::NotConnected`]
    /// wrapping [`ConnectionClosed`].
    pub async fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut guard = self.shared.reader.lock().await;
        if self.shared.closed.is_cancelled() {
            guard.take();
        }
        let Some(reader) = guard.as_mut() else {
            return Err(ConnectionClosed.into());
        };
        let outcome = tokio::select! {
            biased;
            () = self.shared.closed.cancelled() => None,
            res = reader.read(buf) => Some(res),
        };
        if let Some(res) = outcome {
            return res;
        }
        guard.take();
        Err(ConnectionClosed.into())
    }

    /// Address of the local endpoint, captured at construction.
    #[must_use]
    pub fn local_addr(&self) -> Option<T::Addr> { self.local_addr.clone() }

    /// Address of the remote endpoint, captured at construction.
    #[must_use]
    pub fn remote_addr(&self) -> Option<T::Addr> { self.peer_addr.clone() }

    /// Identifier used in diagnostics for this connection.
    #[must_use]
    pub fn id(&self) -> ConnectionId { self.shared.id }

    /// Configured outbound queue capacity.
    #[must_use]
    pub fn capacity(&self) -> usize { self.shared.capacity }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState { self.shared.lock().state() }

    /// Returns `true` while writes are accepted.
    #[must_use]
    pub fn is_open(&self) -> bool { self.state().is_open() }

    /// Reason the connection was destroyed, if it has been.
    #[must_use]
    pub fn close_reason(&self) -> Option<CloseReason> { self.state().close_reason() }

    /// Wait until teardown has begun, whether by destroy, overflow, a write
    /// failure, or the end of a graceful close.
    pub async fn closed(&self) { self.shared.closed.cancelled().await; }

    /// Close the connection gracefully and wait for the writer task to
    /// finish, returning why the connection ended.
    pub async fn join(mut self) -> CloseReason {
        self.close();
        if let Some(handle) = self.writer.take()
            && let Err(e) = handle.await
        {
            error!("writer task failed: id={}, error={e}", self.shared.id);
        }
        let teardown = self.shared.lock().destroy(CloseReason::Aborted);
        self.shared.after_teardown(teardown);
        self.close_reason().unwrap_or(CloseReason::Aborted)
    }
}

impl<T: Transport> Drop for Connection<T> {
    fn drop(&mut self) { self.close(); }
}

impl<T: Transport> std::fmt::Debug for Connection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.shared.id)
            .field("state", &self.state())
            .field("local_addr", &self.local_addr)
            .field("peer_addr", &self.peer_addr)
            .finish_non_exhaustive()
    }
}

fn lookup_addr<A>(id: ConnectionId, which: &str, addr: io::Result<A>) -> Option<A> {
    match addr {
        Ok(addr) => Some(addr),
        Err(e) => {
            warn!("Failed to retrieve {which} address: id={id}, error={e}");
            None
        }
    }
}
