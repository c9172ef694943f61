//! The writer task draining a connection's outbound queue.
//!
//! Exactly one writer exists per connection. It is the only code that writes
//! to the stream and the only code that closes the write half.

use std::{io, sync::Arc};

use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};
use tracing::debug;

use super::{CloseReason, counter::ActiveConnection, outbound::Item, shared::Shared};
use crate::transport::AbortOnClose;

/// How the drain loop ended.
enum DrainEnd {
    /// The stop marker was reached.
    Stopped,
    /// A stream write failed.
    Failed(io::Error),
    /// Teardown was signalled by destroy or overflow.
    Cancelled,
}

pub(super) struct WriterTask<W, R> {
    writer: W,
    rx: mpsc::Receiver<Item>,
    shared: Arc<Shared<R>>,
    abort_on_destroy: bool,
    _active: ActiveConnection,
}

impl<W, R> WriterTask<W, R>
where
    W: AsyncWrite + AbortOnClose + Unpin,
{
    pub(super) fn new(
        writer: W,
        rx: mpsc::Receiver<Item>,
        shared: Arc<Shared<R>>,
        abort_on_destroy: bool,
        active: ActiveConnection,
    ) -> Self {
        Self {
            writer,
            rx,
            shared,
            abort_on_destroy,
            _active: active,
        }
    }

    /// Drain the queue, close the stream, and record the terminal state.
    pub(super) async fn run(mut self) {
        let id = self.shared.id;
        let end = self.drain().await;
        let reason = match &end {
            DrainEnd::Stopped => {
                if let Err(e) = self.writer.shutdown().await {
                    debug!(%id, error = %e, "stream shutdown failed");
                }
                CloseReason::Graceful
            }
            DrainEnd::Failed(e) => {
                debug!(%id, error = %e, "stream write failed");
                crate::metrics::inc_write_errors();
                CloseReason::WriteFailed(e.kind())
            }
            DrainEnd::Cancelled => CloseReason::Aborted,
        };

        let Self {
            writer,
            rx,
            shared,
            abort_on_destroy,
            ..
        } = self;
        if abort_on_destroy && matches!(end, DrainEnd::Cancelled) {
            if let Err(e) = writer.abort() {
                debug!(%id, error = %e, "failed to request abortive close");
            }
        } else {
            drop(writer);
        }
        drop(rx);

        let teardown = shared.lock().destroy(reason);
        shared.after_teardown(teardown);
    }

    async fn drain(&mut self) -> DrainEnd {
        loop {
            let item = tokio::select! {
                biased;
                () = self.shared.closed.cancelled() => return DrainEnd::Cancelled,
                item = self.rx.recv() => item,
            };
            let buf = match item {
                Some(Item::Data(buf)) => buf,
                Some(Item::Stop) => return DrainEnd::Stopped,
                None => return DrainEnd::Cancelled,
            };
            let written = tokio::select! {
                biased;
                () = self.shared.closed.cancelled() => return DrainEnd::Cancelled,
                res = write_buf(&mut self.writer, &buf) => res,
            };
            if let Err(e) = written {
                return DrainEnd::Failed(e);
            }
        }
    }
}

async fn write_buf<W: AsyncWrite + Unpin>(writer: &mut W, buf: &[u8]) -> io::Result<()> {
    writer.write_all(buf).await?;
    writer.flush().await
}
