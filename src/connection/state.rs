//! Connection lifecycle state management.

use std::{fmt, io};

use tokio_util::sync::CancellationToken;

use super::outbound::{Enqueue, Item, OutboundQueue};

/// Why a connection reached its terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseReason {
    /// [`Connection::close`](crate::Connection::close) was called and every
    /// queued buffer was flushed before the stream closed.
    Graceful,
    /// Writing to the stream failed; any remaining queued data was discarded.
    WriteFailed(io::ErrorKind),
    /// The outbound queue was full when a write or close was attempted.
    Overflow,
    /// [`Connection::destroy`](crate::Connection::destroy) was called.
    Aborted,
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Graceful => f.write_str("graceful"),
            Self::WriteFailed(kind) => write!(f, "write failed ({kind})"),
            Self::Overflow => f.write_str("outbound queue full"),
            Self::Aborted => f.write_str("aborted"),
        }
    }
}

/// Observable lifecycle state of a connection.
///
/// Writes are accepted only while [`Open`](Self::Open). `Closing` means a
/// graceful close is draining the queue; `Destroyed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// Writes are accepted.
    Open,
    /// A stop marker is queued; already queued data is still being written.
    Closing,
    /// The stream is closed or closing abortively; nothing more is written.
    Destroyed(CloseReason),
}

impl ConnectionState {
    /// Returns `true` while writes are accepted.
    #[must_use]
    pub fn is_open(self) -> bool { matches!(self, Self::Open) }

    /// Returns `true` once the connection has reached its terminal state.
    #[must_use]
    pub fn is_destroyed(self) -> bool { matches!(self, Self::Destroyed(_)) }

    /// The reason recorded when the connection was destroyed, if it has been.
    #[must_use]
    pub fn close_reason(self) -> Option<CloseReason> {
        match self {
            Self::Destroyed(reason) => Some(reason),
            Self::Open | Self::Closing => None,
        }
    }
}

/// State guarded by the connection lock: the lifecycle flag and the producer
/// side of the outbound queue.
///
/// Every transition happens through `&mut self`, so holding the lock
/// serialises enqueue decisions against close and destroy.
pub(super) struct Lifecycle {
    state: ConnectionState,
    queue: OutboundQueue,
    closed: CancellationToken,
}

impl Lifecycle {
    pub(super) fn new(queue: OutboundQueue, closed: CancellationToken) -> Self {
        Self {
            state: ConnectionState::Open,
            queue,
            closed,
        }
    }

    pub(super) fn state(&self) -> ConnectionState { self.state }

    pub(super) fn is_open(&self) -> bool { self.state.is_open() }

    /// Queue `item`, destroying the connection if the queue is full.
    ///
    /// Returns the close reason when this call destroyed the connection.
    pub(super) fn enqueue(&mut self, item: Item) -> Option<CloseReason> {
        match self.queue.try_enqueue(item) {
            Enqueue::Queued => None,
            Enqueue::Full => self.destroy(CloseReason::Overflow),
            // The writer has already exited and will record why.
            Enqueue::Disconnected => None,
        }
    }

    /// Queue the stop marker and stop accepting writes.
    pub(super) fn begin_close(&mut self) -> Option<CloseReason> {
        if !self.is_open() {
            return None;
        }
        let teardown = self.enqueue(Item::Stop);
        if self.is_open() {
            self.state = ConnectionState::Closing;
        }
        teardown
    }

    /// Move to the terminal state unless already there.
    ///
    /// Closes the queue and signals teardown so the writer task abandons any
    /// queued or in-flight data. Returns the reason when this call performed
    /// the transition.
    pub(super) fn destroy(&mut self, reason: CloseReason) -> Option<CloseReason> {
        if self.state.is_destroyed() {
            return None;
        }
        self.state = ConnectionState::Destroyed(reason);
        self.queue.close();
        self.closed.cancel();
        Some(reason)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use rstest::{fixture, rstest};
    use tokio::sync::mpsc;

    use super::*;

    #[fixture]
    fn lifecycle() -> (Lifecycle, mpsc::Receiver<Item>, CancellationToken) {
        let (queue, rx) = OutboundQueue::bounded(2);
        let token = CancellationToken::new();
        (Lifecycle::new(queue, token.clone()), rx, token)
    }

    #[rstest]
    fn close_moves_to_closing_and_queues_stop(
        lifecycle: (Lifecycle, mpsc::Receiver<Item>, CancellationToken),
    ) {
        let (mut lifecycle, mut rx, token) = lifecycle;
        assert_eq!(lifecycle.begin_close(), None);
        assert_eq!(lifecycle.state(), ConnectionState::Closing);
        assert!(matches!(rx.try_recv(), Ok(Item::Stop)));
        assert!(!token.is_cancelled());
    }

    #[rstest]
    fn close_is_a_noop_once_closing(
        lifecycle: (Lifecycle, mpsc::Receiver<Item>, CancellationToken),
    ) {
        let (mut lifecycle, mut rx, _token) = lifecycle;
        lifecycle.begin_close();
        lifecycle.begin_close();
        assert!(matches!(rx.try_recv(), Ok(Item::Stop)));
        assert!(rx.try_recv().is_err(), "second close must not queue");
    }

    #[rstest]
    fn overflow_destroys_and_cancels(
        lifecycle: (Lifecycle, mpsc::Receiver<Item>, CancellationToken),
    ) {
        let (mut lifecycle, _rx, token) = lifecycle;
        assert_eq!(lifecycle.enqueue(Item::Data(Bytes::from_static(b"a"))), None);
        assert_eq!(lifecycle.enqueue(Item::Data(Bytes::from_static(b"b"))), None);
        assert_eq!(
            lifecycle.enqueue(Item::Data(Bytes::from_static(b"c"))),
            Some(CloseReason::Overflow)
        );
        assert_eq!(
            lifecycle.state(),
            ConnectionState::Destroyed(CloseReason::Overflow)
        );
        assert!(token.is_cancelled());
    }

    #[rstest]
    fn close_on_full_queue_destroys(
        lifecycle: (Lifecycle, mpsc::Receiver<Item>, CancellationToken),
    ) {
        let (mut lifecycle, _rx, _token) = lifecycle;
        lifecycle.enqueue(Item::Data(Bytes::from_static(b"a")));
        lifecycle.enqueue(Item::Data(Bytes::from_static(b"b")));
        assert_eq!(lifecycle.begin_close(), Some(CloseReason::Overflow));
        assert_eq!(
            lifecycle.state(),
            ConnectionState::Destroyed(CloseReason::Overflow)
        );
    }

    #[rstest]
    fn first_destroy_reason_wins(
        lifecycle: (Lifecycle, mpsc::Receiver<Item>, CancellationToken),
    ) {
        let (mut lifecycle, _rx, _token) = lifecycle;
        assert_eq!(
            lifecycle.destroy(CloseReason::Aborted),
            Some(CloseReason::Aborted)
        );
        assert_eq!(lifecycle.destroy(CloseReason::Graceful), None);
        assert_eq!(lifecycle.state().close_reason(), Some(CloseReason::Aborted));
    }

    #[test]
    fn close_reason_display() {
        assert_eq!(CloseReason::Overflow.to_string(), "outbound queue full");
        assert_eq!(
            CloseReason::WriteFailed(io::ErrorKind::BrokenPipe).to_string(),
            "write failed (broken pipe)"
        );
    }
}
