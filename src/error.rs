//! Error types surfaced by connections.
//!
//! Writes are fire-and-forget and never report failures; the only error a
//! caller observes is on the read path, where transport errors pass through
//! unchanged and reads after teardown yield [`ConnectionClosed`].

use std::io;

use thiserror::Error;

/// The connection was closed or destroyed before the read could complete.
///
/// Surfaced as the inner error of an [`io::Error`] with kind
/// [`io::ErrorKind::NotConnected`].
///
/// # Examples
///
/// ```
/// use std::io;
///
/// use wireconn::ConnectionClosed;
///
/// let err: io::Error = ConnectionClosed.into();
/// assert_eq!(err.kind(), io::ErrorKind::NotConnected);
/// assert!(wireconn::error::is_connection_closed(&err));
/// ```
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("connection closed")]
pub struct ConnectionClosed;

impl From<ConnectionClosed> for io::Error {
    fn from(error: ConnectionClosed) -> Self { io::Error::new(io::ErrorKind::NotConnected, error) }
}

/// Returns `true` if `error` reports a read on a torn-down connection.
#[must_use]
pub fn is_connection_closed(error: &io::Error) -> bool {
    error
        .get_ref()
        .is_some_and(|inner| inner.is::<ConnectionClosed>())
}
