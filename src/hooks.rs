//! Observer hooks invoked by a connection.
//!
//! [`ConnectionHooks`] stores optional callbacks run when a connection is torn
//! down, while [`ConnectionObserver`] is the trait applications implement to
//! receive the same events from a single shared object.
//!
//! Hooks run on whichever thread triggered the event: the caller of
//! [`Connection::write`](crate::Connection::write) for overflows, or the
//! writer task for graceful and failed closes. They never run while the
//! connection's internal lock is held, so calling back into the connection
//! from a hook is safe.

use std::sync::Arc;

use crate::connection::{CloseReason, ConnectionId};

/// Trait receiving connection lifecycle events.
///
/// ```rust
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// use wireconn::{
///     CloseReason,
///     ConnectionId,
///     hooks::ConnectionObserver,
/// };
///
/// #[derive(Default)]
/// struct OverflowCounter(AtomicUsize);
///
/// impl ConnectionObserver for OverflowCounter {
///     fn on_overflow(&self, _id: ConnectionId, _capacity: usize) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
/// ```
pub trait ConnectionObserver: Send + Sync + 'static {
    /// Called when a write found the outbound queue full and the connection
    /// was destroyed as a result.
    fn on_overflow(&self, _id: ConnectionId, _capacity: usize) {}

    /// Called exactly once, when the connection reaches its terminal state.
    fn on_close(&self, _id: ConnectionId, _reason: CloseReason) {}
}

/// Type alias for the `on_overflow` callback.
type OnOverflowHook = Box<dyn Fn(ConnectionId, usize) + Send + Sync + 'static>;

/// Type alias for the `on_close` callback.
type OnCloseHook = Box<dyn Fn(ConnectionId, CloseReason) + Send + Sync + 'static>;

/// Callbacks used by a connection.
#[derive(Default)]
pub struct ConnectionHooks {
    /// Invoked when the outbound queue overflows.
    pub on_overflow: Option<OnOverflowHook>,
    /// Invoked once the connection is destroyed.
    pub on_close: Option<OnCloseHook>,
}

impl ConnectionHooks {
    /// Run the `on_overflow` hook if registered.
    pub fn on_overflow(&self, id: ConnectionId, capacity: usize) {
        if let Some(hook) = &self.on_overflow {
            hook(id, capacity);
        }
    }

    /// Run the `on_close` hook if registered.
    pub fn on_close(&self, id: ConnectionId, reason: CloseReason) {
        if let Some(hook) = &self.on_close {
            hook(id, reason);
        }
    }

    /// Construct hooks from a [`ConnectionObserver`] implementation.
    pub fn from_observer<O>(observer: &Arc<O>) -> Self
    where
        O: ConnectionObserver + ?Sized,
    {
        let observer_overflow = Arc::clone(observer);
        let overflow = Box::new(move |id: ConnectionId, capacity: usize| {
            observer_overflow.on_overflow(id, capacity);
        }) as OnOverflowHook;

        let observer_close = Arc::clone(observer);
        let close = Box::new(move |id: ConnectionId, reason: CloseReason| {
            observer_close.on_close(id, reason);
        }) as OnCloseHook;

        Self {
            on_overflow: Some(overflow),
            on_close: Some(close),
        }
    }
}

impl std::fmt::Debug for ConnectionHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHooks")
            .field("on_overflow", &self.on_overflow.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}
