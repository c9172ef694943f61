#![doc(html_root_url = "https://docs.rs/wireconn/latest")]
//! Public API for the `wireconn` library.
//!
//! This crate wraps a single byte-stream socket so that any number of
//! producers can queue outbound data without touching the socket directly.
//! A dedicated writer task drains a bounded queue; a peer that cannot keep
//! up is disconnected rather than allowed to stall producers.

pub mod config;
pub mod connection;
pub mod error;
pub mod hooks;
pub mod metrics;
pub mod transport;

pub use config::{ConnectionConfig, DEFAULT_WRITE_QUEUE_CAPACITY};
pub use connection::{CloseReason, Connection, ConnectionId, ConnectionState};
pub use error::ConnectionClosed;
pub use hooks::ConnectionHooks;
pub use metrics::{CONNECTIONS_ACTIVE, OVERFLOW_DESTROYS_TOTAL, WRITE_ERRORS_TOTAL};
pub use transport::{AbortOnClose, Transport};
