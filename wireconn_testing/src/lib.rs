//! Utilities for exercising [`wireconn::Connection`] in tests.
//!
//! Provides in-memory transports whose write side can be throttled or
//! inspected, a loopback TCP pair helper, and a serialised log capture
//! fixture.
//!
//! ```rust
//! use wireconn::Connection;
//! use wireconn_testing::memory_pair;
//!
//! # async fn example() {
//! let (transport, _peer, probe) = memory_pair(64);
//! let conn = Connection::new(transport, 4);
//! conn.destroy();
//! # let _ = probe;
//! # }
//! ```

pub mod integration_helpers;
pub mod logging;
pub mod transport;

pub use integration_helpers::{TestResult, read_until_closed, tcp_pair};
pub use logging::{LoggerHandle, logger};
pub use transport::{AbortProbe, MemoryTransport, RecordingWriteHalf, memory_pair};
