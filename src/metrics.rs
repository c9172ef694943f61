//! Metrics helpers for `wireconn`.
//!
//! With the `metrics` feature enabled these functions forward to the
//! [`metrics`](https://docs.rs/metrics) facade; otherwise they compile to
//! no-ops. Installing a recorder is left to the application.

/// Gauge tracking the number of live connections.
pub const CONNECTIONS_ACTIVE: &str = "wireconn_connections_active";
/// Counter of connections destroyed because their outbound queue was full.
pub const OVERFLOW_DESTROYS_TOTAL: &str = "wireconn_overflow_destroys_total";
/// Counter of connections torn down after a failed socket write.
pub const WRITE_ERRORS_TOTAL: &str = "wireconn_write_errors_total";

#[cfg(feature = "metrics")]
pub(crate) fn inc_connections() { metrics::gauge!(CONNECTIONS_ACTIVE).increment(1.0); }

#[cfg(feature = "metrics")]
pub(crate) fn dec_connections() { metrics::gauge!(CONNECTIONS_ACTIVE).decrement(1.0); }

#[cfg(feature = "metrics")]
pub(crate) fn inc_overflow_destroys() { metrics::counter!(OVERFLOW_DESTROYS_TOTAL).increment(1); }

#[cfg(feature = "metrics")]
pub(crate) fn inc_write_errors() { metrics::counter!(WRITE_ERRORS_TOTAL).increment(1); }

#[cfg(not(feature = "metrics"))]
pub(crate) fn inc_connections() {}

#[cfg(not(feature = "metrics"))]
pub(crate) fn dec_connections() {}

#[cfg(not(feature = "metrics"))]
pub(crate) fn inc_overflow_destroys() {}

#[cfg(not(feature = "metrics"))]
pub(crate) fn inc_write_errors() {}
