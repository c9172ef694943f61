//! Connection configuration types.
//!
//! [`ConnectionConfig`] collects the tunables applied when a
//! [`Connection`](crate::Connection) is constructed.

/// Outbound queue capacity used by [`ConnectionConfig::default`].
pub const DEFAULT_WRITE_QUEUE_CAPACITY: usize = 100;

/// Settings applied to a connection at construction time.
///
/// # Examples
///
/// ```
/// use wireconn::ConnectionConfig;
///
/// let config = ConnectionConfig::default()
///     .write_queue_capacity(16)
///     .abort_on_destroy(false);
/// assert_eq!(config.queue_capacity(), 16);
/// assert!(!config.aborts_on_destroy());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionConfig {
    write_queue_capacity: usize,
    abort_on_destroy: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            write_queue_capacity: DEFAULT_WRITE_QUEUE_CAPACITY,
            abort_on_destroy: true,
        }
    }
}

impl ConnectionConfig {
    /// Set how many buffers may wait for the writer task before the
    /// connection is considered unable to keep up.
    ///
    /// A capacity of zero is accepted; such a connection is destroyed by the
    /// first write it receives.
    ///
    /// # Examples
    ///
    /// ```
    /// use wireconn::ConnectionConfig;
    ///
    /// let config = ConnectionConfig::default().write_queue_capacity(0);
    /// assert_eq!(config.queue_capacity(), 0);
    /// ```
    #[must_use]
    pub fn write_queue_capacity(mut self, capacity: usize) -> Self {
        self.write_queue_capacity = capacity;
        self
    }

    /// Control whether destroying the connection discards unsent data at the
    /// socket level (a zero linger) or falls back to a plain close.
    ///
    /// Transports without an abort capability always use a plain close.
    #[must_use]
    pub fn abort_on_destroy(mut self, enabled: bool) -> Self {
        self.abort_on_destroy = enabled;
        self
    }

    /// Configured outbound queue capacity.
    #[must_use]
    pub fn queue_capacity(&self) -> usize { self.write_queue_capacity }

    /// Whether destroy requests an abortive close.
    #[must_use]
    pub fn aborts_on_destroy(&self) -> bool { self.abort_on_destroy }
}
