//! In-memory transports for driving a connection without sockets.
//!
//! [`memory_pair`] returns a [`MemoryTransport`] for the connection, the
//! peer end of the underlying [`DuplexStream`], and an [`AbortProbe`] that
//! reports whether the connection requested an abortive close.
//!
//! The duplex buffer size bounds how many unread bytes the connection can
//! push before its writes stall, which makes "slow peer" scenarios
//! deterministic.

use std::{
    io,
    net::{Ipv4Addr, SocketAddr},
    pin::Pin,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    task::{Context, Poll},
};

use tokio::io::{AsyncWrite, DuplexStream, ReadHalf, WriteHalf, duplex, split};
use wireconn::{AbortOnClose, Transport};

/// Fixed local address reported by [`MemoryTransport`].
pub const LOCAL_ADDR: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::LOCALHOST), 1);
/// Fixed peer address reported by [`MemoryTransport`].
pub const PEER_ADDR: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(Ipv4Addr::LOCALHOST), 2);

/// Reports whether an abortive close was requested on a transport.
#[derive(Clone, Debug, Default)]
pub struct AbortProbe(Arc<AtomicBool>);

impl AbortProbe {
    /// Returns `true` once the write half has been aborted.
    #[must_use]
    pub fn requested(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

/// Duplex-backed transport with fixed loopback addresses.
#[derive(Debug)]
pub struct MemoryTransport {
    stream: DuplexStream,
    probe: AbortProbe,
}

/// Write half of a [`MemoryTransport`] that records abort requests.
#[derive(Debug)]
pub struct RecordingWriteHalf {
    inner: WriteHalf<DuplexStream>,
    probe: AbortProbe,
}

impl AsyncWrite for RecordingWriteHalf {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

impl AbortOnClose for RecordingWriteHalf {
    fn abort(self) -> io::Result<()> {
        self.probe.0.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Transport for MemoryTransport {
    type Addr = SocketAddr;
    type ReadHalf = ReadHalf<DuplexStream>;
    type WriteHalf = RecordingWriteHalf;

    fn local_addr(&self) -> io::Result<Self::Addr> { Ok(LOCAL_ADDR) }

    fn peer_addr(&self) -> io::Result<Self::Addr> { Ok(PEER_ADDR) }

    fn into_split(self) -> (Self::ReadHalf, Self::WriteHalf) {
        let (read, write) = split(self.stream);
        (
            read,
            RecordingWriteHalf {
                inner: write,
                probe: self.probe,
            },
        )
    }
}

/// Create a connected in-memory transport and its peer.
///
/// `buffer` is the number of bytes the peer may leave unread before writes
/// from the connection stall.
#[must_use]
pub fn memory_pair(buffer: usize) -> (MemoryTransport, DuplexStream, AbortProbe) {
    let (local, remote) = duplex(buffer);
    let probe = AbortProbe::default();
    (
        MemoryTransport {
            stream: local,
            probe: probe.clone(),
        },
        remote,
        probe,
    )
}
