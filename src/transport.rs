//! Stream capabilities required by a [`Connection`](crate::Connection).
//!
//! A [`Transport`] is any duplex byte stream that can be split into
//! independently owned read and write halves and report its endpoint
//! addresses. Write halves may additionally implement an abortive close via
//! [`AbortOnClose`]; the default implementation just drops the half, so
//! transports without such a notion degrade to a plain close.

use std::{fmt, io, time::Duration};

use socket2::SockRef;
use tokio::{
    io::{AsyncRead, AsyncWrite, WriteHalf},
    net::{TcpStream, tcp},
};

/// Optional abortive-close capability of a write half.
pub trait AbortOnClose: Sized {
    /// Release the write half so that the socket discards unsent data and
    /// resets the peer once the connection's read half is also gone, instead
    /// of signalling a clean end of stream.
    ///
    /// The default drops the half, which is a plain close.
    ///
    /// # Errors
    ///
    /// Returns any error raised while configuring the socket. The half is
    /// released either way.
    fn abort(self) -> io::Result<()> {
        drop(self);
        Ok(())
    }
}

/// A duplex byte stream owned by a connection.
pub trait Transport: Send + 'static {
    /// Address type reported for both endpoints.
    type Addr: Clone + fmt::Debug + Send + Sync + 'static;
    /// Half used by [`Connection::read`](crate::Connection::read).
    type ReadHalf: AsyncRead + Send + Unpin + 'static;
    /// Half moved into the writer task.
    type WriteHalf: AsyncWrite + AbortOnClose + Send + Unpin + 'static;

    /// Address of the local endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the address lookup fails.
    fn local_addr(&self) -> io::Result<Self::Addr>;

    /// Address of the remote endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the address lookup fails.
    fn peer_addr(&self) -> io::Result<Self::Addr>;

    /// Split the stream into owned read and write halves.
    fn into_split(self) -> (Self::ReadHalf, Self::WriteHalf);
}

impl Transport for TcpStream {
    type Addr = std::net::SocketAddr;
    type ReadHalf = tcp::OwnedReadHalf;
    type WriteHalf = tcp::OwnedWriteHalf;

    fn local_addr(&self) -> io::Result<Self::Addr> { TcpStream::local_addr(self) }

    fn peer_addr(&self) -> io::Result<Self::Addr> { TcpStream::peer_addr(self) }

    fn into_split(self) -> (Self::ReadHalf, Self::WriteHalf) { TcpStream::into_split(self) }
}

impl AbortOnClose for tcp::OwnedWriteHalf {
    fn abort(self) -> io::Result<()> {
        let stream: &TcpStream = self.as_ref();
        let linger = SockRef::from(stream).set_linger(Some(Duration::ZERO));
        // Dropping the half would send FIN; forgetting it leaves the close to
        // the read half, which then resets the peer.
        self.forget();
        linger
    }
}

#[cfg(unix)]
impl Transport for tokio::net::UnixStream {
    type Addr = tokio::net::unix::SocketAddr;
    type ReadHalf = tokio::net::unix::OwnedReadHalf;
    type WriteHalf = tokio::net::unix::OwnedWriteHalf;

    fn local_addr(&self) -> io::Result<Self::Addr> { tokio::net::UnixStream::local_addr(self) }

    fn peer_addr(&self) -> io::Result<Self::Addr> { tokio::net::UnixStream::peer_addr(self) }

    fn into_split(self) -> (Self::ReadHalf, Self::WriteHalf) {
        tokio::net::UnixStream::into_split(self)
    }
}

// Unix domain sockets have no linger semantics.
#[cfg(unix)]
impl AbortOnClose for tokio::net::unix::OwnedWriteHalf {}

/// Halves produced by [`tokio::io::split`] close plainly.
impl<T> AbortOnClose for WriteHalf<T> {}

#[cfg(test)]
mod tests {
    use socket2::SockRef;
    use tokio::{
        io::AsyncReadExt,
        net::{TcpListener, TcpStream},
    };

    use super::*;

    #[tokio::test]
    async fn tcp_abort_resets_peer() -> io::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let client = TcpStream::connect(addr).await?;
        let (mut server, _) = listener.accept().await?;

        assert_eq!(Transport::peer_addr(&client)?, addr);
        let (read, write) = Transport::into_split(client);
        write.abort()?;

        let stream: &TcpStream = read.as_ref();
        assert_eq!(SockRef::from(stream).linger()?, Some(Duration::ZERO));
        drop(read);

        let mut buf = [0u8; 8];
        let err = server
            .read(&mut buf)
            .await
            .expect_err("peer should observe a reset, not EOF");
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        Ok(())
    }

    #[tokio::test]
    async fn plain_close_ends_with_eof() -> io::Result<()> {
        let (local, mut remote) = tokio::io::duplex(16);
        let (read, write) = tokio::io::split(local);
        write.abort()?;

        let mut buf = [0u8; 8];
        drop(read);
        assert_eq!(remote.read(&mut buf).await?, 0);
        Ok(())
    }
}
