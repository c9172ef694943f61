//! Shared helpers for integration testing connections over real sockets.

use std::{
    net::{Ipv4Addr, SocketAddr},
    time::Duration,
};

use tokio::{
    io::{AsyncRead, AsyncReadExt},
    net::{TcpListener, TcpStream},
    time::timeout,
};

/// Shared result type for integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Upper bound on how long helpers wait for the peer side of a test.
const PEER_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a connected loopback TCP pair.
///
/// The first stream is the accepted (server) side, the second the client.
///
/// # Errors
///
/// Returns any IO error raised while binding, connecting, or accepting.
///
/// # Examples
///
/// ```rust,no_run
/// use wireconn_testing::{TestResult, tcp_pair};
///
/// async fn example() -> TestResult {
///     let (server, client) = tcp_pair().await?;
///     assert_eq!(server.peer_addr()?, client.local_addr()?);
///     Ok(())
/// }
/// ```
pub async fn tcp_pair() -> std::io::Result<(TcpStream, TcpStream)> {
    let listener = TcpListener::bind(SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0)).await?;
    let addr = listener.local_addr()?;
    let (client, accepted) = tokio::join!(TcpStream::connect(addr), listener.accept());
    let (server, _) = accepted?;
    Ok((server, client?))
}

/// Read from `peer` until it reports end of stream or an error.
///
/// Returns the bytes received and whether the stream ended with an error
/// (such as a reset) rather than a clean EOF.
///
/// # Errors
///
/// Returns an error if the peer does not close within five seconds.
pub async fn read_until_closed<R>(peer: &mut R) -> TestResult<(Vec<u8>, bool)>
where
    R: AsyncRead + Unpin,
{
    let mut out = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        match timeout(PEER_TIMEOUT, peer.read(&mut chunk)).await? {
            Ok(0) => return Ok((out, false)),
            Ok(n) => out.extend_from_slice(&chunk[..n]),
            Err(_) => return Ok((out, true)),
        }
    }
}
