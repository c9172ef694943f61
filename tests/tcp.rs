//! Connections over real loopback TCP sockets.

use std::time::Duration;

use rstest::rstest;
use tokio::{io::AsyncWriteExt, time::timeout};
use wireconn::{CloseReason, Connection, ConnectionConfig, ConnectionHooks, ConnectionState};
use wireconn_testing::{TestResult, read_until_closed, tcp_pair};

#[rstest]
#[tokio::test]
async fn close_delivers_data_then_eof() -> TestResult {
    let (server, mut client) = tcp_pair().await?;
    let conn = Connection::new(server, 8);

    conn.write("hello, ");
    conn.copy_and_write(b"world");
    conn.close();

    let (bytes, reset) = read_until_closed(&mut client).await?;
    assert_eq!(bytes, b"hello, world");
    assert!(!reset, "graceful close should end with EOF");
    assert_eq!(conn.join().await, CloseReason::Graceful);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn destroy_closes_the_socket() -> TestResult {
    let (server, mut client) = tcp_pair().await?;
    let conn = Connection::new(server, 8);

    conn.write("discarded");
    conn.destroy();

    let (bytes, reset) = read_until_closed(&mut client).await?;
    assert!(bytes.is_empty());
    assert!(reset, "destroy should reset the peer, not send EOF");
    assert_eq!(conn.join().await, CloseReason::Aborted);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn destroy_with_nothing_queued_resets_peer() -> TestResult {
    let (server, mut client) = tcp_pair().await?;
    let conn = Connection::new(server, 8);

    conn.destroy();
    assert!(conn.state().is_destroyed());
    timeout(Duration::from_secs(5), conn.closed()).await?;
    assert_eq!(conn.join().await, CloseReason::Aborted);

    let (bytes, reset) = read_until_closed(&mut client).await?;
    assert!(bytes.is_empty());
    assert!(reset, "peer saw a clean EOF instead of a reset");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn destroy_without_abort_ends_with_eof() -> TestResult {
    let (server, mut client) = tcp_pair().await?;
    let conn = Connection::with_config(
        server,
        ConnectionConfig::default().abort_on_destroy(false),
        ConnectionHooks::default(),
    );

    conn.destroy();
    assert_eq!(conn.join().await, CloseReason::Aborted);

    let (bytes, reset) = read_until_closed(&mut client).await?;
    assert!(bytes.is_empty());
    assert!(!reset);
    Ok(())
}

#[rstest]
#[tokio::test]
async fn addresses_match_the_socket() -> TestResult {
    let (server, client) = tcp_pair().await?;
    let expected_local = server.local_addr()?;
    let expected_peer = server.peer_addr()?;
    let conn = Connection::new(server, 8);

    assert_eq!(conn.local_addr(), Some(expected_local));
    assert_eq!(conn.remote_addr(), Some(expected_peer));
    assert_eq!(conn.remote_addr(), Some(client.local_addr()?));
    Ok(())
}

#[rstest]
#[tokio::test]
async fn echo_round_trip() -> TestResult {
    let (server, mut client) = tcp_pair().await?;
    let conn = Connection::new(server, 8);

    client.write_all(b"ping").await?;
    let mut buf = [0u8; 16];
    let n = timeout(Duration::from_secs(5), conn.read(&mut buf)).await??;
    conn.copy_and_write(&buf[..n]);
    conn.close();

    let (bytes, _) = read_until_closed(&mut client).await?;
    assert_eq!(bytes, b"ping");
    Ok(())
}

#[rstest]
#[tokio::test]
async fn read_reports_peer_eof() -> TestResult {
    let (server, client) = tcp_pair().await?;
    let conn = Connection::new(server, 8);
    drop(client);

    let mut buf = [0u8; 16];
    let n = timeout(Duration::from_secs(5), conn.read(&mut buf)).await??;
    assert_eq!(n, 0);
    assert_eq!(conn.state(), ConnectionState::Open);
    Ok(())
}
