//! Echo server demonstrating `wireconn` usage.
//!
//! Every accepted socket is wrapped in a [`Connection`]; whatever the peer
//! sends is queued straight back. Peers that stop reading are disconnected
//! once their outbound queue fills.

mod cli;

use std::net::SocketAddr;

use clap::Parser;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::task::TaskTracker;
use wireconn::{Connection, error::is_connection_closed};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Enable structured logging for the demo binary.
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();

    install_metrics(cli.metrics_listen)?;

    let listener = TcpListener::bind(cli.listen).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    let tracker = TaskTracker::new();
    loop {
        tokio::select! {
            biased;

            _ = tokio::signal::ctrl_c() => break,
            res = listener.accept() => match res {
                Ok((stream, _)) => {
                    tracker.spawn(echo(stream, cli.queue_capacity));
                }
                Err(e) => tracing::warn!(error = %e, "accept failed"),
            },
        }
    }

    tracker.close();
    tracker.wait().await;
    Ok(())
}

#[cfg(feature = "metrics")]
fn install_metrics(addr: Option<SocketAddr>) -> std::io::Result<()> {
    let Some(addr) = addr else { return Ok(()) };
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(std::io::Error::other)?;
    tracing::info!(%addr, "serving metrics");
    Ok(())
}

#[cfg(not(feature = "metrics"))]
fn install_metrics(addr: Option<SocketAddr>) -> std::io::Result<()> {
    if addr.is_some() {
        tracing::warn!("metrics support not compiled in; ignoring --metrics-listen");
    }
    Ok(())
}

async fn echo(stream: TcpStream, capacity: usize) {
    let conn = Connection::new(stream, capacity);
    let mut buf = vec![0u8; 4096];
    loop {
        match conn.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => conn.copy_and_write(&buf[..n]),
            Err(e) if is_connection_closed(&e) => break,
            Err(e) => {
                tracing::debug!(id = %conn.id(), error = %e, "read failed");
                conn.destroy();
                break;
            }
        }
    }
    let reason = conn.join().await;
    tracing::debug!(%reason, "echo finished");
}
