//! Command line interface for the `wireconn` echo server.
//!
//! Shared with the build script, which renders the man page from it.

use std::net::SocketAddr;

use clap::Parser;

/// Command line arguments for the `wireconn` binary.
#[derive(Debug, Parser)]
#[command(
    name = "wireconn",
    version,
    about = "Echo server built on wireconn connections"
)]
pub struct Cli {
    /// Address to accept connections on.
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    pub listen: SocketAddr,

    /// Outbound chunks each connection may queue before it is dropped.
    #[arg(short = 'q', long, default_value_t = 100)]
    pub queue_capacity: usize,

    /// Serve Prometheus metrics on this address.
    #[arg(long)]
    pub metrics_listen: Option<SocketAddr>,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Cli;

    #[test]
    fn defaults_apply() {
        let cli = Cli::parse_from(["wireconn"]);
        assert_eq!(cli.listen.port(), 7878);
        assert_eq!(cli.queue_capacity, 100);
        assert!(cli.metrics_listen.is_none());
    }

    #[test]
    fn parses_listen_and_capacity() {
        let cli = Cli::parse_from([
            "wireconn",
            "--listen",
            "0.0.0.0:9000",
            "--queue-capacity",
            "8",
            "--metrics-listen",
            "127.0.0.1:9100",
        ]);
        assert_eq!(cli.listen.to_string(), "0.0.0.0:9000");
        assert_eq!(cli.queue_capacity, 8);
        assert_eq!(cli.metrics_listen.map(|a| a.port()), Some(9100));
    }
}
