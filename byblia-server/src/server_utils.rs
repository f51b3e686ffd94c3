use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use socket2::{Domain, Protocol, Socket, TcpKeepalive, Type};
use tokio::signal;
use tracing::info;

use byblia_types::models::config::ServerConfig;

pub async fn create_listener(config: &ServerConfig) -> Result<tokio::net::TcpListener> {
    let bind_addr = config.bind_address();
    let addr: SocketAddr = tokio::net::lookup_host(&bind_addr)
        .await
        .with_context(|| format!("Invalid bind address '{}'", bind_addr))?
        .next()
        .with_context(|| format!("Bind address '{}' did not resolve", bind_addr))?;

    let domain = if addr.is_ipv4() { Domain::IPV4 } else { Domain::IPV6 };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    // Accepted connections inherit keep-alive from the listening socket.
    socket.set_tcp_keepalive(
        &TcpKeepalive::new().with_time(Duration::from_secs(config.keep_alive_secs.max(1))),
    )?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(config.backlog)?;

    info!("🔌 Bound {} (backlog {}, keep-alive {}s)", addr, config.backlog, config.keep_alive_secs);

    Ok(tokio::net::TcpListener::from_std(socket.into())?)
}

#[allow(
    clippy::expect_used,
    reason = "Signal handlers are critical infrastructure, panic is appropriate on failure"
)]
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("🛑 Received Ctrl+C, initiating graceful shutdown..."),
        () = terminate => info!("🛑 Received SIGTERM, initiating graceful shutdown..."),
    }

    info!("⏳ Draining in-flight streams...");
}
