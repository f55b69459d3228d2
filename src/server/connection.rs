// Connection handling module
// Accepts a single TCP connection and serves it with hyper

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Decrements the active connection counter when the connection task ends
struct ConnectionGuard(Arc<AtomicUsize>);

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Accept a connection, enforcing `performance.max_connections`
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment counter first, then check limit (prevents race condition)
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);
    let guard = ConnectionGuard(Arc::clone(conn_counter));

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state), guard);
}

/// Serve one connection on its own task, bounded by the configured timeout
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    guard: ConnectionGuard,
) {
    tokio::spawn(async move {
        let _guard = guard;
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let timeout_duration = connection_timeout(
            performance.keep_alive_timeout,
            performance.read_timeout,
            performance.write_timeout,
        );

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive_timeout > 0);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_debug(&format!(
                    "Connection from {peer_addr} closed after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }
    });
}

/// Upper bound on a connection's lifetime: the longest of the configured
/// timeouts, never zero
fn connection_timeout(keep_alive: u64, read: u64, write: u64) -> Duration {
    Duration::from_secs(keep_alive.max(read).max(write).max(1))
}
