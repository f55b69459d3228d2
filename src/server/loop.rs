// Server loop module
// Accepts connections until the shutdown future resolves

use std::future::Future;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

/// Accept connections on `listener` until `shutdown` completes.
///
/// Connections already being served keep running on their own tasks; they
/// end with the runtime or their timeout.
pub async fn run_server_loop<S>(listener: TcpListener, state: Arc<AppState>, shutdown: S)
where
    S: Future<Output = ()>,
{
    let active_connections = Arc::new(AtomicUsize::new(0));
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => {
                logger::log_server_stop();
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fs::{FilteredFs, MemFs};
    use crate::render::{PageTemplate, RenderOptions, Renderer};
    use crate::server::create_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::sync::oneshot;

    fn state() -> Arc<AppState> {
        let mut config = Config::load_from("/nonexistent/txtview-config").unwrap();
        config.logging.access_log = false;
        let fs = FilteredFs::new(MemFs::new().with_file("/hello.txt", "hello there"));
        let renderer = Renderer::new(PageTemplate::embedded().unwrap(), RenderOptions::default());
        Arc::new(AppState::new(&config, Box::new(fs), renderer))
    }

    #[tokio::test]
    async fn test_serves_until_shutdown() {
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let server = tokio::spawn(run_server_loop(listener, state(), async {
            let _ = stop_rx.await;
        }));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /hello.txt HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = Vec::new();
        stream.read_to_end(&mut raw).await.unwrap();
        let text = String::from_utf8_lossy(&raw);
        assert!(text.starts_with("HTTP/1.1 200 OK"));
        assert!(text.contains("<p>hello there</p>"));

        stop_tx.send(()).unwrap();
        server.await.unwrap();
    }
}
