//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately stopping `listener.accept()` — no new connections are made.
//! 2. Letting every in-flight connection task run to completion.
//! 3. Returning from [`Server::serve`], which lets `main` exit cleanly.
//!
//! Set `terminationGracePeriodSeconds` in your pod spec to a value longer
//! than your slowest request. 30 s is a reasonable default for most APIs.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite, BufReader};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::Error;
use crate::handler::Handler;
use crate::request::{Parsed, read_request};
use crate::response::{Response, ResponseWriter};

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Configures the server to bind to `addr` when [`serve`](Server::serve)
    /// is called.
    ///
    /// # Panics
    ///
    /// Panics if `addr` is not a valid `host:port` string.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use bitacora::Server;
    /// let server = Server::bind("0.0.0.0:3000");
    /// ```
    pub fn bind(addr: &str) -> Self {
        let addr: SocketAddr = addr.parse().expect("invalid socket address");
        Self { addr }
    }

    /// Starts accepting connections and dispatching them through `app`.
    ///
    /// `app` is any [`Handler`] — typically a [`Router`](crate::Router),
    /// usually wrapped in [`RequestLogger`](crate::RequestLogger). Returns
    /// only after a full graceful shutdown (SIGTERM or Ctrl-C, followed by
    /// all in-flight connections completing).
    pub async fn serve(self, app: impl Handler) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;

        // Arc so the handler can be shared across concurrent connection
        // tasks without copying it.
        let app: Arc<dyn Handler> = Arc::new(app);

        info!(addr = %self.addr, "bitacora listening");

        // JoinSet tracks every spawned connection task so we can wait for
        // them all to finish during graceful shutdown.
        let mut tasks = tokio::task::JoinSet::new();

        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // `biased` makes select! check arms top-to-bottom instead of
                // randomly. We check shutdown first so a SIGTERM immediately
                // stops accepting new connections, even if more are queued.
                biased;

                () = &mut shutdown => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = Arc::clone(&app);
                    tasks.spawn(async move {
                        if let Err(e) = serve_connection(stream, remote, app).await {
                            error!(peer = %remote, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        // Drain: wait for every in-flight connection to finish before we return.
        while tasks.join_next().await.is_some() {}

        info!("bitacora stopped");
        Ok(())
    }
}

// ── Connection loop ──────────────────────────────────────────────────────────

/// Serves requests off one connection until the client closes it, asks to
/// close it, or sends something unservable.
async fn serve_connection<S: AsyncRead + AsyncWrite + Unpin>(
    stream: S,
    remote: SocketAddr,
    app: Arc<dyn Handler>,
) -> std::io::Result<()> {
    let (read_half, mut write_half) = tokio::io::split(stream);
    let mut reader = BufReader::new(read_half);

    loop {
        match read_request(&mut reader, remote).await? {
            Parsed::Eof => break,
            Parsed::Reject(status) => {
                let mut resp = Response::new();
                resp.header("connection", "close");
                resp.write_header(status);
                resp.write_to(&mut write_half).await?;
                break;
            }
            Parsed::Request(req) => {
                let close = req.wants_close();
                let mut resp = Response::new();
                app.serve(req, &mut resp).await;
                resp.write_to(&mut write_half).await?;
                if close {
                    break;
                }
            }
        }
    }
    Ok(())
}

// ── Shutdown signal ──────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** (sent by `kubectl` and the
/// Kubernetes control plane) and **SIGINT** (Ctrl-C, for local dev).
/// On Windows only Ctrl-C is available.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    // `pending()` never resolves — on non-Unix platforms the SIGTERM arm is
    // effectively disabled.
    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;
    use crate::middleware::log::{ReqServed, ReqStart, RequestLogger, Sink};
    use crate::request::Request;
    use crate::router::Router;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    struct Pong;

    #[async_trait]
    impl Handler for Pong {
        async fn serve(&self, _req: Request, w: &mut (dyn ResponseWriter + Send)) {
            w.write(b"pong");
        }
    }

    #[derive(Default)]
    struct CountingSink {
        starts: Mutex<usize>,
        served: Mutex<Vec<u16>>,
    }

    impl Sink for CountingSink {
        fn req_start(&self, _r: ReqStart<'_>) {
            *self.starts.lock().unwrap() += 1;
        }
        fn req_served(&self, r: ReqServed<'_>) {
            self.served.lock().unwrap().push(r.status);
        }
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:4000".parse().unwrap()
    }

    async fn roundtrip(app: impl Handler, raw: &[u8]) -> String {
        let (mut client, server) = tokio::io::duplex(4096);
        let task = tokio::spawn(serve_connection(server, peer(), Arc::new(app) as Arc<dyn Handler>));

        client.write_all(raw).await.unwrap();
        client.shutdown().await.unwrap();

        let mut out = Vec::new();
        client.read_to_end(&mut out).await.unwrap();
        task.await.unwrap().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn serves_a_routed_request_end_to_end() {
        let app = Router::new().get("/ping", Pong);
        let out = roundtrip(app, b"GET /ping HTTP/1.1\r\nConnection: close\r\n\r\n").await;
        assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(out.ends_with("\r\n\r\npong"));
    }

    #[tokio::test]
    async fn logs_both_records_per_request() {
        let sink = Arc::new(CountingSink::default());
        let app = RequestLogger::new(Arc::clone(&sink), "test-app")
            .wrap(Router::new().get("/ping", Pong));

        let raw = b"GET /ping HTTP/1.1\r\n\r\nGET /nope HTTP/1.1\r\nConnection: close\r\n\r\n";
        let out = roundtrip(app, raw).await;

        // Two requests on one keep-alive connection, two response heads.
        assert_eq!(out.matches("HTTP/1.1 ").count(), 2);
        assert!(out.contains("HTTP/1.1 404 Not Found\r\n"));

        assert_eq!(*sink.starts.lock().unwrap(), 2);
        assert_eq!(*sink.served.lock().unwrap(), vec![200, 404]);
    }

    #[tokio::test]
    async fn unservable_bytes_get_a_400_and_a_closed_connection() {
        let app = Router::new().on(Method::Get, "/ping", Pong);
        let out = roundtrip(app, b"not http at all\r\n\r\n").await;
        assert!(out.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(out.contains("connection: close\r\n"));
    }
}
