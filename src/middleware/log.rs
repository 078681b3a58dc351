//! Structured access logging.
//!
//! [`RequestLogger`] brackets every request with two info-level records:
//! `req_start` before the wrapped handler runs and `req_served` after it
//! returns, the latter carrying the status actually sent and the elapsed
//! time. The field names and the two event names are a stable contract for
//! downstream log consumers — dashboards and alerts key on them.
//!
//! The logger is constructed once at startup and is safe to share across
//! concurrent requests: per-request state lives on the stack of each call,
//! and the [`Sink`] is required to be `Send + Sync`.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::handler::Handler;
use crate::middleware::observe::ResponseObserver;
use crate::request::Request;
use crate::response::ResponseWriter;

// ── Records and the sink ─────────────────────────────────────────────────────

/// Fields of a `req_start` record.
pub struct ReqStart<'a> {
    pub req_id: &'a str,
    pub uri: &'a str,
    pub method: &'a str,
    pub remote: &'a str,
}

/// Fields of a `req_served` record.
pub struct ReqServed<'a> {
    pub req_id: &'a str,
    pub status: u16,
    pub method: &'a str,
    pub uri: &'a str,
    pub remote: &'a str,
    /// Elapsed wall-clock time, formatted `"12.3456 ms"`.
    pub latency: &'a str,
    pub app: &'a str,
}

/// Destination for access-log records.
///
/// The sink is the one resource shared by every in-flight request, hence the
/// `Send + Sync` bound — internal synchronization is the sink's job, not the
/// logger's. [`TracingSink`] is the production implementation; tests use an
/// in-memory one.
pub trait Sink: Send + Sync {
    fn req_start(&self, record: ReqStart<'_>);
    fn req_served(&self, record: ReqServed<'_>);
}

/// Forwarding impl so callers can keep a handle to their sink.
impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn req_start(&self, record: ReqStart<'_>) {
        (**self).req_start(record);
    }
    fn req_served(&self, record: ReqServed<'_>) {
        (**self).req_served(record);
    }
}

/// A [`Sink`] that emits each record as a [`tracing`] info event, one tracing
/// field per record field, under the `access` target.
pub struct TracingSink;

impl Sink for TracingSink {
    fn req_start(&self, r: ReqStart<'_>) {
        tracing::info!(
            target: "access",
            req_id = r.req_id,
            uri = r.uri,
            method = r.method,
            remote = r.remote,
            "req_start"
        );
    }

    fn req_served(&self, r: ReqServed<'_>) {
        tracing::info!(
            target: "access",
            req_id = r.req_id,
            status = r.status,
            method = r.method,
            uri = r.uri,
            remote = r.remote,
            latency = r.latency,
            app = r.app,
            "req_served"
        );
    }
}

// ── RequestLogger ────────────────────────────────────────────────────────────

type Resolver = Arc<dyn Fn(&Request) -> String + Send + Sync>;

/// Access-log middleware factory.
///
/// Wrapping a handler yields a [`Logged`] handler that emits `req_start` /
/// `req_served` around every delegated call. One instance can wrap any
/// number of handlers; they share the sink and nothing else.
///
/// The request-id resolver correlates the two records with whatever id your
/// infrastructure uses. It must be pure and non-blocking; returning an empty
/// string means "no request id available" and is the default:
///
/// ```rust
/// use bitacora::{RequestLogger, Router, TracingSink};
///
/// let app = Router::new(); // routes elided
///
/// // No request-id infrastructure: req_id is logged as "".
/// let logged = RequestLogger::new(TracingSink, "my-app-name").wrap(app);
///
/// // Or resolve the id set by an upstream proxy:
/// let logger = RequestLogger::with_request_id(TracingSink, "my-app-name", |req| {
///     req.header("x-request-id").unwrap_or_default().to_owned()
/// });
/// ```
pub struct RequestLogger {
    sink: Arc<dyn Sink>,
    app: Arc<str>,
    resolver: Resolver,
}

impl RequestLogger {
    /// A logger with no request-id resolution: `req_id` is always `""`.
    pub fn new(sink: impl Sink + 'static, app: &str) -> Self {
        Self::with_request_id(sink, app, |_| String::new())
    }

    /// A logger that resolves a per-request correlation id.
    pub fn with_request_id(
        sink: impl Sink + 'static,
        app: &str,
        resolver: impl Fn(&Request) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            sink: Arc::new(sink),
            app: Arc::from(app),
            resolver: Arc::new(resolver),
        }
    }

    /// Wraps `handler` in access logging.
    pub fn wrap<H: Handler>(&self, handler: H) -> Logged<H> {
        Logged {
            inner: handler,
            sink: Arc::clone(&self.sink),
            app: Arc::clone(&self.app),
            resolver: Arc::clone(&self.resolver),
        }
    }
}

/// A handler wrapped by [`RequestLogger`].
pub struct Logged<H> {
    inner: H,
    sink: Arc<dyn Sink>,
    app: Arc<str>,
    resolver: Resolver,
}

#[async_trait]
impl<H: Handler> Handler for Logged<H> {
    async fn serve(&self, req: Request, w: &mut (dyn ResponseWriter + Send)) {
        let start = Instant::now();

        let req_id = (self.resolver)(&req);
        let method = req.method().as_str();
        let uri = req.target().to_owned();
        let remote = req.remote().to_string();

        self.sink.req_start(ReqStart {
            req_id: &req_id,
            uri: &uri,
            method,
            remote: &remote,
        });

        let mut observer = ResponseObserver::new(w);
        self.inner.serve(req, &mut observer).await;
        observer.finalize_if_unset();
        let status = observer.status();

        // If the handler panicked we never get here: the req_served record
        // is only emitted for requests that completed normally.
        let latency = format!("{:.4} ms", start.elapsed().as_secs_f64() * 1000.0);

        self.sink.req_served(ReqServed {
            req_id: &req_id,
            status,
            method,
            uri: &uri,
            remote: &remote,
            latency: &latency,
            app: &self.app,
        });
    }
}
