//! # bitacora
//!
//! A minimal HTTP framework for Rust services behind a reverse proxy, with
//! one opinion baked in: every request leaves a structured access-log trail.
//!
//! ## The contract
//!
//! nginx handles TLS, rate limiting, slow clients, and body-size limits.
//! bitacora does not — by design. The proxy does proxy things. The framework
//! does framework things. What the proxy cannot do for you is tell you, per
//! request, what your application actually did — that is the part bitacora
//! owns:
//!
//! - **Go-style handlers** — a handler receives a [`Request`] and a
//!   [`ResponseWriter`]; it writes a status and bytes, nothing is returned
//! - **Structured access logs** — [`RequestLogger`] brackets every request
//!   with a `req_start` and a `req_served` record carrying the observed
//!   status and sub-millisecond latency
//! - **Radix-tree routing** — O(path-length) lookup via [`matchit`]
//! - **Graceful shutdown** — SIGTERM / Ctrl-C, drains in-flight connections
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use bitacora::{
//!     Handler, Request, RequestLogger, ResponseWriter, Router, Server, TracingSink, health,
//! };
//!
//! struct Ping;
//!
//! #[async_trait]
//! impl Handler for Ping {
//!     async fn serve(&self, _req: Request, w: &mut (dyn ResponseWriter + Send)) {
//!         w.write(b"pong");
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     let app = Router::new()
//!         .get("/ping", Ping)
//!         .get("/healthz", health::Liveness)
//!         .get("/readyz", health::Readiness);
//!
//!     let app = RequestLogger::new(TracingSink, "my-app-name").wrap(app);
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//! ```
//!
//! Every request served by the program above produces two info-level records:
//!
//! ```text
//! req_start   req_id="" uri=/ping method=GET remote=10.0.0.7:51034
//! req_served  req_id="" status=200 method=GET uri=/ping remote=10.0.0.7:51034 latency="0.1834 ms" app=my-app-name
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;

pub mod health;
pub mod middleware;

pub use error::Error;
pub use handler::Handler;
pub use method::Method;
pub use middleware::{Logged, ReqServed, ReqStart, RequestLogger, ResponseObserver, Sink, TracingSink};
pub use request::Request;
pub use response::{Response, ResponseWriter};
pub use router::Router;
pub use server::Server;
