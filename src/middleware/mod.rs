//! Middleware layer.
//!
//! Middleware wraps a [`Handler`](crate::Handler) and is itself a handler,
//! so layers compose by plain nesting and the server never knows the
//! difference. Because the router is also a handler, one `wrap` call covers
//! the whole application.
//!
//! The built-in middleware is [`log::RequestLogger`]: structured access logs
//! with per-request latency and the response status actually sent, observed
//! through [`observe::ResponseObserver`].

pub mod log;
pub mod observe;

pub use log::{Logged, ReqServed, ReqStart, RequestLogger, Sink, TracingSink};
pub use observe::ResponseObserver;
