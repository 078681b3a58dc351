//! The handler trait.
//!
//! A handler is the unit everything else composes around: the router is a
//! handler, middleware wraps a handler and is itself a handler, and the
//! server serves whatever handler it is given. The trait is object-safe
//! (via [`async_trait`]) so a router can hold handlers of different concrete
//! types behind `Arc<dyn Handler>` and middleware can decorate any of them.
//!
//! Handlers write their response instead of returning one. The writer is a
//! `&mut dyn` trait object on purpose: a decorator can substitute its own
//! [`ResponseWriter`](crate::ResponseWriter) without the handler noticing.

use async_trait::async_trait;

use crate::request::Request;
use crate::response::ResponseWriter;

/// An HTTP request handler.
///
/// ```rust
/// use async_trait::async_trait;
/// use bitacora::{Handler, Request, ResponseWriter};
///
/// struct GetUser;
///
/// #[async_trait]
/// impl Handler for GetUser {
///     async fn serve(&self, req: Request, w: &mut (dyn ResponseWriter + Send)) {
///         let id = req.param("id").unwrap_or("unknown");
///         w.header("content-type", "application/json");
///         w.write(format!(r#"{{"id":"{id}"}}"#).as_bytes());
///     }
/// }
/// ```
///
/// A handler that writes nothing produces an empty `200 OK` — the transport
/// supplies the implicit default, exactly like `net/http` style servers.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn serve(&self, req: Request, w: &mut (dyn ResponseWriter + Send));
}
