//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. No magic, no reflection.
//! You register a path, you get a handler. The router is itself a
//! [`Handler`], so wrapping the whole application in middleware is one call.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use matchit::Router as MatchitRouter;

use crate::handler::Handler;
use crate::method::Method;
use crate::request::Request;
use crate::response::ResponseWriter;

/// The application router.
///
/// One radix tree per HTTP method. Build it once at startup; requests for
/// which no route matches are answered with an empty `404`. Each
/// registration returns `self` so calls chain naturally:
///
/// ```rust
/// # use async_trait::async_trait;
/// # use bitacora::{Handler, Method, Request, ResponseWriter, Router};
/// # struct GetUser;
/// # #[async_trait]
/// # impl Handler for GetUser {
/// #     async fn serve(&self, _req: Request, _w: &mut (dyn ResponseWriter + Send)) {}
/// # }
/// # struct CreateUser;
/// # #[async_trait]
/// # impl Handler for CreateUser {
/// #     async fn serve(&self, _req: Request, _w: &mut (dyn ResponseWriter + Send)) {}
/// # }
/// let app = Router::new()
///     .get("/users/{id}", GetUser)
///     .post("/users", CreateUser);
/// ```
pub struct Router {
    routes: HashMap<Method, MatchitRouter<Arc<dyn Handler>>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route pattern. Routes are registered
    /// at startup, so a bad pattern fails the process before it serves.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, Arc::new(handler))
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn put(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Put, path, handler)
    }

    pub fn patch(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Patch, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }

    fn lookup(
        &self,
        method: Method,
        path: &str,
    ) -> Option<(Arc<dyn Handler>, HashMap<String, String>)> {
        let tree = self.routes.get(&method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for Router {
    async fn serve(&self, mut req: Request, w: &mut (dyn ResponseWriter + Send)) {
        match self.lookup(req.method(), req.path()) {
            Some((handler, params)) => {
                req.params = params;
                handler.serve(req, w).await;
            }
            None => w.write_header(404),
        }
    }
}
