//! Built-in Kubernetes health-check handlers.
//!
//! Kubernetes asks two questions. bitacora answers them.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Register them on your router:
//!
//! ```rust
//! use bitacora::{Router, health};
//!
//! let app = Router::new()
//!     .get("/healthz", health::Liveness)
//!     .get("/readyz", health::Readiness);
//! ```
//!
//! Replace `Readiness` with your own handler if you need to gate on
//! dependency availability (database connections, downstream services, etc.)
//! by writing `503` through the response writer when a dependency is down.

use async_trait::async_trait;

use crate::handler::Handler;
use crate::request::Request;
use crate::response::ResponseWriter;

/// Kubernetes liveness probe handler.
///
/// Writes body `"ok"` and nothing else — the transport supplies the implicit
/// `200`. If the process can respond to HTTP at all, it is alive; this
/// handler intentionally has no dependencies.
pub struct Liveness;

#[async_trait]
impl Handler for Liveness {
    async fn serve(&self, _req: Request, w: &mut (dyn ResponseWriter + Send)) {
        w.write(b"ok");
    }
}

/// Kubernetes readiness probe handler (default implementation).
///
/// Writes body `"ready"` with the implicit `200`. Replace it with your own
/// handler if your application needs a warm-up period or must verify
/// dependency health before accepting traffic.
pub struct Readiness;

#[async_trait]
impl Handler for Readiness {
    async fn serve(&self, _req: Request, w: &mut (dyn ResponseWriter + Send)) {
        w.write(b"ready");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::Method;
    use crate::response::Response;

    fn req() -> Request {
        Request::new(Method::Get, "/healthz".to_owned(), Vec::new(), Vec::new(), "127.0.0.1:4000".parse().unwrap())
    }

    #[tokio::test]
    async fn probes_answer_200_with_a_body() {
        let mut resp = Response::new();
        Liveness.serve(req(), &mut resp).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.body(), b"ok");

        let mut resp = Response::new();
        Readiness.serve(req(), &mut resp).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.body(), b"ready");
    }
}
