//! Minimal bitacora example — JSON endpoints, health checks, access logs.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users \
//!        -H 'content-type: application/json' \
//!        -H 'x-request-id: req-123' \
//!        -d '{"name":"alice"}'
//!   curl http://localhost:3000/healthz
//!
//! Every request shows up twice on stdout: a `req_start` record before the
//! handler runs and a `req_served` record with status and latency after it.

use async_trait::async_trait;
use bitacora::{
    Handler, Request, RequestLogger, ResponseWriter, Router, Server, TracingSink, health,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .get("/users/{id}", GetUser)
        .post("/users", CreateUser)
        .get("/healthz", health::Liveness)
        .get("/readyz", health::Readiness);

    // Correlate the two records per request with the proxy's request id.
    let app = RequestLogger::with_request_id(TracingSink, "basic-demo", |req| {
        req.header("x-request-id").unwrap_or_default().to_owned()
    })
    .wrap(app);

    Server::bind("0.0.0.0:3000")
        .serve(app)
        .await
        .expect("server error");
}

// GET /users/{id}
struct GetUser;

#[async_trait]
impl Handler for GetUser {
    async fn serve(&self, req: Request, w: &mut (dyn ResponseWriter + Send)) {
        let id = req.param("id").unwrap_or("unknown").to_owned();
        w.header("content-type", "application/json");
        w.write(format!(r#"{{"id":"{id}","name":"alice"}}"#).as_bytes());
    }
}

// POST /users
//
// req.body() is &[u8] — parse with serde_json::from_slice, simd-json, etc.
// bitacora does not touch the bytes.
struct CreateUser;

#[async_trait]
impl Handler for CreateUser {
    async fn serve(&self, req: Request, w: &mut (dyn ResponseWriter + Send)) {
        if req.body().is_empty() {
            w.write_header(400);
            return;
        }
        w.header("content-type", "application/json");
        w.header("location", "/users/99");
        w.write_header(201);
        w.write(br#"{"id":"99","name":"new_user"}"#);
    }
}
