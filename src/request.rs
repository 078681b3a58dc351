//! Incoming HTTP request type and HTTP/1.1 parsing.
//!
//! Parsing is deliberately small: request line, headers, `content-length`
//! body. Chunked uploads are rejected with `501` — behind nginx the proxy
//! buffers and de-chunks requests before they reach the service, so the
//! framework never sees a chunked body in its intended deployment.

use std::collections::HashMap;
use std::net::SocketAddr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::method::Method;

/// An incoming HTTP request, parsed from the raw TCP stream.
pub struct Request {
    method: Method,
    target: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    pub(crate) params: HashMap<String, String>,
    remote: SocketAddr,
}

impl Request {
    pub(crate) fn new(
        method: Method,
        target: String,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
        remote: SocketAddr,
    ) -> Self {
        Self { method, target, headers, body, params: HashMap::new(), remote }
    }

    pub fn method(&self) -> Method { self.method }

    /// The full request-target as sent on the wire, query string included.
    pub fn target(&self) -> &str { &self.target }

    /// The path component of the target, without the query string.
    pub fn path(&self) -> &str {
        match self.target.split_once('?') {
            Some((path, _)) => path,
            None => &self.target,
        }
    }

    /// The raw query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, q)| q)
    }

    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// The peer address of the connection this request arrived on.
    pub fn remote(&self) -> SocketAddr { self.remote }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub(crate) fn wants_close(&self) -> bool {
        self.header("connection").is_some_and(|v| v.eq_ignore_ascii_case("close"))
    }
}

// ── Parsing ──────────────────────────────────────────────────────────────────

/// Outcome of reading one request off a connection.
pub(crate) enum Parsed {
    Request(Request),
    /// The client closed the connection between requests.
    Eof,
    /// The bytes were not a servable request; respond with this status and
    /// close the connection.
    Reject(u16),
}

pub(crate) async fn read_request<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    remote: SocketAddr,
) -> std::io::Result<Parsed> {
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Ok(Parsed::Eof);
    }

    let request_line = line.trim_end();
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Ok(Parsed::Reject(400));
    };
    if parts.next().is_some() || !version.starts_with("HTTP/1.") {
        return Ok(Parsed::Reject(400));
    }
    let Ok(method) = method.parse::<Method>() else {
        return Ok(Parsed::Reject(405));
    };
    let target = target.to_owned();

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            // Connection dropped mid-headers.
            return Ok(Parsed::Reject(400));
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            return Ok(Parsed::Reject(400));
        };
        headers.push((name.trim().to_owned(), value.trim().to_owned()));
    }

    if headers.iter().any(|(n, _)| n.eq_ignore_ascii_case("transfer-encoding")) {
        return Ok(Parsed::Reject(501));
    }

    let mut body = Vec::new();
    if let Some(len) = headers.iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("content-length"))
        .map(|(_, v)| v.as_str())
    {
        let Ok(len) = len.parse::<usize>() else {
            return Ok(Parsed::Reject(400));
        };
        body = vec![0; len];
        reader.read_exact(&mut body).await?;
    }

    Ok(Parsed::Request(Request::new(method, target, headers, body, remote)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "127.0.0.1:4000".parse().unwrap()
    }

    async fn parse(raw: &[u8]) -> Parsed {
        let mut reader = tokio::io::BufReader::new(raw);
        read_request(&mut reader, peer()).await.unwrap()
    }

    #[tokio::test]
    async fn parses_request_line_headers_and_query() {
        let raw = b"GET /users/42?full=1 HTTP/1.1\r\nHost: example.test\r\nX-Request-Id: req-123\r\n\r\n";
        let Parsed::Request(req) = parse(raw).await else { panic!("expected a request") };

        assert_eq!(req.method(), Method::Get);
        assert_eq!(req.target(), "/users/42?full=1");
        assert_eq!(req.path(), "/users/42");
        assert_eq!(req.query(), Some("full=1"));
        assert_eq!(req.header("x-request-id"), Some("req-123"));
        assert_eq!(req.remote(), peer());
        assert!(req.body().is_empty());
    }

    #[tokio::test]
    async fn reads_content_length_body() {
        let raw = b"POST /users HTTP/1.1\r\nContent-Length: 16\r\n\r\n{\"name\":\"alice\"}";
        let Parsed::Request(req) = parse(raw).await else { panic!("expected a request") };

        assert_eq!(req.method(), Method::Post);
        assert_eq!(req.body(), br#"{"name":"alice"}"#);
    }

    #[tokio::test]
    async fn clean_eof_between_requests() {
        assert!(matches!(parse(b"").await, Parsed::Eof));
    }

    #[tokio::test]
    async fn malformed_request_line_is_rejected() {
        assert!(matches!(parse(b"GET /\r\n\r\n").await, Parsed::Reject(400)));
        assert!(matches!(parse(b"GET / SP HTTP/1.1\r\n\r\n").await, Parsed::Reject(400)));
        assert!(matches!(parse(b"GET / SPDY/3\r\n\r\n").await, Parsed::Reject(400)));
    }

    #[tokio::test]
    async fn unknown_method_is_rejected_with_405() {
        assert!(matches!(parse(b"BREW /pot HTTP/1.1\r\n\r\n").await, Parsed::Reject(405)));
    }

    #[tokio::test]
    async fn chunked_uploads_are_rejected_with_501() {
        let raw = b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n";
        assert!(matches!(parse(raw).await, Parsed::Reject(501)));
    }

    #[tokio::test]
    async fn connection_close_is_detected() {
        let raw = b"GET / HTTP/1.1\r\nConnection: Close\r\n\r\n";
        let Parsed::Request(req) = parse(raw).await else { panic!("expected a request") };
        assert!(req.wants_close());
    }
}
