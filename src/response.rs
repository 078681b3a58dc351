//! The response-writer seam and the buffered HTTP/1.1 response.
//!
//! Handlers never build a response value — they write one, Go-style, through
//! the [`ResponseWriter`] trait. The concrete [`Response`] buffers everything
//! in memory; the server serializes and flushes it after the handler returns.
//! Buffering is what keeps the trait infallible: nothing touches the socket
//! until the handler is done.

use tokio::io::{AsyncWrite, AsyncWriteExt};

// ── ResponseWriter ────────────────────────────────────────────────────────────

/// The writing side of a request, as seen by a handler.
///
/// The status is committed by the first of: an explicit
/// [`write_header`](ResponseWriter::write_header) call, or the first
/// [`write`](ResponseWriter::write) of body bytes (which commits the implicit
/// `200`). Once committed it cannot change — later `write_header` calls have
/// no effect, matching standard HTTP semantics.
///
/// Decorators (e.g. [`ResponseObserver`](crate::ResponseObserver)) implement
/// this trait over an inner writer to observe traffic without altering it.
pub trait ResponseWriter {
    /// Commits `status` as the response status. First call wins.
    fn write_header(&mut self, status: u16);

    /// Adds a response header. Ignored once the status is committed.
    fn header(&mut self, name: &str, value: &str);

    /// Appends body bytes, committing the implicit `200` if no status was
    /// set yet.
    fn write(&mut self, bytes: &[u8]);
}

// ── Response ─────────────────────────────────────────────────────────────────

/// The buffered response a handler writes into.
///
/// Starts as an empty `200 OK`. Public so that handler unit tests can write
/// into one and inspect the outcome without a running server:
///
/// ```rust
/// use bitacora::{Response, ResponseWriter};
///
/// let mut resp = Response::new();
/// resp.write_header(404);
/// resp.write(b"nope");
///
/// assert_eq!(resp.status(), 404);
/// assert_eq!(resp.body(), b"nope");
/// ```
pub struct Response {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    committed: bool,
}

impl Response {
    pub fn new() -> Self {
        Self { status: 200, headers: Vec::new(), body: Vec::new(), committed: false }
    }

    /// The status that will be (or was) sent. `200` until overridden.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub(crate) async fn write_to<W: AsyncWrite + Unpin>(
        self,
        writer: &mut W,
    ) -> std::io::Result<()> {
        writer.write_all(
            format!("HTTP/1.1 {} {}\r\n", self.status, reason(self.status)).as_bytes(),
        ).await?;
        writer.write_all(
            format!("content-length: {}\r\n", self.body.len()).as_bytes(),
        ).await?;
        for (name, value) in &self.headers {
            writer.write_all(format!("{name}: {value}\r\n").as_bytes()).await?;
        }
        writer.write_all(b"\r\n").await?;
        writer.write_all(&self.body).await?;
        writer.flush().await
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter for Response {
    fn write_header(&mut self, status: u16) {
        if !self.committed {
            self.status = status;
            self.committed = true;
        }
    }

    fn header(&mut self, name: &str, value: &str) {
        if !self.committed {
            self.headers.push((name.to_owned(), value.to_owned()));
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        self.committed = true;
        self.body.extend_from_slice(bytes);
    }
}

// ── Status reason phrases ─────────────────────────────────────────────────────

fn reason(code: u16) -> &'static str {
    match code {
        100 => "Continue",
        101 => "Switching Protocols",
        102 => "Processing",
        103 => "Early Hints",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        207 => "Multi-Status",
        208 => "Already Reported",
        226 => "IM Used",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Content Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a Teapot",
        421 => "Misdirected Request",
        422 => "Unprocessable Content",
        423 => "Locked",
        424 => "Failed Dependency",
        425 => "Too Early",
        426 => "Upgrade Required",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        451 => "Unavailable For Legal Reasons",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        506 => "Variant Also Negotiates",
        507 => "Insufficient Storage",
        508 => "Loop Detected",
        510 => "Not Extended",
        511 => "Network Authentication Required",
        _   => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_write_header_wins() {
        let mut resp = Response::new();
        resp.write_header(404);
        resp.write_header(500);
        assert_eq!(resp.status(), 404);
    }

    #[test]
    fn body_write_commits_implicit_200() {
        let mut resp = Response::new();
        resp.write(b"hello");
        resp.write_header(404); // too late
        assert_eq!(resp.status(), 200);
        assert_eq!(resp.body(), b"hello");
    }

    #[test]
    fn headers_after_commit_are_dropped() {
        let mut resp = Response::new();
        resp.header("content-type", "text/plain");
        resp.write(b"x");
        resp.header("x-late", "1");
        assert_eq!(resp.headers().len(), 1);
    }

    #[tokio::test]
    async fn serializes_status_line_headers_and_body() {
        let mut resp = Response::new();
        resp.header("content-type", "application/json");
        resp.write_header(201);
        resp.write(br#"{"id":42}"#);

        let mut out = Vec::new();
        resp.write_to(&mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 201 Created\r\n"));
        assert!(text.contains("content-length: 9\r\n"));
        assert!(text.contains("content-type: application/json\r\n"));
        assert!(text.ends_with("\r\n\r\n{\"id\":42}"));
    }

    #[tokio::test]
    async fn untouched_response_serializes_as_empty_200() {
        let resp = Response::new();
        let mut out = Vec::new();
        resp.write_to(&mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("content-length: 0\r\n"));
    }
}
