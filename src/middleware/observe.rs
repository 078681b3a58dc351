//! Response observation.
//!
//! [`ResponseObserver`] decorates a [`ResponseWriter`] for the lifetime of
//! one request: every call is forwarded to the inner writer untouched, and
//! the status code that will actually be sent is recorded on the side. The
//! wrapped handler cannot tell it is being watched.

use crate::response::ResponseWriter;

/// A transparent [`ResponseWriter`] decorator that captures the response
/// status.
///
/// The captured status is the first one committed: an explicit
/// `write_header` call, the implicit `200` committed by the first body
/// write, or the `200` synthesized by [`finalize_if_unset`](Self::finalize_if_unset)
/// for handlers that wrote nothing at all. Later `write_header` calls are
/// still forwarded (the inner writer applies its own first-wins rule) but do
/// not change the captured value.
pub struct ResponseObserver<'a> {
    inner: &'a mut (dyn ResponseWriter + Send),
    status: u16,
    committed: bool,
}

impl<'a> ResponseObserver<'a> {
    pub fn new(inner: &'a mut (dyn ResponseWriter + Send)) -> Self {
        Self { inner, status: 200, committed: false }
    }

    /// Commits the implicit `200` if the handler never wrote anything.
    ///
    /// Call once after the handler returns. Idempotent, and a no-op when a
    /// status was already captured, so it never duplicates a header write.
    pub fn finalize_if_unset(&mut self) {
        if !self.committed {
            self.inner.write_header(200);
            self.status = 200;
            self.committed = true;
        }
    }

    /// The status code captured for this request.
    pub fn status(&self) -> u16 {
        self.status
    }
}

impl ResponseWriter for ResponseObserver<'_> {
    fn write_header(&mut self, status: u16) {
        if !self.committed {
            self.status = status;
            self.committed = true;
        }
        self.inner.write_header(status);
    }

    fn header(&mut self, name: &str, value: &str) {
        self.inner.header(name, value);
    }

    fn write(&mut self, bytes: &[u8]) {
        // Body bytes without an explicit status mean the transport sends the
        // implicit 200 — record it so the captured status matches the wire.
        if !self.committed {
            self.status = 200;
            self.committed = true;
        }
        self.inner.write(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every call so forwarding can be asserted exactly.
    #[derive(Default)]
    struct Probe {
        statuses: Vec<u16>,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
    }

    impl ResponseWriter for Probe {
        fn write_header(&mut self, status: u16) {
            self.statuses.push(status);
        }
        fn header(&mut self, name: &str, value: &str) {
            self.headers.push((name.to_owned(), value.to_owned()));
        }
        fn write(&mut self, bytes: &[u8]) {
            self.body.extend_from_slice(bytes);
        }
    }

    #[test]
    fn captures_first_status_and_forwards_all() {
        let mut probe = Probe::default();
        let mut observer = ResponseObserver::new(&mut probe);
        observer.write_header(404);
        observer.write_header(500);
        assert_eq!(observer.status(), 404);
        assert_eq!(probe.statuses, vec![404, 500]);
    }

    #[test]
    fn body_write_without_status_captures_200() {
        let mut probe = Probe::default();
        let mut observer = ResponseObserver::new(&mut probe);
        observer.write(b"hello");
        observer.finalize_if_unset();
        assert_eq!(observer.status(), 200);
        // The transport supplies the implicit 200 itself; no explicit header
        // write is forwarded for it.
        assert!(probe.statuses.is_empty());
        assert_eq!(probe.body, b"hello");
    }

    #[test]
    fn finalize_synthesizes_200_exactly_once() {
        let mut probe = Probe::default();
        let mut observer = ResponseObserver::new(&mut probe);
        observer.finalize_if_unset();
        observer.finalize_if_unset();
        assert_eq!(observer.status(), 200);
        assert_eq!(probe.statuses, vec![200]);
    }

    #[test]
    fn finalize_is_a_noop_after_explicit_status() {
        let mut probe = Probe::default();
        let mut observer = ResponseObserver::new(&mut probe);
        observer.write_header(204);
        observer.finalize_if_unset();
        assert_eq!(observer.status(), 204);
        assert_eq!(probe.statuses, vec![204]);
    }

    #[test]
    fn headers_and_body_pass_through_untouched() {
        let mut probe = Probe::default();
        let mut observer = ResponseObserver::new(&mut probe);
        observer.header("content-type", "text/plain");
        observer.write_header(201);
        observer.write(b"created");
        assert_eq!(probe.headers, vec![("content-type".to_owned(), "text/plain".to_owned())]);
        assert_eq!(probe.statuses, vec![201]);
        assert_eq!(probe.body, b"created");
    }
}
