//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Handlers rarely build a [`Response`] by hand: the translate and health
//! endpoints go through [`Envelope::into_response`](crate::Envelope::into_response),
//! which is the only place a JSON body is produced. The metrics listener is
//! the one exception and uses [`Response::text`].

use bytes::Bytes;
use http::header::{CONNECTION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use http_body_util::Full;

use crate::status::Status;

const JSON: HeaderValue = HeaderValue::from_static("application/json");
const TEXT: HeaderValue = HeaderValue::from_static("text/plain; charset=utf-8");
const CLOSE: HeaderValue = HeaderValue::from_static("close");

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// The body is fully buffered: a response is assembled in memory and handed
/// to hyper in one piece, so the caller never observes a partial write.
#[derive(Debug)]
pub struct Response {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
}

impl Response {
    /// `application/json` response. The content type is set before anything
    /// else touches the header map.
    pub(crate) fn json(status: Status, body: Vec<u8>) -> Self {
        Self::with_content_type(status, JSON, body)
    }

    /// `text/plain; charset=utf-8` response.
    pub fn text(status: Status, body: impl Into<String>) -> Self {
        Self::with_content_type(status, TEXT, body.into().into_bytes())
    }

    /// Overrides the content type, e.g. for the Prometheus exposition format.
    pub fn content_type(mut self, value: HeaderValue) -> Self {
        self.headers.insert(CONTENT_TYPE, value);
        self
    }

    fn with_content_type(status: Status, content_type: HeaderValue, body: Vec<u8>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, content_type);
        Self { status: status.into(), headers, body: Bytes::from(body) }
    }

    /// Adds (or replaces) a header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Marks the connection for closure once this response is written.
    ///
    /// hyper honours `connection: close` on an HTTP/1.1 response and will not
    /// reuse the connection for another request. On HTTP/2 the header is
    /// stripped and the connection is left open.
    pub fn close_connection(self) -> Self {
        self.header(CONNECTION, CLOSE)
    }

    pub fn closes_connection(&self) -> bool {
        self.headers.get(CONNECTION).is_some_and(|v| v == CLOSE)
    }

    pub fn status(&self) -> u16 { self.status.as_u16() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Anything a handler returns must implement this.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}
