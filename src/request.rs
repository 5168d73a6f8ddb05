//! Incoming HTTP request type.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Headers a caller may use to supply its own correlation id.
const REQUEST_ID_HEADERS: [&str; 2] = ["x-request-id", "request-id"];

/// Correlation id attached to every log line of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new UUID v7 (time-sortable) id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Take the caller's id from `X-Request-ID` / `Request-Id`, or generate
    /// one. Empty or non-UTF-8 values are ignored.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        REQUEST_ID_HEADERS
            .iter()
            .filter_map(|name| headers.get(*name))
            .filter_map(|v| v.to_str().ok())
            .find(|s| !s.is_empty())
            .map(|s| Self(s.to_owned()))
            .unwrap_or_else(Self::generate)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An incoming HTTP request with its body fully buffered.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
    request_id: RequestId,
    remote_addr: Option<SocketAddr>,
}

impl Request {
    pub(crate) fn from_parts(
        parts: http::request::Parts,
        body: Bytes,
        remote_addr: Option<SocketAddr>,
    ) -> Self {
        let request_id = RequestId::from_headers(&parts.headers);
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            params: HashMap::new(),
            request_id,
            remote_addr,
        }
    }

    /// Builds a request without a socket, for tests and in-process callers.
    ///
    /// ```rust
    /// use lingo_gate::Request;
    ///
    /// let req = Request::builder()
    ///     .method("POST")
    ///     .uri("/api/v1/translate")
    ///     .header("content-type", "application/json")
    ///     .body(r#"{"text":"Hello","from":"en","to":"es"}"#)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(req.path(), "/api/v1/translate");
    /// ```
    pub fn builder() -> RequestBuilder {
        RequestBuilder { inner: http::Request::builder(), body: Bytes::new() }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }
    pub fn request_id(&self) -> &RequestId { &self.request_id }
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// Case-insensitive header lookup. Non-UTF-8 values read as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }
}

/// Builder returned by [`Request::builder`].
pub struct RequestBuilder {
    inner: http::request::Builder,
    body: Bytes,
}

impl RequestBuilder {
    pub fn method(mut self, method: &str) -> Self {
        self.inner = self.inner.method(method);
        self
    }

    pub fn uri(mut self, uri: &str) -> Self {
        self.inner = self.inner.uri(uri);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.inner = self.inner.header(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Request, http::Error> {
        let (parts, ()) = self.inner.body(())?.into_parts();
        Ok(Request::from_parts(parts, self.body, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_prefers_caller_header() {
        let req = Request::builder()
            .uri("/index")
            .header("X-Request-ID", "abc-123")
            .build()
            .unwrap();
        assert_eq!(req.request_id().as_str(), "abc-123");
    }

    #[test]
    fn request_id_generated_when_absent_or_empty() {
        let req = Request::builder().uri("/").header("request-id", "").build().unwrap();
        assert_eq!(req.request_id().as_str().len(), 36);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = Request::builder()
            .uri("/")
            .header("Content-Type", "application/json")
            .build()
            .unwrap();
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.header("authorization"), None);
    }

    #[test]
    fn json_decodes_body() {
        #[derive(serde::Deserialize)]
        struct Probe {
            text: String,
        }
        let req = Request::builder().uri("/").body(r#"{"text":"hi"}"#).build().unwrap();
        assert_eq!(req.json::<Probe>().unwrap().text, "hi");
    }
}
