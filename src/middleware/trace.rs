//! Per-request span and access log.
//!
//! Every request gets an `info` span carrying its request id, so log lines
//! written anywhere downstream (validators, handler, adapter) correlate. The
//! id is echoed back in the `request-id` response header.

use std::net::SocketAddr;
use std::time::Instant;

use http::header::{HOST, USER_AGENT};
use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};
use tracing::{info, info_span, Instrument, Span};

use super::{Middleware, Next};
use crate::handler::BoxFuture;
use crate::request::{Request, RequestId};
use crate::response::Response;

const REQUEST_ID: HeaderName = HeaderName::from_static("request-id");

/// Access-log middleware. Register it outermost.
#[derive(Debug, Clone, Copy, Default)]
pub struct Trace;

impl Middleware for Trace {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let start = Instant::now();
        let request_id = req.request_id().clone();
        let host = header_or_dash(req.headers(), HOST.as_str()).to_owned();
        let span = request_span(&request_id, req.method(), req.uri(), req.headers(), req.remote_addr());

        let fut = async move {
            let res = stamp_request_id(next.run(req).await, &request_id);
            access_log(&host, &res, start);
            res
        };
        Box::pin(fut.instrument(span))
    }
}

/// The `request` span every log line of one request is written under.
pub(crate) fn request_span(
    request_id: &RequestId,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    remote_addr: Option<SocketAddr>,
) -> Span {
    info_span!(
        "request",
        req_id = %request_id,
        method = %method,
        url = %uri,
        ip = %remote_addr.map(|a| a.ip().to_string()).unwrap_or_else(|| "-".into()),
        user_agent = header_or_dash(headers, USER_AGENT.as_str()),
    )
}

/// Echoes the request id back to the caller.
pub(crate) fn stamp_request_id(res: Response, request_id: &RequestId) -> Response {
    match HeaderValue::from_str(request_id.as_str()) {
        Ok(value) => res.header(REQUEST_ID, value),
        Err(_) => res,
    }
}

/// One line per answered request. Call inside the request span.
pub(crate) fn access_log(host: &str, res: &Response, start: Instant) {
    info!(
        host = %host,
        status = res.status(),
        size = res.body().len(),
        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
        "request"
    );
}

pub(crate) fn header_or_dash<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers.get(name).and_then(|v| v.to_str().ok()).unwrap_or("-")
}
