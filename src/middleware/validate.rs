//! Request predicates: content type and shared-secret authorization.
//!
//! Both reject with `400 Bad Request` and `code = 1`, authorization failures
//! included. Callers match on that uniform shape, so it stays 400 rather than
//! 401/403.

use std::sync::Arc;

use http::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::warn;

use super::{Middleware, Next};
use crate::envelope::Envelope;
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::status::Status;

pub const INVALID_CONTENT_TYPE: &str = "Invalid Content-Type";
pub const AUTHORIZATION_MISSING: &str = "Authorization is missing!";
pub const AUTHORIZATION_INVALID: &str = "Authorization is invalid!";

const JSON_MEDIA_TYPE: &str = "application/json";

fn reject(msg: &'static str) -> BoxFuture {
    let res = Envelope::error(msg).into_response(Status::BadRequest);
    Box::pin(std::future::ready(res))
}

/// Passes only requests whose `Content-Type` mentions `application/json`.
///
/// A substring match: `application/json; charset=utf-8` is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentType;

impl Middleware for ContentType {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let declared = req.header(CONTENT_TYPE.as_str()).unwrap_or_default();
        if !declared.contains(JSON_MEDIA_TYPE) {
            warn!(content_type = declared, "rejected request: {INVALID_CONTENT_TYPE}");
            return reject(INVALID_CONTENT_TYPE);
        }
        next.run(req)
    }
}

/// Passes only requests whose `Authorization` header equals the configured
/// credential byte for byte.
#[derive(Debug, Clone)]
pub struct Authorization {
    expected: Arc<str>,
}

impl Authorization {
    pub fn new(expected: impl Into<Arc<str>>) -> Self {
        Self { expected: expected.into() }
    }
}

impl Middleware for Authorization {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let rejection = match req.headers().get(AUTHORIZATION).map(|v| v.as_bytes()) {
            None | Some([]) => Some(AUTHORIZATION_MISSING),
            Some(value) if value != self.expected.as_bytes() => Some(AUTHORIZATION_INVALID),
            Some(_) => None,
        };
        match rejection {
            Some(msg) => {
                warn!("rejected request: {msg}");
                reject(msg)
            }
            None => next.run(req),
        }
    }
}
