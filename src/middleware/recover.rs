//! Panic containment for everything downstream.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tracing::error;

use super::{Middleware, Next};
use crate::envelope::Envelope;
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::status::Status;

/// Fixed message sent when a request panics. The panic payload is logged,
/// never returned.
pub const PANIC_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

/// Converts a panic anywhere in the wrapped pipeline into a `500` envelope
/// and marks the connection for closure.
///
/// Register it router-wide so validators are covered too.
///
/// The closure only takes effect on HTTP/1.1. HTTP/2 has no `connection`
/// header and hyper strips it from h2 responses, so after a panic an h2
/// connection stays open and only the failing stream gets the `500`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Recover;

impl Middleware for Recover {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        // `next.run` is deferred into the async block so a panic while
        // building the downstream future is caught as well.
        let downstream = AssertUnwindSafe(async move { next.run(req).await });
        Box::pin(async move {
            match downstream.catch_unwind().await {
                Ok(res) => res,
                Err(payload) => {
                    error!(panic = panic_message(&*payload), "recovered from panic while handling request");
                    Envelope::error(PANIC_MESSAGE)
                        .into_response(Status::InternalServerError)
                        .close_connection()
                }
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}
