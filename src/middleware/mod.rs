//! Middleware layer.
//!
//! A middleware sees the request before the handler does and either answers
//! it on the spot or passes it on, unchanged, through [`Next`]. The gateway
//! ships four:
//!
//! - [`ContentType`]: rejects bodies that are not declared as JSON
//! - [`Authorization`]: rejects callers without the shared credential
//! - [`Recover`]: turns a panic anywhere downstream into a generic 500
//! - [`Trace`]: per-request span, request id echo, access log line
//!
//! # Ordering
//!
//! Layers run in declaration order: the first one declared is the outermost
//! and can short-circuit before any other runs.
//!
//! ```rust,no_run
//! use lingo_gate::middleware::{Authorization, Chain, ContentType};
//! use lingo_gate::{Request, Response, Router};
//! # async fn translate(_: Request) -> Response { unimplemented!() }
//!
//! let app = Router::new().post(
//!     "/api/v1/translate",
//!     Chain::new(translate)
//!         .with(ContentType)                       // runs first
//!         .with(Authorization::new("Basic s3cr3t")), // runs second
//! );
//! ```
//!
//! Router-wide layers ([`Router::layer`](crate::Router::layer)) wrap the
//! routing step itself, so they also see 404/405 answers and any failure
//! inside a per-route chain.

mod recover;
pub(crate) mod trace;
mod validate;

use std::sync::Arc;

use crate::handler::{private, BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::request::Request;

pub use recover::{Recover, PANIC_MESSAGE};
pub use trace::Trace;
pub use validate::{
    Authorization, ContentType, AUTHORIZATION_INVALID, AUTHORIZATION_MISSING,
    INVALID_CONTENT_TYPE,
};

/// A request interceptor.
pub trait Middleware: Send + Sync + 'static {
    /// Either answer `req` directly or hand it to `next`.
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

/// The rest of the pipeline, as seen from inside a middleware.
pub struct Next {
    handler: BoxedHandler,
}

impl Next {
    pub fn run(self, req: Request) -> BoxFuture {
        self.handler.call(req)
    }
}

/// A handler wrapped in an ordered list of middleware.
pub struct Chain {
    handler: BoxedHandler,
    layers: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    pub fn new(handler: impl Handler) -> Self {
        Self { handler: handler.into_boxed_handler(), layers: Vec::new() }
    }

    /// Appends a layer. Earlier layers run before later ones.
    pub fn with(mut self, layer: impl Middleware) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }
}

impl private::Sealed for Chain {}

impl Handler for Chain {
    fn into_boxed_handler(self) -> BoxedHandler {
        wrap(self.handler, self.layers)
    }
}

/// Folds `layers` around `handler` so that `layers[0]` is outermost.
pub(crate) fn wrap(handler: BoxedHandler, layers: Vec<Arc<dyn Middleware>>) -> BoxedHandler {
    layers
        .into_iter()
        .rev()
        .fold(handler, |next, layer| Arc::new(Layered { layer, next }))
}

struct Layered {
    layer: Arc<dyn Middleware>,
    next: BoxedHandler,
}

impl ErasedHandler for Layered {
    fn call(&self, req: Request) -> BoxFuture {
        self.layer.call(req, Next { handler: Arc::clone(&self.next) })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{Envelope, Response, Status};

    struct Record {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
        stop: bool,
    }

    impl Middleware for Record {
        fn call(&self, req: Request, next: Next) -> BoxFuture {
            self.log.lock().unwrap().push(self.name);
            if self.stop {
                let res = Envelope::error(self.name).into_response(Status::BadRequest);
                return Box::pin(async move { res });
            }
            next.run(req)
        }
    }

    fn request() -> Request {
        Request::builder().uri("/").build().unwrap()
    }

    #[tokio::test]
    async fn layers_run_in_declaration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let inner_log = Arc::clone(&log);
        let handler = move |_req: Request| {
            let log = Arc::clone(&inner_log);
            async move {
                log.lock().unwrap().push("handler");
                Envelope::message("done").into_response(Status::Ok)
            }
        };

        let chain = Chain::new(handler)
            .with(Record { name: "first", log: Arc::clone(&log), stop: false })
            .with(Record { name: "second", log: Arc::clone(&log), stop: false })
            .into_boxed_handler();

        let res: Response = chain.call(request()).await;
        assert_eq!(res.status(), 200);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second", "handler"]);
    }

    #[tokio::test]
    async fn first_layer_short_circuits_the_rest() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let handler = |_req: Request| async { Envelope::message("unreachable").into_response(Status::Ok) };

        let chain = Chain::new(handler)
            .with(Record { name: "first", log: Arc::clone(&log), stop: true })
            .with(Record { name: "second", log: Arc::clone(&log), stop: false })
            .into_boxed_handler();

        let res = chain.call(request()).await;
        assert_eq!(res.status(), 400);
        assert_eq!(*log.lock().unwrap(), vec!["first"]);
    }

    #[tokio::test]
    async fn empty_chain_is_the_handler() {
        let handler = |_req: Request| async { Envelope::message("plain").into_response(Status::Ok) };
        let res = Chain::new(handler).into_boxed_handler().call(request()).await;
        assert_eq!(res.status(), 200);
    }
}
