//! Radix-tree request router.
//!
//! One tree per HTTP method. O(path-length) lookup. A miss still answers with
//! an envelope: `404` when no method knows the path, `405` (plus `allow`)
//! when another method does.

use std::collections::HashMap;
use std::sync::Arc;

use http::header::ALLOW;
use http::{HeaderValue, Method};
use matchit::Router as MatchitRouter;

use crate::envelope::Envelope;
use crate::handler::{BoxFuture, BoxedHandler, ErasedHandler, Handler};
use crate::middleware::{self, Middleware};
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

pub const NOT_FOUND: &str = "not found";
pub const METHOD_NOT_ALLOWED: &str = "method not allowed";

/// The application router.
///
/// Build it once at startup, then hand it to [`Server::serve`](crate::Server::serve)
/// or turn it into an [`App`] to drive it without a socket.
#[derive(Default)]
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    layers: Vec<Arc<dyn Middleware>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method + path pair.
    ///
    /// # Panics
    ///
    /// Panics on a malformed or conflicting path. Routes are fixed at startup,
    /// so this is a programming error.
    pub fn route(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.route(Method::GET, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.route(Method::POST, path, handler)
    }

    /// Wraps the whole router, misses included. The first layer added is the
    /// outermost.
    pub fn layer(mut self, layer: impl Middleware) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }

    /// Freezes the routing table.
    pub fn into_app(self) -> App {
        let dispatch: BoxedHandler = Arc::new(Dispatch { routes: self.routes });
        App { handler: middleware::wrap(dispatch, self.layers) }
    }
}

/// A frozen router, ready to answer requests.
#[derive(Clone)]
pub struct App {
    handler: BoxedHandler,
}

impl App {
    pub async fn handle(&self, req: Request) -> Response {
        self.handler.call(req).await
    }
}

enum Lookup {
    Found(BoxedHandler, HashMap<String, String>),
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

struct Dispatch {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Dispatch {
    fn lookup(&self, method: &Method, path: &str) -> Lookup {
        if let Some(matched) = self.routes.get(method).and_then(|tree| tree.at(path).ok()) {
            let params = matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect();
            return Lookup::Found(Arc::clone(matched.value), params);
        }

        let mut allowed: Vec<Method> = self.routes.iter()
            .filter(|(_, tree)| tree.at(path).is_ok())
            .map(|(m, _)| m.clone())
            .collect();
        if allowed.is_empty() {
            return Lookup::NotFound;
        }
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Lookup::MethodNotAllowed(allowed)
    }
}

impl ErasedHandler for Dispatch {
    fn call(&self, mut req: Request) -> BoxFuture {
        match self.lookup(req.method(), req.path()) {
            Lookup::Found(handler, params) => {
                req.set_params(params);
                handler.call(req)
            }
            Lookup::MethodNotAllowed(allowed) => {
                let allow = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
                let mut res = Envelope::error(METHOD_NOT_ALLOWED).into_response(Status::MethodNotAllowed);
                if let Ok(value) = HeaderValue::from_str(&allow) {
                    res = res.header(ALLOW, value);
                }
                Box::pin(std::future::ready(res))
            }
            Lookup::NotFound => {
                let res = Envelope::error(NOT_FOUND).into_response(Status::NotFound);
                Box::pin(std::future::ready(res))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn hello(req: Request) -> Response {
        let who = req.param("name").unwrap_or("nobody").to_owned();
        Envelope::message(who).into_response(Status::Ok)
    }

    fn app() -> App {
        Router::new()
            .get("/hello/{name}", hello)
            .post("/hello/{name}", hello)
            .route(Method::PUT, "/only-put", hello)
            .into_app()
    }

    fn request(method: &str, uri: &str) -> Request {
        Request::builder().method(method).uri(uri).build().unwrap()
    }

    fn msg(res: &Response) -> String {
        serde_json::from_slice::<Envelope>(res.body()).unwrap().msg
    }

    #[tokio::test]
    async fn found_route_receives_params() {
        let res = app().handle(request("GET", "/hello/ada")).await;
        assert_eq!(res.status(), 200);
        assert_eq!(msg(&res), "ada");
    }

    #[tokio::test]
    async fn unknown_path_is_404_envelope() {
        let res = app().handle(request("GET", "/nowhere")).await;
        assert_eq!(res.status(), 404);
        assert_eq!(msg(&res), NOT_FOUND);
    }

    #[tokio::test]
    async fn wrong_method_is_405_with_allow() {
        let res = app().handle(request("DELETE", "/hello/ada")).await;
        assert_eq!(res.status(), 405);
        assert_eq!(msg(&res), METHOD_NOT_ALLOWED);
        assert_eq!(res.header_str("allow"), Some("GET, POST"));
    }

    #[test]
    #[should_panic(expected = "invalid route")]
    fn conflicting_routes_panic_at_startup() {
        let _ = Router::new().get("/a/{x}", hello).get("/a/{y}", hello);
    }
}
