//! # lingo-gate
//!
//! A small HTTP gateway in front of a machine-translation provider. It
//! validates and authorises a translate call, forwards it, and answers with a
//! uniform JSON envelope. It does no linguistic work of its own.
//!
//! ## Request pipeline
//!
//! ```text
//! client ─▶ Trace ─▶ Recover ─▶ Router ─┬─▶ /index, /healthcheck
//!                                        └─▶ ContentType ─▶ Authorization ─▶ translate ─▶ Translator
//! ```
//!
//! - [`middleware::Trace`]: request id, span, access log
//! - [`middleware::Recover`]: any panic below becomes a generic `500`
//! - [`middleware::ContentType`], [`middleware::Authorization`]: early `400`s
//! - [`api::translate`]: decode, validate, call the [`Translator`], build the [`Envelope`]
//!
//! ## Wiring it up
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lingo_gate::{api, metrics::Counters, BackendConfig, GoogleTranslator, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lingo_gate::Error> {
//!     let translator = GoogleTranslator::new(&BackendConfig::default())?;
//!     let state = api::AppState::new(Arc::new(translator), Arc::new(Counters::new()));
//!
//!     Server::bind(":8080")?
//!         .serve(api::router(state, "Basic s3cr3t"))
//!         .await
//! }
//! ```

mod envelope;
mod error;
mod handler;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod api;
pub mod config;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod translate;

pub use envelope::{Envelope, CODE_ERROR, CODE_OK};
pub use error::Error;
pub use handler::{BoxFuture, Handler};
pub use request::{Request, RequestBuilder, RequestId};
pub use response::{IntoResponse, Response};
pub use router::{App, Router, METHOD_NOT_ALLOWED, NOT_FOUND};
pub use server::{shutdown_signal, Server, DEFAULT_MAX_BODY_BYTES, INVALID_BODY};
pub use status::Status;
pub use translate::{BackendConfig, GoogleTranslator, TranslateError, Translator};
