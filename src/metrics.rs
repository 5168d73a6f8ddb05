//! Translation outcome counters.
//!
//! The translate handler reports each call exactly once to a [`MetricsSink`]
//! injected through [`AppState`](crate::api::AppState). [`Counters`] is the
//! production sink: lock-free atomics that also feed the `metrics` facade,
//! so a Prometheus recorder (see [`install_prometheus`]) exposes them as
//!
//! - `translator_success_attempts`
//! - `translator_error_attempts`
//!
//! on the separate metrics listener built by [`router`].

use std::sync::atomic::{AtomicU64, Ordering};

use http::HeaderValue;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::error::Error;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;

pub const SUCCESS_COUNTER: &str = "translator_success_attempts";
pub const ERROR_COUNTER: &str = "translator_error_attempts";

const EXPOSITION: &str = "text/plain; version=0.0.4";

/// Receives one outcome per translate call.
pub trait MetricsSink: Send + Sync {
    fn inc_success(&self);
    fn inc_error(&self);
}

/// Process-wide success/error counters.
#[derive(Debug, Default)]
pub struct Counters {
    success: AtomicU64,
    error: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successes(&self) -> u64 {
        self.success.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.error.load(Ordering::Relaxed)
    }
}

impl MetricsSink for Counters {
    fn inc_success(&self) {
        self.success.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(SUCCESS_COUNTER).increment(1);
    }

    fn inc_error(&self) {
        self.error.fetch_add(1, Ordering::Relaxed);
        metrics::counter!(ERROR_COUNTER).increment(1);
    }
}

/// Installs the global Prometheus recorder and describes both counters.
///
/// Call once at startup, before the first request. A second call fails.
pub fn install_prometheus() -> Result<PrometheusHandle, Error> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| Error::Metrics(e.to_string()))?;

    describe_counters();
    Ok(handle)
}

/// Describes both counters on the current recorder and registers them at 0,
/// so they render before the first request.
pub fn describe_counters() {
    metrics::describe_counter!(SUCCESS_COUNTER, "Counter of success attempts of a translation");
    metrics::describe_counter!(ERROR_COUNTER, "Counter of errors of a translator attempts");
    metrics::counter!(SUCCESS_COUNTER).absolute(0);
    metrics::counter!(ERROR_COUNTER).absolute(0);
}

/// Router for the metrics listener: `GET /metrics` in text exposition format.
pub fn router(handle: PrometheusHandle) -> Router {
    Router::new().get("/metrics", move |_req: Request| {
        let body = handle.render();
        async move { Response::text(Status::Ok, body).content_type(HeaderValue::from_static(EXPOSITION)) }
    })
}
