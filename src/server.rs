//! HTTP server and graceful shutdown.
//!
//! # Graceful shutdown
//!
//! On SIGTERM or Ctrl-C the server:
//! 1. Immediately stops `listener.accept()`, so no new connections are made.
//! 2. Gives every in-flight connection task the configured grace period.
//! 3. Aborts whatever is still running after that and returns from
//!    [`Server::serve`], letting `main` exit cleanly.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::HOST;
use http_body_util::{BodyExt, Full, Limited};
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::parse_listen_address;
use crate::envelope::Envelope;
use crate::error::Error;
use crate::middleware::trace::{access_log, header_or_dash, request_span, stamp_request_id};
use crate::request::{Request, RequestId};
use crate::router::{App, Router};
use crate::status::Status;

pub const INVALID_BODY: &str = "invalid request body";

/// Default cap on a buffered request body.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// The HTTP server.
pub struct Server {
    addr: SocketAddr,
    grace: Duration,
    read_timeout: Duration,
    max_body_bytes: usize,
}

impl Server {
    /// Configures the server to bind to `addr` (`host:port` or `:port`) when
    /// [`serve`](Server::serve) is called.
    pub fn bind(addr: &str) -> Result<Self, Error> {
        Ok(Self {
            addr: parse_listen_address(addr)?,
            grace: Duration::from_secs(5),
            read_timeout: Duration::from_secs(60),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    /// How long in-flight connections may run after a shutdown signal.
    pub fn grace_period(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// How long a client has to deliver its full request body.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Largest request body that will be buffered. Anything bigger is
    /// answered with a `400`.
    pub fn max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// Serves `router` until SIGTERM or Ctrl-C, then drains.
    pub async fn serve(self, router: Router) -> Result<(), Error> {
        self.serve_with_shutdown(router, shutdown_signal()).await
    }

    /// Serves `router` until `signal` resolves, then drains.
    pub async fn serve_with_shutdown(
        self,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let listener = TcpListener::bind(self.addr).await?;
        self.run(listener, router.into_app(), signal).await
    }

    /// Serves on an already-bound listener. The configured address is ignored.
    pub async fn serve_listener(
        self,
        listener: TcpListener,
        router: Router,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        self.run(listener, router.into_app(), signal).await
    }

    async fn run(
        self,
        listener: TcpListener,
        app: App,
        signal: impl Future<Output = ()>,
    ) -> Result<(), Error> {
        let local = listener.local_addr()?;
        info!(addr = %local, "listening");

        let limits = BodyLimits { read_timeout: self.read_timeout, max_bytes: self.max_body_bytes };
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Shutdown first, so a signal stops accepting even when more
                // connections are queued.
                biased;

                () = &mut signal => {
                    info!(addr = %local, in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, remote_addr) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let app = app.clone();
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let app = app.clone();
                            async move { dispatch(app, req, remote_addr, limits).await }
                        });

                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            warn!(peer = %remote_addr, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        let drained = tokio::time::timeout(self.grace, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            warn!(addr = %local, abandoned = tasks.len(), "grace period elapsed, aborting in-flight connections");
            tasks.shutdown().await;
        }

        info!(addr = %local, "stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Buffers the body under the read deadline and size cap, then hands the
/// request to the app. Never fails: every outcome is a response.
async fn dispatch(
    app: App,
    req: hyper::Request<hyper::body::Incoming>,
    remote_addr: SocketAddr,
    limits: BodyLimits,
) -> Result<http::Response<Full<Bytes>>, Infallible> {
    let start = Instant::now();
    let (parts, body) = req.into_parts();

    let collected = Limited::new(body, limits.max_bytes).collect();
    let failure = match tokio::time::timeout(limits.read_timeout, collected).await {
        Ok(Ok(collected)) => {
            let request = Request::from_parts(parts, collected.to_bytes(), Some(remote_addr));
            return Ok(app.handle(request).await.into_inner());
        }
        Ok(Err(e)) => BodyFailure::Read(e.to_string()),
        Err(_) => BodyFailure::Deadline,
    };

    // The router never sees this request, so correlate it here.
    let request_id = RequestId::from_headers(&parts.headers);
    let span = request_span(&request_id, &parts.method, &parts.uri, &parts.headers, Some(remote_addr));
    let res = span.in_scope(|| {
        match failure {
            BodyFailure::Read(error) => {
                warn!(error = %error, max_bytes = limits.max_bytes, "failed reading request body");
            }
            BodyFailure::Deadline => {
                warn!(timeout_ms = limits.read_timeout.as_millis() as u64, "request body not received in time");
            }
        }

        let res = Envelope::error(INVALID_BODY)
            .into_response(Status::BadRequest)
            .close_connection();
        let res = stamp_request_id(res, &request_id);
        access_log(header_or_dash(&parts.headers, HOST.as_str()), &res, start);
        res
    });
    Ok(res.into_inner())
}

enum BodyFailure {
    Read(String),
    Deadline,
}

#[derive(Debug, Clone, Copy)]
struct BodyLimits {
    read_timeout: Duration,
    max_bytes: usize,
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first SIGTERM or SIGINT (Ctrl-C). On Windows only Ctrl-C
/// is available.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let sigterm = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
