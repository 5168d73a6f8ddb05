//! Liveness endpoints.
//!
//! | Path | Body `msg` |
//! |---|---|
//! | `/index` | `Requested endpoint /index of translate API service` |
//! | `/healthcheck` | `Requested endpoint /healthcheck of translate API service` |
//!
//! Both answer `200` with `code = 0` and never touch the backend: if the
//! process can respond at all, it is alive.

use tracing::info;

use crate::{Envelope, Request, Response, Status};

pub async fn index(_req: Request) -> Response {
    liveness("/index")
}

pub async fn healthcheck(_req: Request) -> Response {
    liveness("/healthcheck")
}

fn liveness(path: &str) -> Response {
    let msg = format!("Requested endpoint {path} of translate API service");
    info!("{msg}");
    Envelope::message(msg).into_response(Status::Ok)
}
