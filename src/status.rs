//! HTTP status codes the gateway answers with, as a typed enum.
//!
//! Every envelope carries one of these. The set is deliberately small: the
//! gateway only ever succeeds, rejects the caller, misroutes, or fails.
//!
//! ```rust
//! use lingo_gate::{Envelope, Status};
//!
//! Envelope::error("invalid params").into_response(Status::BadRequest);
//! ```

/// Status codes used by the gateway.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    Ok,                  // 200
    BadRequest,          // 400
    NotFound,            // 404
    MethodNotAllowed,    // 405
    InternalServerError, // 500
}

impl Status {
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Ok                  => 200,
            Self::BadRequest          => 400,
            Self::NotFound            => 404,
            Self::MethodNotAllowed    => 405,
            Self::InternalServerError => 500,
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 { s.as_u16() }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> http::StatusCode {
        match s {
            Status::Ok                  => http::StatusCode::OK,
            Status::BadRequest          => http::StatusCode::BAD_REQUEST,
            Status::NotFound            => http::StatusCode::NOT_FOUND,
            Status::MethodNotAllowed    => http::StatusCode::METHOD_NOT_ALLOWED,
            Status::InternalServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
