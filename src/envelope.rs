//! The uniform JSON envelope every endpoint answers with.
//!
//! ```json
//! {"code":0,"body":{"text_translated":"Hola"},"msg":"ok"}
//! {"code":1,"body":null,"msg":"invalid params"}
//! ```
//!
//! `code` is `0` exactly when the operation succeeded. On failure `body` is
//! `null` and `msg` is a fixed, caller-safe description; internal detail
//! never reaches it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::error;

use crate::response::Response;
use crate::status::Status;

/// `code` value of a successful envelope.
pub const CODE_OK: i32 = 0;
/// `code` value of every failed envelope.
pub const CODE_ERROR: i32 = 1;

/// Written when the envelope itself cannot be serialised. Keeps the body
/// valid JSON no matter what.
const FALLBACK: &[u8] = b"{\"code\":1,\"body\":null,\"msg\":\"unexpected error\"}\n";

/// Response envelope: `{code, body, msg}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub code: i32,
    #[serde(rename = "body")]
    pub data: Option<Map<String, Value>>,
    pub msg: String,
}

impl Envelope {
    /// Successful envelope carrying a result payload.
    pub fn ok(msg: impl Into<String>, data: Map<String, Value>) -> Self {
        Self { code: CODE_OK, data: Some(data), msg: msg.into() }
    }

    /// Successful envelope with a message and no payload (liveness endpoints).
    pub fn message(msg: impl Into<String>) -> Self {
        Self { code: CODE_OK, data: None, msg: msg.into() }
    }

    /// Failed envelope.
    pub fn error(msg: impl Into<String>) -> Self {
        Self { code: CODE_ERROR, data: None, msg: msg.into() }
    }

    pub fn is_success(&self) -> bool {
        self.code == CODE_OK
    }

    /// Serialises the envelope into a JSON response with `status`.
    ///
    /// Takes `self` by value: an envelope is written exactly once.
    pub fn into_response(self, status: Status) -> Response {
        match serde_json::to_vec(&self) {
            Ok(mut body) => {
                body.push(b'\n');
                Response::json(status, body)
            }
            Err(e) => {
                error!(error = %e, "failed to serialise response envelope");
                Response::json(Status::InternalServerError, FALLBACK.to_vec())
            }
        }
    }
}
