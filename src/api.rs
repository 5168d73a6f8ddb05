//! The translate endpoint and the gateway's route table.
//!
//! `POST /api/v1/translate` runs four steps, each with its own terminal answer:
//!
//! | Step | Failure | Status | `msg` |
//! |---|---|---|---|
//! | decode JSON body | malformed | 400 | `error decoding input` |
//! | check fields | any of `text`/`from`/`to` empty | 400 | `invalid params` |
//! | call backend | any [`TranslateError`] | 500 | `error in translation` |
//! | respond | success | 200 | `ok`, `body.text_translated` |
//!
//! Every call increments exactly one of the success/error counters.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::envelope::Envelope;
use crate::health;
use crate::metrics::MetricsSink;
use crate::middleware::{Authorization, Chain, ContentType, Recover, Trace};
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::status::Status;
use crate::translate::{TranslateError, Translator};

pub const TRANSLATE_PATH: &str = "/api/v1/translate";

pub const MSG_DECODE_FAILED: &str = "error decoding input";
pub const MSG_INVALID_PARAMS: &str = "invalid params";
pub const MSG_TRANSLATION_FAILED: &str = "error in translation";
pub const MSG_OK: &str = "ok";

/// Key of the translated text inside the success envelope's `body`.
pub const TEXT_TRANSLATED: &str = "text_translated";

/// A translate call as sent by the client. Missing fields decode as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TranslationRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default, rename = "from")]
    pub source_lang: String,
    #[serde(default, rename = "to")]
    pub target_lang: String,
}

impl TranslationRequest {
    /// All three fields present. Language codes are passed through as-is.
    pub fn is_valid(&self) -> bool {
        !self.text.is_empty() && !self.source_lang.is_empty() && !self.target_lang.is_empty()
    }
}

/// Dependencies shared by every request. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    translator: Arc<dyn Translator>,
    metrics: Arc<dyn MetricsSink>,
}

impl AppState {
    pub fn new(translator: Arc<dyn Translator>, metrics: Arc<dyn MetricsSink>) -> Self {
        Self { translator, metrics }
    }
}

/// `POST /api/v1/translate`
pub async fn translate(state: AppState, req: Request) -> Response {
    let input: TranslationRequest = match req.json() {
        Ok(input) => input,
        Err(e) => {
            state.metrics.inc_error();
            warn!(error = %e, "{MSG_DECODE_FAILED}");
            return Envelope::error(MSG_DECODE_FAILED).into_response(Status::BadRequest);
        }
    };

    if !input.is_valid() {
        state.metrics.inc_error();
        warn!(
            text_len = input.text.len(),
            from = %input.source_lang,
            to = %input.target_lang,
            "{MSG_INVALID_PARAMS}"
        );
        return Envelope::error(MSG_INVALID_PARAMS).into_response(Status::BadRequest);
    }

    match state.translator.translate(&input.text, &input.source_lang, &input.target_lang).await {
        Ok(translated) => {
            state.metrics.inc_success();
            info!(from = %input.source_lang, to = %input.target_lang, "translation succeeded");
            let mut data = Map::new();
            data.insert(TEXT_TRANSLATED.to_owned(), Value::String(translated));
            Envelope::ok(MSG_OK, data).into_response(Status::Ok)
        }
        Err(e) => {
            state.metrics.inc_error();
            log_backend_failure(&e);
            Envelope::error(MSG_TRANSLATION_FAILED).into_response(Status::InternalServerError)
        }
    }
}

fn log_backend_failure(e: &TranslateError) {
    error!(
        error = %e,
        kind = e.kind(),
        retriable = e.is_retriable(),
        "{MSG_TRANSLATION_FAILED}"
    );
}

/// The full gateway route table.
///
/// [`Trace`] is outermost so even contained panics get an access-log line;
/// [`Recover`] sits inside it and around every route chain.
pub fn router(state: AppState, credential: &str) -> Router {
    let translate_chain = Chain::new(move |req: Request| translate(state.clone(), req))
        .with(ContentType)
        .with(Authorization::new(credential));

    Router::new()
        .get("/index", health::index)
        .get("/healthcheck", health::healthcheck)
        .post(TRANSLATE_PATH, translate_chain)
        .layer(Trace)
        .layer(Recover)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_decode_as_empty() {
        let input: TranslationRequest = serde_json::from_str(r#"{"text":"Hello"}"#).unwrap();
        assert_eq!(input.text, "Hello");
        assert!(input.source_lang.is_empty());
        assert!(!input.is_valid());
    }

    #[test]
    fn wire_names_are_from_and_to() {
        let input: TranslationRequest =
            serde_json::from_str(r#"{"text":"Hello","from":"en","to":"es"}"#).unwrap();
        assert_eq!(input.source_lang, "en");
        assert_eq!(input.target_lang, "es");
        assert!(input.is_valid());
    }

    #[test]
    fn language_codes_are_not_interpreted() {
        let input = TranslationRequest {
            text: "x".into(),
            source_lang: "not-a-language".into(),
            target_lang: "zz".into(),
        };
        assert!(input.is_valid());
    }
}
