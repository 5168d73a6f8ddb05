//! Translation backends.
//!
//! The gateway performs no linguistic work itself: a [`Translator`] forwards
//! `(text, source, target)` to a provider and returns one flat string, or a
//! classified [`TranslateError`].
//!
//! [`GoogleTranslator`] talks to the public `translate_a/single` endpoint,
//! whose answer is an undocumented nested array; [`payload`] turns that into
//! text or an explicit shape mismatch.

mod google;
pub mod payload;

use futures::future::BoxFuture;

pub use google::{BackendConfig, GoogleTranslator, DEFAULT_BACKEND_URL};
pub use payload::ShapeMismatch;

/// Why a translation attempt failed.
///
/// Transport-level variants are kept apart from [`NoTranslationData`], which
/// means the provider answered but broke its implicit contract. None of the
/// detail here is sent to callers; it is for logs.
///
/// [`NoTranslationData`]: TranslateError::NoTranslationData
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    /// DNS, connect or timeout failure before a response arrived.
    #[error("translation backend unreachable: {0}")]
    BackendUnreachable(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("translation backend answered {status}")]
    BackendRejected { status: u16 },

    #[error("failed reading translation backend response: {0}")]
    BackendReadFailed(#[source] reqwest::Error),

    #[error("translation backend response is not JSON: {0}")]
    BackendMalformedResponse(#[source] serde_json::Error),

    #[error("no translated data in backend response: {0}")]
    NoTranslationData(#[from] ShapeMismatch),
}

impl TranslateError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BackendUnreachable(_) => "backend_unreachable",
            Self::BackendRejected { .. } => "backend_rejected",
            Self::BackendReadFailed(_) => "backend_read_failed",
            Self::BackendMalformedResponse(_) => "backend_malformed_response",
            Self::NoTranslationData(_) => "no_translation_data",
        }
    }

    /// Whether repeating the same call could plausibly succeed.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::BackendUnreachable(_) | Self::BackendReadFailed(_) => true,
            Self::BackendRejected { status } => *status == 429 || *status >= 500,
            Self::BackendMalformedResponse(_) | Self::NoTranslationData(_) => false,
        }
    }
}

/// A machine-translation provider.
///
/// Implementations must be pure functions of their three inputs plus the
/// provider's current answer, and must not retry on their own.
pub trait Translator: Send + Sync {
    fn translate<'a>(
        &'a self,
        text: &'a str,
        source_lang: &'a str,
        target_lang: &'a str,
    ) -> BoxFuture<'a, Result<String, TranslateError>>;
}
