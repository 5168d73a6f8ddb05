use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use super::payload::extract_translation;
use super::{TranslateError, Translator};
use crate::error::Error;

pub const DEFAULT_BACKEND_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// `client=gtx` selects the keyless web client; `dt=t` asks for translated
/// text segments only.
const CLIENT: &str = "gtx";
const MODE_TRANSLATE: &str = "t";

/// Where the provider lives and how long a call may take.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub timeout: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// [`Translator`] backed by Google's public `translate_a/single` endpoint.
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    client: Client,
    endpoint: Url,
}

impl GoogleTranslator {
    pub fn new(config: &BackendConfig) -> Result<Self, Error> {
        let endpoint = Url::parse(&config.url)
            .map_err(|e| Error::Config(format!("invalid backend url `{}`: {e}", config.url)))?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, endpoint })
    }

    async fn call(&self, text: &str, sl: &str, tl: &str) -> Result<String, TranslateError> {
        // `query` form-encodes every value, so `text` is escaped here.
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("client", CLIENT), ("sl", sl), ("tl", tl), ("dt", MODE_TRANSLATE), ("q", text)])
            .send()
            .await
            .map_err(TranslateError::BackendUnreachable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranslateError::BackendRejected { status: status.as_u16() });
        }

        let body = response.bytes().await.map_err(TranslateError::BackendReadFailed)?;
        debug!(bytes = body.len(), "translation backend answered");

        let payload: Value =
            serde_json::from_slice(&body).map_err(TranslateError::BackendMalformedResponse)?;
        Ok(extract_translation(&payload)?)
    }
}

impl Translator for GoogleTranslator {
    fn translate<'a>(
        &'a self,
        text: &'a str,
        source_lang: &'a str,
        target_lang: &'a str,
    ) -> BoxFuture<'a, Result<String, TranslateError>> {
        Box::pin(self.call(text, source_lang, target_lang))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unparseable_backend_url() {
        let config = BackendConfig { url: "not a url".into(), ..BackendConfig::default() };
        assert!(matches!(GoogleTranslator::new(&config), Err(Error::Config(_))));
    }
}
