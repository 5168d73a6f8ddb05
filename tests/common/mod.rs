#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use lingo_gate::api::{self, AppState};
use lingo_gate::metrics::Counters;
use lingo_gate::translate::payload::extract_translation;
use lingo_gate::{App, Envelope, Request, Response, TranslateError, Translator};
use serde_json::Value;

pub const CREDENTIAL: &str = "Basic dGVzdGVyOnRlc3RwYXNz";

/// What the fake provider does when called.
pub enum Behaviour {
    Answer(Value),
    Panic,
}

/// In-process stand-in for the translation provider.
pub struct FakeBackend {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl FakeBackend {
    pub fn answering(payload: Value) -> Arc<Self> {
        Arc::new(Self { behaviour: Behaviour::Answer(payload), calls: AtomicUsize::new(0) })
    }

    pub fn panicking() -> Arc<Self> {
        Arc::new(Self { behaviour: Behaviour::Panic, calls: AtomicUsize::new(0) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Translator for FakeBackend {
    fn translate<'a>(
        &'a self,
        _text: &'a str,
        _source_lang: &'a str,
        _target_lang: &'a str,
    ) -> BoxFuture<'a, Result<String, TranslateError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            match &self.behaviour {
                Behaviour::Answer(payload) => extract_translation(payload).map_err(TranslateError::from),
                Behaviour::Panic => {
                    let state: Option<&str> = None;
                    Ok(state.unwrap().to_owned())
                }
            }
        })
    }
}

pub struct Gateway {
    pub app: App,
    pub backend: Arc<FakeBackend>,
    pub counters: Arc<Counters>,
}

pub fn gateway(backend: Arc<FakeBackend>) -> Gateway {
    let counters = Arc::new(Counters::new());
    let state = AppState::new(backend.clone(), counters.clone());
    Gateway { app: api::router(state, CREDENTIAL).into_app(), backend, counters }
}

pub fn translate_request(body: &str) -> Request {
    Request::builder()
        .method("POST")
        .uri(api::TRANSLATE_PATH)
        .header("content-type", "application/json")
        .header("authorization", CREDENTIAL)
        .body(body.to_owned())
        .build()
        .unwrap()
}

pub fn envelope(res: &Response) -> Envelope {
    serde_json::from_slice(res.body()).unwrap()
}
