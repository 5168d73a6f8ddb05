//! `GoogleTranslator` against a throwaway local HTTP backend.

use std::time::Duration;

use lingo_gate::translate::ShapeMismatch;
use lingo_gate::{BackendConfig, GoogleTranslator, TranslateError, Translator};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

/// Accepts one connection and reads the request head, returning the stream
/// and the request line.
async fn accept_request(listener: TcpListener) -> (TcpStream, String) {
    let (mut stream, _) = listener.accept().await.unwrap();
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        head.extend_from_slice(&buf[..n]);
    }
    let request_line = String::from_utf8_lossy(&head).lines().next().unwrap_or_default().to_owned();
    (stream, request_line)
}

async fn local_listener() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/translate_a/single", listener.local_addr().unwrap());
    (listener, url)
}

/// Writes `raw` verbatim as the whole answer, then closes.
async fn raw_backend(raw: String) -> (String, oneshot::Receiver<String>) {
    let (listener, url) = local_listener().await;
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut stream, request_line) = accept_request(listener).await;
        let _ = tx.send(request_line);
        stream.write_all(raw.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
    });

    (url, rx)
}

/// Serves exactly one canned response and reports the request line it saw.
async fn stub_backend(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
    raw_backend(format!(
        "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
        body.len()
    ))
    .await
}

fn translator(url: String) -> GoogleTranslator {
    GoogleTranslator::new(&BackendConfig { url, timeout: Duration::from_secs(5) }).unwrap()
}

#[tokio::test]
async fn extracts_first_fragment_and_sends_expected_query() {
    let (url, seen) = stub_backend("200 OK", r#"[[["Hola","Hello",null,null,3]],null,"en"]"#).await;

    let text = translator(url).translate("Hello & goodbye", "en", "es").await.unwrap();
    assert_eq!(text, "Hola");

    let request_line = seen.await.unwrap();
    assert!(request_line.starts_with("GET /translate_a/single?"), "{request_line}");
    for part in ["client=gtx", "sl=en", "tl=es", "dt=t", "q=Hello+%26+goodbye"] {
        assert!(request_line.contains(part), "missing {part} in {request_line}");
    }
}

#[tokio::test]
async fn empty_array_is_no_translation_data() {
    let (url, _) = stub_backend("200 OK", "[]").await;

    let err = translator(url).translate("Hello", "en", "es").await.unwrap_err();
    assert!(
        matches!(err, TranslateError::NoTranslationData(ShapeMismatch::EmptyPayload)),
        "{err:?}"
    );
    assert!(!err.is_retriable());
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let (url, _) = stub_backend("200 OK", "<html>rate limited</html>").await;

    let err = translator(url).translate("Hello", "en", "es").await.unwrap_err();
    assert!(matches!(err, TranslateError::BackendMalformedResponse(_)), "{err:?}");
}

#[tokio::test]
async fn error_status_is_rejected() {
    let (url, _) = stub_backend("503 Service Unavailable", "{}").await;

    let err = translator(url).translate("Hello", "en", "es").await.unwrap_err();
    assert!(matches!(err, TranslateError::BackendRejected { status: 503 }), "{err:?}");
    assert!(err.is_retriable());
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}/translate_a/single", listener.local_addr().unwrap());
    drop(listener);

    let err = translator(url).translate("Hello", "en", "es").await.unwrap_err();
    assert!(matches!(err, TranslateError::BackendUnreachable(_)), "{err:?}");
}

#[tokio::test]
async fn truncated_body_is_read_failure() {
    let (url, _) = raw_backend(
        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n[[[\"Hol".to_owned(),
    )
    .await;

    let err = translator(url).translate("Hello", "en", "es").await.unwrap_err();
    assert!(matches!(err, TranslateError::BackendReadFailed(_)), "{err:?}");
    assert!(err.is_retriable());
}

#[tokio::test]
async fn silent_backend_times_out_as_unreachable() {
    let (listener, url) = local_listener().await;
    tokio::spawn(async move {
        let (stream, _) = accept_request(listener).await;
        tokio::time::sleep(Duration::from_secs(30)).await;
        drop(stream);
    });

    let config = BackendConfig { url, timeout: Duration::from_millis(100) };
    let started = std::time::Instant::now();
    let err = GoogleTranslator::new(&config).unwrap().translate("Hello", "en", "es").await.unwrap_err();

    assert!(started.elapsed() < Duration::from_secs(5));
    match err {
        TranslateError::BackendUnreachable(inner) => assert!(inner.is_timeout(), "{inner:?}"),
        other => panic!("expected a timeout, got {other:?}"),
    }
}
