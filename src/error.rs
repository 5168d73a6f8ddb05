//! Infrastructure error type.

/// The error type returned by the gateway's fallible startup operations.
///
/// Request-level failures (bad input, backend trouble, panics) are expressed
/// as envelope [`Response`](crate::Response) values, never as `Error`s. This
/// type surfaces process-level failures: parsing a listen address, binding a
/// port, building the backend client, or installing the metrics recorder.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid listen address `{addr}`: {source}")]
    Addr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("config: {0}")]
    Config(String),

    #[error("metrics: {0}")]
    Metrics(String),

    #[error("http client: {0}")]
    Client(#[from] reqwest::Error),
}
