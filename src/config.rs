//! Process configuration: command-line flags with environment fallbacks.
//!
//! | Flag | Env | Default |
//! |---|---|---|
//! | `--listen-address` | `LISTEN_ADDRESS` | `:8080` |
//! | `--metrics-address` | `METRICS_ADDRESS` | unset (no metrics listener; conventionally `:2112`) |
//! | `--backend-url` | `TRANSLATE_BACKEND_URL` | Google `translate_a/single` |
//! | `--backend-timeout` | `TRANSLATE_BACKEND_TIMEOUT` | `10` s |
//! | `--read-timeout` | `READ_TIMEOUT` | `60` s |
//! | `--max-body-bytes` | `MAX_BODY_BYTES` | `1048576` |
//! | `--shutdown-grace` | `SHUTDOWN_GRACE` | `5` s |
//! | `--authorization` | `TRANSLATOR_AUTHORIZATION` | built-in credential |
//! | (none) | `COMMIT_ID` | empty; reported as the build version |

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

use crate::error::Error;
use crate::server::DEFAULT_MAX_BODY_BYTES;
use crate::translate::{BackendConfig, DEFAULT_BACKEND_URL};

/// Shared secret every translate call must present in `Authorization`.
pub const DEFAULT_CREDENTIAL: &str = "Basic bXl0cmFuc2xhdG9yOnRoaXNpc2FwYXNzd29yZA==";

#[derive(Debug, Clone, Parser)]
#[command(name = "lingo-gate", about = "Translation API gateway")]
pub struct Config {
    /// The address to listen on for HTTP requests.
    #[arg(long, env = "LISTEN_ADDRESS", default_value = ":8080")]
    pub listen_address: String,

    /// The address to listen on for Prometheus metrics requests (e.g. `:2112`).
    #[arg(long, env = "METRICS_ADDRESS")]
    pub metrics_address: Option<String>,

    /// Translation provider endpoint.
    #[arg(long, env = "TRANSLATE_BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    pub backend_url: String,

    /// Seconds a single backend call may take, connect included.
    #[arg(long, env = "TRANSLATE_BACKEND_TIMEOUT", default_value_t = 10)]
    pub backend_timeout: u64,

    /// Seconds a client has to deliver its request body.
    #[arg(long, env = "READ_TIMEOUT", default_value_t = 60)]
    pub read_timeout: u64,

    /// Largest request body, in bytes, the gateway will buffer.
    #[arg(long, env = "MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Seconds in-flight requests get to finish after a shutdown signal.
    #[arg(long, env = "SHUTDOWN_GRACE", default_value_t = 5)]
    pub shutdown_grace: u64,

    /// Expected `Authorization` header value.
    #[arg(long, env = "TRANSLATOR_AUTHORIZATION", default_value = DEFAULT_CREDENTIAL, hide_default_value = true, hide_env_values = true)]
    pub authorization: String,

    /// Build identifier, normally injected by the deployment.
    #[arg(long, env = "COMMIT_ID", default_value = "", hide = true)]
    pub commit_id: String,
}

impl Config {
    pub fn backend(&self) -> BackendConfig {
        BackendConfig {
            url: self.backend_url.clone(),
            timeout: Duration::from_secs(self.backend_timeout),
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace)
    }
}

/// Parses a listen address. A bare `:port` means every interface.
pub fn parse_listen_address(addr: &str) -> Result<SocketAddr, Error> {
    let full = match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => addr.to_owned(),
    };
    full.parse().map_err(|source| Error::Addr { addr: addr.to_owned(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_table() {
        let config = Config::try_parse_from(["lingo-gate"]).unwrap();
        assert_eq!(config.listen_address, ":8080");
        assert!(config.metrics_address.is_none());
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
        assert_eq!(config.backend().timeout, Duration::from_secs(10));
        assert_eq!(config.read_timeout(), Duration::from_secs(60));
        assert_eq!(config.shutdown_grace(), Duration::from_secs(5));
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.authorization, DEFAULT_CREDENTIAL);
    }

    #[test]
    fn flags_override_defaults() {
        let config = Config::try_parse_from([
            "lingo-gate",
            "--listen-address",
            "127.0.0.1:9000",
            "--metrics-address",
            ":2112",
            "--shutdown-grace",
            "1",
        ])
        .unwrap();
        assert_eq!(config.listen_address, "127.0.0.1:9000");
        assert_eq!(config.metrics_address.as_deref(), Some(":2112"));
        assert_eq!(config.shutdown_grace(), Duration::from_secs(1));
    }

    #[test]
    fn bare_port_listens_everywhere() {
        assert_eq!(parse_listen_address(":8080").unwrap(), "0.0.0.0:8080".parse().unwrap());
        assert_eq!(parse_listen_address("127.0.0.1:3000").unwrap().port(), 3000);
    }

    #[test]
    fn bad_address_is_an_error() {
        assert!(matches!(parse_listen_address("nowhere"), Err(Error::Addr { .. })));
        assert!(matches!(parse_listen_address(":http"), Err(Error::Addr { .. })));
    }
}
