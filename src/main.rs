//! Process entry point: configuration, logging, metrics, both listeners.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info, info_span, Instrument};

use lingo_gate::config::Config;
use lingo_gate::logging::{init_logging, LoggingConfig};
use lingo_gate::metrics::{self, Counters};
use lingo_gate::{api, shutdown_signal, GoogleTranslator, Server};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();
    init_logging(&LoggingConfig::from_env());

    let root = info_span!("translator", version = %config.commit_id);
    match run(config).instrument(root).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "translator API service failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), lingo_gate::Error> {
    info!(event_id = %uuid::Uuid::now_v7(), "starting translator API service");

    let translator = GoogleTranslator::new(&config.backend())?;
    let state = api::AppState::new(Arc::new(translator), Arc::new(Counters::new()));

    // One signal, observed by every listener.
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = stop_tx.send(true);
    });

    let metrics_listener = match &config.metrics_address {
        Some(addr) => {
            let handle = metrics::install_prometheus()?;
            let server = Server::bind(addr)?.grace_period(config.shutdown_grace());
            let stop = stopped(stop_rx.clone());
            info!(addr = %addr, "translator API Prometheus metrics enabled");
            Some(tokio::spawn(async move {
                if let Err(e) = server.serve_with_shutdown(metrics::router(handle), stop).await {
                    error!(error = %e, "starting Prometheus listener failed");
                }
            }.in_current_span()))
        }
        None => None,
    };

    let result = Server::bind(&config.listen_address)?
        .grace_period(config.shutdown_grace())
        .read_timeout(config.read_timeout())
        .max_body_bytes(config.max_body_bytes)
        .serve_with_shutdown(api::router(state, &config.authorization), stopped(stop_rx))
        .await;

    if let Some(task) = metrics_listener {
        if result.is_err() {
            task.abort();
        }
        let _ = task.await;
    }

    result
}

async fn stopped(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}
