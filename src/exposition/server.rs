use super::text::{CONTENT_TYPE, render};
use crate::Result;
use crate::metrics::Collector;
use crate::status::StatusSource;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE as CONTENT_TYPE_HEADER;
use axum::response::IntoResponse;
use axum::routing::get;
use core::net::SocketAddr;
use core::time::Duration;
use ohno::IntoAppError;
use std::sync::Arc;
use tokio::signal;

const LOG_TARGET: &str = "    server";

/// Everything a scrape needs; shared by all requests.
#[derive(Debug, Clone)]
pub struct ScrapeState {
    collector: Arc<Collector>,
    source: Arc<StatusSource>,
    fetch_timeout: Duration,
}

impl ScrapeState {
    #[must_use]
    pub fn new(collector: Collector, source: StatusSource, fetch_timeout: Duration) -> Self {
        Self {
            collector: Arc::new(collector),
            source: Arc::new(source),
            fetch_timeout,
        }
    }

    /// Fetch a fresh document, run one pass, and render the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be fetched or parsed.
    pub async fn scrape(&self) -> Result<String> {
        let bytes = self.source.fetch(self.fetch_timeout).await?;
        let families = self.collector.collect_bytes(&bytes)?;
        Ok(render(&families))
    }
}

/// Build the scrape endpoint's routes.
pub fn router(state: ScrapeState) -> Router {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/health", get(health))
        .with_state(state)
}

/// Serve scrapes on `addr` until Ctrl-C or SIGTERM.
pub async fn serve(addr: SocketAddr, state: ScrapeState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .into_app_err_with(|| format!("binding to {addr}"))?;

    log::info!(target: LOG_TARGET, "Serving metrics for {} on http://{addr}/metrics", state.source);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .into_app_err("serving metrics")?;

    log::info!(target: LOG_TARGET, "Server shutdown complete");
    Ok(())
}

async fn metrics(State(state): State<ScrapeState>) -> impl IntoResponse {
    match state.scrape().await {
        Ok(body) => (StatusCode::OK, [(CONTENT_TYPE_HEADER, CONTENT_TYPE)], body),
        Err(e) => {
            log::error!(target: LOG_TARGET, "Could not retrieve status from {}: {e:#}", state.source);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                [(CONTENT_TYPE_HEADER, "text/plain; charset=utf-8")],
                format!("could not retrieve status: {e}\n"),
            )
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!(target: LOG_TARGET, "Could not listen for Ctrl-C: {e}");
            core::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                let _ = stream.recv().await;
            }
            Err(e) => {
                log::error!(target: LOG_TARGET, "Could not listen for SIGTERM: {e}");
                core::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = core::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    log::info!(target: LOG_TARGET, "Shutdown signal received");
}
