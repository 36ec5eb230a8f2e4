//! HTTP Server and Coordinator Wiring
//!
//! This module sets up the fnOS entry, runs its coordinator and exposes the
//! resulting sensor entities over HTTP.
//!
//! # Architecture
//!
//! - **Setup**: [`setup_entry`] is retried with exponential backoff while the
//!   device is not ready; rejected credentials abort startup
//! - **Refresh Loop**: the coordinator refreshes every
//!   `update_interval_seconds` while at least one subscriber exists
//! - **Metrics Sync**: a subscriber task republishes Prometheus gauges after
//!   every completed refresh
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /health` - 200 if the last refresh succeeded, 503 otherwise
//! - `GET /entities` - JSON list of entity states
//! - `GET /snapshot` - JSON dump of the current snapshot

use crate::config::Config;
use crate::coordinator::CoordinatorState;
use crate::error::FnosError;
use crate::fnos::FnosClient;
use crate::integration::{setup_entry, Integration};
use crate::metrics::MetricsCollector;
use crate::sensor::SensorEntity;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Duration;
use tracing::{error, info, warn};

const SETUP_RETRY_INITIAL: Duration = Duration::from_secs(5);
const SETUP_RETRY_MAX: Duration = Duration::from_secs(300);

struct AppState<C> {
    metrics: MetricsCollector,
    integration: Integration<C>,
}

type SharedState = Arc<AppState<FnosClient>>;

pub async fn start(config: Config) -> anyhow::Result<()> {
    let metrics = MetricsCollector::new()?;

    let integration = setup_with_retry(&config).await?;
    if let Some(identity) = integration.coordinator.identity() {
        metrics.set_device_info(identity);
    }
    metrics.record_refresh(true);
    metrics.update_from_entities(&integration.entities, &integration.coordinator.state());

    let state: SharedState = Arc::new(AppState {
        metrics,
        integration,
    });

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Subscribe before the loop starts so the first tick sees a consumer
    let updates = state.integration.coordinator.subscribe();
    let sync_task = {
        let state = state.clone();
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            sync_metrics_loop(&state.metrics, &state.integration.entities, updates, shutdown)
                .await
        })
    };

    let refresh_task = {
        let coordinator = state.integration.coordinator.clone();
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move { coordinator.run(shutdown).await })
    };

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/entities", get(entities_handler))
        .route("/snapshot", get(snapshot_handler))
        .with_state(state.clone());

    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let serve_result = axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Received Ctrl-C, shutting down");
            }
        })
        .await;

    let _ = shutdown_tx.send(true);
    if let Err(e) = refresh_task.await {
        warn!("Refresh task ended abnormally: {}", e);
    }
    if let Err(e) = sync_task.await {
        warn!("Metrics sync task ended abnormally: {}", e);
    }
    state.integration.unload().await;

    serve_result?;
    Ok(())
}

/// Run [`setup_entry`] until it succeeds, backing off while the device is
/// not ready.
async fn setup_with_retry(config: &Config) -> anyhow::Result<Integration<FnosClient>> {
    let mut delay = SETUP_RETRY_INITIAL;

    loop {
        let client = FnosClient::new(config.fnos.use_tls, config.fnos.verify_ssl);
        match setup_entry(&config.fnos, client, &config.coordinator, &config.entities).await {
            Ok(integration) => {
                info!(
                    "[{}] Setup complete with {} entities",
                    integration.coordinator.title(),
                    integration.entities.len()
                );
                return Ok(integration);
            }
            Err(FnosError::Auth(reason)) => {
                error!("Invalid authentication: {}", reason);
                anyhow::bail!("fnOS rejected the configured credentials: {}", reason);
            }
            Err(e) => {
                warn!("Setup not ready ({}), retrying in {:?}", e, delay);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = tokio::signal::ctrl_c() => anyhow::bail!("Interrupted during setup"),
                }
                delay = (delay * 2).min(SETUP_RETRY_MAX);
            }
        }
    }
}

/// Republish metrics whenever the coordinator publishes a new state.
///
/// Returns when `shutdown` changes or the coordinator is dropped.
pub async fn sync_metrics_loop(
    metrics: &MetricsCollector,
    entities: &[SensorEntity],
    mut updates: watch::Receiver<Arc<CoordinatorState>>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = updates.borrow_and_update().clone();
                metrics.record_refresh(current.last_update_success);
                metrics.update_from_entities(entities, &current);
            }
        }
    }
}

async fn root_handler() -> impl IntoResponse {
    axum::response::Html(
        r#"<html>
<head><title>fnOS Monitor</title></head>
<body>
<h1>fnOS Monitor</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/entities">Entities</a></p>
<p><a href="/snapshot">Snapshot</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

async fn metrics_handler(State(state): State<SharedState>) -> Response {
    match state.metrics.render() {
        Ok(metrics) => metrics.into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

/// `/health` status for a coordinator state.
pub fn health_status(state: &CoordinatorState) -> (StatusCode, &'static str) {
    if state.last_update_success {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "fnOS refresh failing")
    }
}

async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    health_status(&state.integration.coordinator.state())
}

async fn entities_handler(State(state): State<SharedState>) -> impl IntoResponse {
    Json(state.integration.entity_states())
}

async fn snapshot_handler(State(state): State<SharedState>) -> Response {
    match state.integration.coordinator.state().snapshot.clone() {
        Some(snapshot) => Json(snapshot.as_ref().clone()).into_response(),
        None => (StatusCode::SERVICE_UNAVAILABLE, "No snapshot yet").into_response(),
    }
}
