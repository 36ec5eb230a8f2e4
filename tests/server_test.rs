//! Server wiring tests
//!
//! Tests the health decision and the metrics subscriber without binding a
//! socket.

mod common;

use axum::http::StatusCode;
use common::{sample_identity, sample_snapshot};
use fnos_monitor::config::EntityFilter;
use fnos_monitor::coordinator::CoordinatorState;
use fnos_monitor::metrics::MetricsCollector;
use fnos_monitor::sensor::build_entities;
use fnos_monitor::server::{health_status, sync_metrics_loop};
use std::sync::Arc;
use tokio::sync::watch;

fn state(success: bool) -> CoordinatorState {
    CoordinatorState {
        snapshot: Some(Arc::new(sample_snapshot())),
        last_update_success: success,
        ..Default::default()
    }
}

#[test]
fn test_health_follows_last_refresh() {
    assert_eq!(health_status(&state(true)).0, StatusCode::OK);
    assert_eq!(
        health_status(&state(false)).0,
        StatusCode::SERVICE_UNAVAILABLE
    );
    assert_eq!(
        health_status(&CoordinatorState::default()).0,
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_metrics_follow_published_states() {
    // Given: A metrics subscriber on a fresh coordinator channel
    let metrics = MetricsCollector::new().unwrap();
    let entities = build_entities(&sample_snapshot(), &sample_identity(), &EntityFilter::default());
    let (state_tx, state_rx) = watch::channel(Arc::new(CoordinatorState::default()));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let publisher = async {
        // When: A successful then a failed refresh are published
        state_tx.send_replace(Arc::new(state(true)));
        while metrics.refresh_total.get() < 1 {
            tokio::task::yield_now().await;
        }
        assert_eq!(metrics.up.get(), 1.0);

        state_tx.send_replace(Arc::new(state(false)));
        while metrics.refresh_total.get() < 2 {
            tokio::task::yield_now().await;
        }

        shutdown_tx.send(true).unwrap();
    };

    tokio::join!(
        sync_metrics_loop(&metrics, &entities, state_rx, shutdown_rx),
        publisher
    );

    // Then: Each state was recorded and the last one marks the device down
    assert_eq!(metrics.refresh_total.get(), 2);
    assert_eq!(metrics.refresh_failures_total.get(), 1);
    assert_eq!(metrics.up.get(), 0.0);
}

#[tokio::test]
async fn test_metrics_loop_stops_when_coordinator_is_dropped() {
    let metrics = MetricsCollector::new().unwrap();
    let (state_tx, state_rx) = watch::channel(Arc::new(CoordinatorState::default()));
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);

    drop(state_tx);
    sync_metrics_loop(&metrics, &[], state_rx, shutdown_rx).await;

    assert_eq!(metrics.refresh_total.get(), 0);
}
