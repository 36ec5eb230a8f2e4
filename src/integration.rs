//! Config-entry lifecycle: set up one device, expose its entities, unload.

use crate::config::{CoordinatorConfig, EntityFilter, FnosConfig};
use crate::coordinator::{Coordinator, CoordinatorState};
use crate::error::{FnosError, Result};
use crate::fnos::FnosApi;
use crate::sensor::{self, EntityState, SensorEntity};
use std::sync::Arc;
use tracing::{info, warn};

/// A set-up device: its coordinator and the entities built from the first
/// snapshot.
pub struct Integration<C> {
    pub coordinator: Arc<Coordinator<C>>,
    pub entities: Vec<SensorEntity>,
}

impl<C: FnosApi> Integration<C> {
    pub fn entity_states(&self) -> Vec<EntityState> {
        let state = self.coordinator.state();
        self.entity_states_for(&state)
    }

    pub fn entity_states_for(&self, state: &CoordinatorState) -> Vec<EntityState> {
        self.entities.iter().map(|e| e.state(state)).collect()
    }

    pub async fn unload(&self) {
        info!("[{}] Unloading integration", self.coordinator.title());
        self.coordinator.shutdown().await;
    }
}

/// Connect, log in, run the first refresh and build entities.
///
/// Returns [`FnosError::Auth`] when the device rejects the credentials and
/// [`FnosError::NotReady`] for anything that may succeed on a later attempt.
/// No entities are created on failure.
pub async fn setup_entry<C: FnosApi>(
    settings: &FnosConfig,
    client: C,
    coordinator_config: &CoordinatorConfig,
    filter: &EntityFilter,
) -> Result<Integration<C>> {
    let title = settings.title();
    info!("[{}] Setting up fnOS entry", title);

    client
        .connect(&settings.host)
        .await
        .map_err(FnosError::not_ready)?;

    let login = match client.login(&settings.username, &settings.password).await {
        Ok(login) => login,
        Err(FnosError::Auth(reason)) => {
            let _ = client.disconnect().await;
            return Err(FnosError::Auth(reason));
        }
        Err(e) => {
            let _ = client.disconnect().await;
            return Err(FnosError::not_ready(e));
        }
    };
    if !login.success {
        warn!("[{}] Login rejected for {}", title, settings.username);
        let _ = client.disconnect().await;
        return Err(FnosError::Auth(format!(
            "login rejected for user '{}'",
            settings.username
        )));
    }

    let coordinator = Arc::new(Coordinator::new(client, title, coordinator_config));
    if let Err(e) = coordinator.first_refresh().await {
        coordinator.shutdown().await;
        return Err(e);
    }

    let state = coordinator.state();
    let (Some(identity), Some(snapshot)) = (coordinator.identity(), state.snapshot.as_deref())
    else {
        coordinator.shutdown().await;
        return Err(FnosError::not_ready(FnosError::Api(
            "first refresh produced no data".to_string(),
        )));
    };

    let entities = sensor::build_entities(snapshot, identity, filter);

    Ok(Integration {
        coordinator,
        entities,
    })
}
