use crate::coordinator::CoordinatorState;
use crate::device::DeviceInfo;
use crate::fnos::types::{DiskRecord, NetInterface, Snapshot, Volume};
use crate::sensor::descriptors::{
    DeviceClass, EntityCategory, SensorDescription, StateClass, StateValue, Unit,
};
use serde::Serialize;
use std::fmt;

/// Presentation metadata copied out of a descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SensorMetadata {
    pub key: &'static str,
    pub unit: Option<Unit>,
    pub suggested_unit: Option<Unit>,
    pub suggested_display_precision: Option<u8>,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
    pub entity_category: Option<EntityCategory>,
    pub enabled_by_default: bool,
}

impl<T> SensorDescription<T> {
    pub fn metadata(&self) -> SensorMetadata {
        SensorMetadata {
            key: self.key,
            unit: self.unit,
            suggested_unit: self.suggested_unit,
            suggested_display_precision: self.suggested_display_precision,
            device_class: self.device_class,
            state_class: self.state_class,
            entity_category: self.entity_category,
            enabled_by_default: self.enabled_by_default,
        }
    }
}

/// Where in the snapshot an entity reads its value from.
enum Source {
    System(&'static SensorDescription<Snapshot>),
    Volume {
        name: String,
        description: &'static SensorDescription<Volume>,
    },
    Disk {
        name: String,
        description: &'static SensorDescription<DiskRecord>,
    },
    NetworkInterface {
        name: String,
        description: &'static SensorDescription<NetInterface>,
    },
}

/// A sensor bound to one descriptor and one target.
///
/// Holds no readings of its own; values are computed from the coordinator's
/// current snapshot on every call.
pub struct SensorEntity {
    unique_id: String,
    device: DeviceInfo,
    metadata: SensorMetadata,
    source: Source,
}

/// Point-in-time view of an entity, as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub unique_id: String,
    pub device: String,
    pub target: Option<String>,
    #[serde(flatten)]
    pub metadata: SensorMetadata,
    pub available: bool,
    pub value: Option<StateValue>,
}

impl SensorEntity {
    pub fn system(
        machine_id: &str,
        device: DeviceInfo,
        description: &'static SensorDescription<Snapshot>,
    ) -> Self {
        Self {
            unique_id: format!("{}_{}", machine_id, description.key),
            device,
            metadata: description.metadata(),
            source: Source::System(description),
        }
    }

    /// Entity of a child device; `device.identifier` is the `{machine_id}_{child_key}` prefix.
    pub fn volume(
        device: DeviceInfo,
        volume: &Volume,
        description: &'static SensorDescription<Volume>,
    ) -> Self {
        Self {
            unique_id: format!("{}_{}", device.identifier, description.key),
            device,
            metadata: description.metadata(),
            source: Source::Volume {
                name: volume.name.clone(),
                description,
            },
        }
    }

    pub fn disk(
        device: DeviceInfo,
        disk: &DiskRecord,
        description: &'static SensorDescription<DiskRecord>,
    ) -> Self {
        Self {
            unique_id: format!("{}_{}", device.identifier, description.key),
            device,
            metadata: description.metadata(),
            source: Source::Disk {
                name: disk.name().to_string(),
                description,
            },
        }
    }

    pub fn network_interface(
        device: DeviceInfo,
        interface: &NetInterface,
        description: &'static SensorDescription<NetInterface>,
    ) -> Self {
        Self {
            unique_id: format!("{}_{}", device.identifier, description.key),
            device,
            metadata: description.metadata(),
            source: Source::NetworkInterface {
                name: interface.name.clone(),
                description,
            },
        }
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn key(&self) -> &'static str {
        self.metadata.key
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn metadata(&self) -> &SensorMetadata {
        &self.metadata
    }

    /// Name of the volume, disk or interface this entity reads; `None` for
    /// device-level sensors.
    pub fn target(&self) -> Option<&str> {
        match &self.source {
            Source::System(_) => None,
            Source::Volume { name, .. }
            | Source::Disk { name, .. }
            | Source::NetworkInterface { name, .. } => Some(name),
        }
    }

    /// Current value computed from `snapshot`. A target that is no longer
    /// present yields `None`.
    pub fn native_value(&self, snapshot: &Snapshot) -> Option<StateValue> {
        match &self.source {
            Source::System(description) => description.value(snapshot),
            Source::Volume { name, description } => {
                snapshot.volume(name).and_then(|v| description.value(v))
            }
            Source::Disk { name, description } => {
                snapshot.disk(name).and_then(|d| description.value(d))
            }
            Source::NetworkInterface { name, description } => {
                snapshot.interface(name).and_then(|i| description.value(i))
            }
        }
    }

    /// Entities are available exactly when the last refresh succeeded.
    pub fn available(&self, state: &CoordinatorState) -> bool {
        state.last_update_success
    }

    pub fn state(&self, state: &CoordinatorState) -> EntityState {
        let value = state
            .snapshot
            .as_deref()
            .and_then(|snapshot| self.native_value(snapshot));
        EntityState {
            unique_id: self.unique_id.clone(),
            device: self.device.name.clone(),
            target: self.target().map(str::to_string),
            metadata: self.metadata,
            available: self.available(state),
            value,
        }
    }
}

impl fmt::Debug for SensorEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SensorEntity")
            .field("unique_id", &self.unique_id)
            .field("key", &self.metadata.key)
            .field("device", &self.device.identifier)
            .field("target", &self.target())
            .finish()
    }
}
