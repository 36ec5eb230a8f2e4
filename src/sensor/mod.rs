//! Sensor Platform
//!
//! Builds the entity set for one device by cross-producing each descriptor
//! table with its targets in the first snapshot:
//!
//! - device-level tables × the NAS itself
//! - volume table × each selected volume
//! - disk table × each selected disk
//! - interface table × each selected network interface

pub mod descriptors;
pub mod entity;

pub use descriptors::{SensorDescription, StateValue, Unit};
pub use entity::{EntityState, SensorEntity, SensorMetadata};

use crate::config::EntityFilter;
use crate::device::DeviceIdentity;
use crate::fnos::types::Snapshot;
use descriptors::{
    HW_SENSORS, INFORMATION_SENSORS, NETWORK_IFS_SENSORS, STORAGE_DISK_SENSORS,
    STORAGE_VOL_SENSORS, UTILISATION_SENSORS,
};
use tracing::{info, warn};

pub fn build_entities(
    snapshot: &Snapshot,
    identity: &DeviceIdentity,
    filter: &EntityFilter,
) -> Vec<SensorEntity> {
    let mut entities: Vec<SensorEntity> = UTILISATION_SENSORS
        .iter()
        .chain(INFORMATION_SENSORS)
        .chain(HW_SENSORS)
        .map(|description| {
            SensorEntity::system(&identity.machine_id, identity.device.clone(), description)
        })
        .collect();

    let volumes = select(
        &snapshot.store.array,
        filter.volumes.as_deref(),
        |v| v.name.as_str(),
        "volume",
    );
    for volume in volumes {
        let device = identity.volume_device(volume);
        entities.extend(
            STORAGE_VOL_SENSORS
                .iter()
                .map(|description| SensorEntity::volume(device.clone(), volume, description)),
        );
    }

    let disks = select(
        &snapshot.disks,
        filter.disks.as_deref(),
        |d| d.name(),
        "disk",
    );
    for disk in disks {
        let device = identity.disk_device(disk);
        entities.extend(
            STORAGE_DISK_SENSORS
                .iter()
                .map(|description| SensorEntity::disk(device.clone(), disk, description)),
        );
    }

    let interfaces = select(
        &snapshot.network.ifs,
        filter.network_ifs.as_deref(),
        |i| i.name.as_str(),
        "network interface",
    );
    for interface in interfaces {
        let device = identity.interface_device(&interface.name);
        entities.extend(NETWORK_IFS_SENSORS.iter().map(|description| {
            SensorEntity::network_interface(device.clone(), interface, description)
        }));
    }

    info!(
        "Created {} sensor entities for {}",
        entities.len(),
        identity.device.name
    );
    entities
}

/// All `items`, or only the `wanted` names in the listed order.
///
/// A name listed more than once selects its target once.
fn select<'a, T>(
    items: &'a [T],
    wanted: Option<&[String]>,
    name: fn(&T) -> &str,
    category: &str,
) -> Vec<&'a T> {
    let Some(names) = wanted else {
        return items.iter().collect();
    };

    let mut selected: Vec<&'a T> = Vec::with_capacity(names.len());
    for wanted_name in names {
        let Some(found) = items.iter().find(|item| name(item) == wanted_name) else {
            warn!("Configured {} '{}' not found on device", category, wanted_name);
            continue;
        };
        if selected.iter().any(|item| std::ptr::eq(*item, found)) {
            warn!("Configured {} '{}' listed more than once", category, wanted_name);
            continue;
        }
        selected.push(found);
    }
    selected
}
