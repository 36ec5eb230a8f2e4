//! Device identity and child-device records.

use crate::fnos::types::{DiskRecord, HardwareInfo, HostName, MachineId, Volume};
use serde::Serialize;

pub const MANUFACTURER: &str = "fnOS";

/// Registry-style description of a device entities attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    pub identifier: String,
    pub name: String,
    pub manufacturer: String,
    pub model: Option<String>,
    pub sw_version: Option<String>,
    /// Identifier of the parent device, for child devices.
    pub via_device: Option<String>,
}

/// Identity of the NAS, fetched once during setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    pub machine_id: String,
    pub device: DeviceInfo,
}

impl DeviceIdentity {
    pub fn new(machine_id: MachineId, host_name: &HostName, hardware: &HardwareInfo) -> Self {
        let machine_id = machine_id.machine_id;
        let device = DeviceInfo {
            identifier: machine_id.clone(),
            name: host_name.host_name.clone(),
            manufacturer: MANUFACTURER.to_string(),
            model: hardware.cpu.name.clone(),
            sw_version: host_name.trim_version.clone(),
            via_device: None,
        };
        Self { machine_id, device }
    }

    /// `{machine_id}_{child_key}`
    pub fn child_identifier(&self, child_key: &str) -> String {
        format!("{}_{}", self.machine_id, child_key)
    }

    fn child(
        &self,
        child_key: &str,
        child_name: &str,
        manufacturer: Option<&str>,
        model: Option<&str>,
    ) -> DeviceInfo {
        DeviceInfo {
            identifier: self.child_identifier(child_key),
            name: format!("{} ({})", self.device.name, child_name),
            manufacturer: manufacturer.unwrap_or(MANUFACTURER).to_string(),
            model: model.map(str::to_string),
            sw_version: self.device.sw_version.clone(),
            via_device: Some(self.machine_id.clone()),
        }
    }

    pub fn volume_device(&self, volume: &Volume) -> DeviceInfo {
        self.child(
            &volume_key(volume),
            &volume.name,
            None,
            Some("Volume"),
        )
    }

    pub fn disk_device(&self, disk: &DiskRecord) -> DeviceInfo {
        self.child(
            &disk_key(disk),
            disk.name(),
            disk.info.vendor.as_deref(),
            disk.info.model_name.as_deref(),
        )
    }

    pub fn interface_device(&self, name: &str) -> DeviceInfo {
        self.child(name, name, None, Some("IFS"))
    }
}

/// Child key of a volume: its uuid, or its name when the uuid is missing.
pub fn volume_key(volume: &Volume) -> String {
    volume
        .uuid
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| volume.name.clone())
}

/// Child key of a disk: its serial number, or its name when unknown.
pub fn disk_key(disk: &DiskRecord) -> String {
    disk.info
        .serial_number
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| disk.name().to_string())
}
