//! fnOS API Type Definitions
//!
//! Rust structs for the fnOS management API payloads and the aggregate
//! [`Snapshot`] built from them.
//!
//! # Design Notes
//!
//! - **Serde Defaults**: `#[serde(default)]` is used extensively; the device
//!   omits fields depending on hardware and firmware.
//! - **Optional Fields**: numeric readings that may be absent are `Option<T>`
//!   so sensors can report an unknown state instead of a fake zero.
//! - **Naming**: the device uses camelCase for most keys; SMART and
//!   resource-monitor payloads are lower/snake case.
//!
//! # API Requests Covered
//!
//! - `appcgi.sysinfo.getHostName` → [`HostName`]
//! - `appcgi.sysinfo.getUptime` → [`Uptime`]
//! - `appcgi.sysinfo.getMachineId` → [`MachineId`]
//! - `appcgi.sysinfo.getHardwareInfo` → [`HardwareInfo`]
//! - `appcgi.resmon.cpu` → [`CpuStats`]
//! - `appcgi.resmon.mem` → [`MemoryStats`]
//! - `appcgi.resmon.disk` → [`DiskMonitoringList`]
//! - `appcgi.resmon.net` → [`NetworkStats`]
//! - `stor.general` → [`StoreSummary`]
//! - `stor.listDisk` → [`DiskList`]
//! - `stor.diskSmart` → [`DiskSmart`]
//!
//! # Framing
//!
//! - [`FnosRequest`] - Outgoing request frame
//! - [`FnosResponse`] - Incoming response frame

#![allow(dead_code)] // Allow unused fields in API structs for completeness
use serde::{Deserialize, Serialize};

/// Outgoing request frame
#[derive(Debug, Serialize)]
pub struct FnosRequest {
    pub req: String,
    pub reqid: String,
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// Incoming response frame
///
/// Everything other than the framing fields lands in `body`.
#[derive(Debug, Deserialize)]
pub struct FnosResponse {
    #[serde(default)]
    pub reqid: Option<String>,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub errno: Option<i64>,
    #[serde(flatten)]
    pub body: serde_json::Map<String, serde_json::Value>,
}

impl FnosResponse {
    pub fn is_success(&self) -> bool {
        self.result.as_deref() == Some("succ")
    }
}

/// Result of `user.login`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LoginResult {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HostName {
    /// Device name as editable in the fnOS settings page.
    #[serde(default)]
    pub host_name: String,
    #[serde(default)]
    pub trim_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Uptime {
    #[serde(default)]
    pub uptime: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MachineId {
    pub machine_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HardwareInfo {
    #[serde(default)]
    pub cpu: HardwareCpu,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HardwareCpu {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CpuStats {
    #[serde(default)]
    pub cpu: CpuInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CpuInfo {
    #[serde(default)]
    pub busy: CpuBusy,
    #[serde(default)]
    pub loadavg: LoadAverage,
    /// Per-package temperatures in Celsius.
    #[serde(default)]
    pub temp: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CpuBusy {
    pub user: Option<f64>,
    pub system: Option<f64>,
    pub other: Option<f64>,
    pub all: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LoadAverage {
    #[serde(rename = "avg1min")]
    pub avg_1min: Option<f64>,
    #[serde(rename = "avg5min")]
    pub avg_5min: Option<f64>,
    #[serde(rename = "avg15min")]
    pub avg_15min: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MemoryStats {
    #[serde(default)]
    pub mem: MemInfo,
    #[serde(default)]
    pub swap: SwapInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MemInfo {
    pub total: Option<u64>,
    pub used: Option<u64>,
    pub free: Option<u64>,
    pub cached: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SwapInfo {
    pub total: Option<u64>,
    pub free: Option<u64>,
}

/// Storage-array summary from `stor.general`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StoreSummary {
    #[serde(default)]
    pub array: Vec<Volume>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Volume {
    pub name: String,
    #[serde(default)]
    pub uuid: Option<String>,
    /// Filesystem size in bytes.
    #[serde(default)]
    pub fssize: Option<u64>,
    /// Free filesystem bytes.
    #[serde(default)]
    pub frsize: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NetworkStats {
    #[serde(default)]
    pub ifs: Vec<NetInterface>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NetInterface {
    pub name: String,
    /// Bytes per second.
    #[serde(default)]
    pub receive: Option<f64>,
    /// Bytes per second.
    #[serde(default)]
    pub transmit: Option<f64>,
}

/// Disk enumeration from `stor.listDisk`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DiskList {
    #[serde(default)]
    pub disk: Vec<DiskInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DiskInfo {
    pub name: String,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    /// Remaining static attributes, kept as returned.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Disk readings from `appcgi.resmon.disk`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DiskMonitoringList {
    #[serde(default)]
    pub disk: Vec<DiskMonitoring>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DiskMonitoring {
    pub name: String,
    /// Temperature in Celsius.
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// SMART reading from `stor.diskSmart`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DiskSmart {
    #[serde(default)]
    pub smart_status: Option<SmartStatus>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SmartStatus {
    #[serde(default)]
    pub passed: bool,
}

/// One enumerated disk with its monitoring and SMART readings merged in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskRecord {
    #[serde(flatten)]
    pub info: DiskInfo,
    pub monitoring: Option<DiskMonitoring>,
    pub smart: Option<DiskSmart>,
}

impl DiskRecord {
    pub fn name(&self) -> &str {
        &self.info.name
    }
}

/// Aggregate result of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub uptime: Uptime,
    pub host_name: HostName,
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub store: StoreSummary,
    pub disks: Vec<DiskRecord>,
    pub network: NetworkStats,
}

impl Snapshot {
    pub fn volume(&self, name: &str) -> Option<&Volume> {
        self.store.array.iter().find(|v| v.name == name)
    }

    pub fn disk(&self, name: &str) -> Option<&DiskRecord> {
        self.disks.iter().find(|d| d.name() == name)
    }

    pub fn interface(&self, name: &str) -> Option<&NetInterface> {
        self.network.ifs.iter().find(|i| i.name == name)
    }
}
