//! Sensor Descriptor Tables
//!
//! Each table is an immutable list of [`SensorDescription`]s. A description
//! pairs a metric key and its presentation metadata with a pure extraction
//! function over one snapshot fragment:
//!
//! - [`UTILISATION_SENSORS`], [`INFORMATION_SENSORS`], [`HW_SENSORS`] read the
//!   whole [`Snapshot`]
//! - [`STORAGE_VOL_SENSORS`] read one [`Volume`]
//! - [`STORAGE_DISK_SENSORS`] read one [`DiskRecord`]
//! - [`NETWORK_IFS_SENSORS`] read one [`NetInterface`]
//!
//! Extraction never panics: missing readings, a zero divisor or a byte count
//! beyond `i64::MAX` produce `None`.

use crate::fnos::types::{DiskRecord, NetInterface, Snapshot, Volume};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    #[serde(rename = "%")]
    Percentage,
    #[serde(rename = "load")]
    Load,
    #[serde(rename = "B")]
    Bytes,
    #[serde(rename = "MB")]
    Megabytes,
    #[serde(rename = "TB")]
    Terabytes,
    #[serde(rename = "B/s")]
    BytesPerSecond,
    #[serde(rename = "kB/s")]
    KilobytesPerSecond,
    #[serde(rename = "°C")]
    Celsius,
    #[serde(rename = "s")]
    Seconds,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Percentage => "%",
            Unit::Load => "load",
            Unit::Bytes => "B",
            Unit::Megabytes => "MB",
            Unit::Terabytes => "TB",
            Unit::BytesPerSecond => "B/s",
            Unit::KilobytesPerSecond => "kB/s",
            Unit::Celsius => "°C",
            Unit::Seconds => "s",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    DataSize,
    DataRate,
    Temperature,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StateClass {
    Measurement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityCategory {
    Diagnostic,
}

/// Value of a sensor at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StateValue {
    Float(f64),
    Int(i64),
    Text(String),
}

impl StateValue {
    /// Numeric view for gauge export; `None` for text states.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StateValue::Float(v) => Some(*v),
            StateValue::Int(v) => Some(*v as f64),
            StateValue::Text(_) => None,
        }
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Float(v) => write!(f, "{}", v),
            StateValue::Int(v) => write!(f, "{}", v),
            StateValue::Text(v) => f.write_str(v),
        }
    }
}

/// How to extract and present one metric from a fragment of type `T`.
pub struct SensorDescription<T> {
    pub key: &'static str,
    pub unit: Option<Unit>,
    pub suggested_unit: Option<Unit>,
    pub suggested_display_precision: Option<u8>,
    pub device_class: Option<DeviceClass>,
    pub state_class: Option<StateClass>,
    pub entity_category: Option<EntityCategory>,
    pub enabled_by_default: bool,
    pub value_fn: fn(&T) -> Option<StateValue>,
}

impl<T> SensorDescription<T> {
    pub fn value(&self, data: &T) -> Option<StateValue> {
        (self.value_fn)(data)
    }
}

fn float(v: Option<f64>) -> Option<StateValue> {
    v.map(StateValue::Float)
}

fn bytes(v: Option<u64>) -> Option<StateValue> {
    v.and_then(|b| i64::try_from(b).ok()).map(StateValue::Int)
}

/// `part / whole * 100`, or `None` when either is missing or `whole` is zero.
pub fn percentage(part: Option<u64>, whole: Option<u64>) -> Option<f64> {
    match (part, whole) {
        (Some(part), Some(whole)) if whole > 0 => Some(part as f64 / whole as f64 * 100.0),
        _ => None,
    }
}

fn first_cpu_temp(s: &Snapshot) -> Option<StateValue> {
    float(s.cpu.cpu.temp.first().copied())
}

fn volume_used(v: &Volume) -> Option<u64> {
    v.fssize?.checked_sub(v.frsize?)
}

pub static UTILISATION_SENSORS: &[SensorDescription<Snapshot>] = &[
    SensorDescription {
        key: "cpu_other_load",
        unit: Some(Unit::Percentage),
        suggested_unit: None,
        suggested_display_precision: None,
        device_class: None,
        state_class: Some(StateClass::Measurement),
        entity_category: None,
        enabled_by_default: false,
        value_fn: |s| float(s.cpu.cpu.busy.other),
    },
    SensorDescription {
        key: "cpu_user_load",
        unit: Some(Unit::Percentage),
        suggested_unit: None,
        suggested_display_precision: None,
        device_class: None,
        state_class: Some(StateClass::Measurement),
        entity_category: None,
        enabled_by_default: true,
        value_fn: |s| float(s.cpu.cpu.busy.user),
    },
    SensorDescription {
        key: "cpu_system_load",
        unit: Some(Unit::Percentage),
        suggested_unit: None,
        suggested_display_precision: None,
        device_class: None,
        state_class: Some(StateClass::Measurement),
        entity_category: None,
        enabled_by_default: false,
        value_fn: |s| float(s.cpu.cpu.busy.system),
    },
    SensorDescription {
        key: "cpu_total_load",
        unit: Some(Unit::Percentage),
        suggested_unit: None,
        suggested_display_precision: None,
        device_class: None,
        state_class: Some(StateClass::Measurement),
        entity_category: None,
        enabled_by_default: true,
        value_fn: |s| float(s.cpu.cpu.busy.all),
    },
    SensorDescription {
        key: "cpu_1min_load",
        unit: Some(Unit::Load),
        suggested_unit: None,
        suggested_display_precision: Some(2),
        device_class: None,
        state_class: None,
        entity_category: None,
        enabled_by_default: false,
        value_fn: |s| float(s.cpu.cpu.loadavg.avg_1min),
    },
    SensorDescription {
        key: "cpu_5min_load",
        unit: Some(Unit::Load),
        suggested_unit: None,
        suggested_display_precision: Some(2),
        device_class: None,
        state_class: None,
        entity_category: None,
        enabled_by_default: true,
        value_fn: |s| float(s.cpu.cpu.loadavg.avg_5min),
    },
    SensorDescription {
        key: "cpu_15min_load",
        unit: Some(Unit::Load),
        suggested_unit: None,
        suggested_display_precision: Some(2),
        device_class: None,
        state_class: None,
        entity_category: None,
        enabled_by_default: true,
        value_fn: |s| float(s.cpu.cpu.loadavg.avg_15min),
    },
    SensorDescription {
        key: "memory_real_usage",
        unit: Some(Unit::Percentage),
        suggested_unit: None,
        suggested_display_precision: Some(2),
        device_class: None,
        state_class: Some(StateClass::Measurement),
        entity_category: None,
        enabled_by_default: true,
        value_fn: |s| float(percentage(s.memory.mem.used, s.memory.mem.total)),
    },
    SensorDescription {
        key: "memory_size",
        unit: Some(Unit::Bytes),
        suggested_unit: Some(Unit::Megabytes),
        suggested_display_precision: Some(1),
        device_class: Some(DeviceClass::DataSize),
        state_class: Some(StateClass::Measurement),
        entity_category: None,
        enabled_by_default: false,
        value_fn: |s| bytes(s.memory.mem.total?.checked_add(s.memory.swap.total?)),
    },
    SensorDescription {
        key: "memory_cached",
        unit: Some(Unit::Bytes),
        suggested_unit: Some(Unit::Megabytes),
        suggested_display_precision: Some(1),
        device_class: Some(DeviceClass::DataSize),
        state_class: Some(StateClass::Measurement),
        entity_category: None,
        enabled_by_default: false,
        value_fn: |s| bytes(s.memory.mem.cached),
    },
    SensorDescription {
        key: "memory_available_swap",
        unit: Some(Unit::Bytes),
        suggested_unit: Some(Unit::Megabytes),
        suggested_display_precision: Some(1),
        device_class: Some(DeviceClass::DataSize),
        state_class: Some(StateClass::Measurement),
        entity_category: None,
        enabled_by_default: true,
        value_fn: |s| bytes(s.memory.swap.free),
    },
    SensorDescription {
        key: "memory_available_real",
        unit: Some(Unit::Bytes),
        suggested_unit: Some(Unit::Megabytes),
        suggested_display_precision: Some(1),
        device_class: Some(DeviceClass::DataSize),
        state_class: Some(StateClass::Measurement),
        entity_category: None,
        enabled_by_default: true,
        value_fn: |s| bytes(s.memory.mem.free),
    },
    SensorDescription {
        key: "memory_total_swap",
        unit: Some(Unit::Bytes),
        suggested_unit: Some(Unit::Megabytes),
        suggested_display_precision: Some(1),
        device_class: Some(DeviceClass::DataSize),
        state_class: Some(StateClass::Measurement),
        entity_category: None,
        enabled_by_default: true,
        value_fn: |s| bytes(s.memory.swap.total),
    },
    SensorDescription {
        key: "memory_total_real",
        unit: Some(Unit::Bytes),
        suggested_unit: Some(Unit::Megabytes),
        suggested_display_precision: Some(1),
        device_class: Some(DeviceClass::DataSize),
        state_class: Some(StateClass::Measurement),
        entity_category: None,
        enabled_by_default: true,
        value_fn: |s| bytes(s.memory.mem.total),
    },
];

pub static INFORMATION_SENSORS: &[SensorDescription<Snapshot>] = &[
    SensorDescription {
        key: "temperature",
        unit: Some(Unit::Celsius),
        suggested_unit: None,
        suggested_display_precision: None,
        device_class: Some(DeviceClass::Temperature),
        state_class: Some(StateClass::Measurement),
        entity_category: Some(EntityCategory::Diagnostic),
        enabled_by_default: true,
        value_fn: first_cpu_temp,
    },
    SensorDescription {
        key: "uptime",
        unit: Some(Unit::Seconds),
        suggested_unit: None,
        suggested_display_precision: None,
        device_class: Some(DeviceClass::Duration),
        state_class: None,
        entity_category: Some(EntityCategory::Diagnostic),
        enabled_by_default: false,
        value_fn: |s| bytes(s.uptime.uptime),
    },
];

pub static HW_SENSORS: &[SensorDescription<Snapshot>] = &[SensorDescription {
    key: "cpu_temperature",
    unit: Some(Unit::Celsius),
    suggested_unit: None,
    suggested_display_precision: None,
    device_class: Some(DeviceClass::Temperature),
    state_class: Some(StateClass::Measurement),
    entity_category: None,
    enabled_by_default: true,
    value_fn: first_cpu_temp,
}];

pub static STORAGE_VOL_SENSORS: &[SensorDescription<Volume>] = &[
    SensorDescription {
        key: "volume_size_used",
        unit: Some(Unit::Bytes),
        suggested_unit: Some(Unit::Terabytes),
        suggested_display_precision: Some(2),
        device_class: Some(DeviceClass::DataSize),
        state_class: Some(StateClass::Measurement),
        entity_category: None,
        enabled_by_default: true,
        value_fn: |v| bytes(volume_used(v)),
    },
    SensorDescription {
        key: "volume_size_total",
        unit: Some(Unit::Bytes),
        suggested_unit: Some(Unit::Terabytes),
        suggested_display_precision: Some(2),
        device_class: Some(DeviceClass::DataSize),
        state_class: Some(StateClass::Measurement),
        entity_category: None,
        enabled_by_default: true,
        value_fn: |v| bytes(v.fssize),
    },
    SensorDescription {
        key: "volume_percentage_used",
        unit: Some(Unit::Percentage),
        suggested_unit: None,
        suggested_display_precision: Some(2),
        device_class: None,
        state_class: None,
        entity_category: None,
        enabled_by_default: true,
        value_fn: |v| float(percentage(volume_used(v), v.fssize)),
    },
];

pub static STORAGE_DISK_SENSORS: &[SensorDescription<DiskRecord>] = &[
    SensorDescription {
        key: "disk_smart_status",
        unit: None,
        suggested_unit: None,
        suggested_display_precision: None,
        device_class: None,
        state_class: None,
        entity_category: Some(EntityCategory::Diagnostic),
        enabled_by_default: true,
        value_fn: |d| {
            let passed = d.smart.as_ref()?.smart_status?.passed;
            let status = if passed { "Healthy" } else { "Unhealthy" };
            Some(StateValue::Text(status.to_string()))
        },
    },
    SensorDescription {
        key: "disk_temp",
        unit: Some(Unit::Celsius),
        suggested_unit: None,
        suggested_display_precision: None,
        device_class: Some(DeviceClass::Temperature),
        state_class: Some(StateClass::Measurement),
        entity_category: Some(EntityCategory::Diagnostic),
        enabled_by_default: true,
        value_fn: |d| float(d.monitoring.as_ref()?.temp),
    },
];

pub static NETWORK_IFS_SENSORS: &[SensorDescription<NetInterface>] = &[
    SensorDescription {
        key: "network_up",
        unit: Some(Unit::BytesPerSecond),
        suggested_unit: Some(Unit::KilobytesPerSecond),
        suggested_display_precision: Some(1),
        device_class: Some(DeviceClass::DataRate),
        state_class: Some(StateClass::Measurement),
        entity_category: None,
        enabled_by_default: true,
        value_fn: |i| float(i.transmit),
    },
    SensorDescription {
        key: "network_down",
        unit: Some(Unit::BytesPerSecond),
        suggested_unit: Some(Unit::KilobytesPerSecond),
        suggested_display_precision: Some(1),
        device_class: Some(DeviceClass::DataRate),
        state_class: Some(StateClass::Measurement),
        entity_category: None,
        enabled_by_default: true,
        value_fn: |i| float(i.receive),
    },
];
