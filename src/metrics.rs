//! Prometheus Metrics Definitions
//!
//! Sensor entities are exported as labeled gauges under the `fnos_`
//! namespace.
//!
//! # Metric Families
//!
//! - `fnos_up` - 1 when the last refresh succeeded
//! - `fnos_refresh_total` / `fnos_refresh_failures_total` - completed cycles
//! - `fnos_last_refresh_timestamp_seconds` - time of the last successful refresh
//! - `fnos_device_info` - device identity (value is always 1)
//! - `fnos_sensor_value` - numeric sensor states
//!   - Labels: unique_id, device, key, unit
//! - `fnos_sensor_state` - text sensor states (value is always 1)
//!   - Labels: unique_id, device, key, state
//! - `fnos_sensor_available` - 1 when the sensor is available
//!   - Labels: unique_id, device, key

use crate::coordinator::CoordinatorState;
use crate::device::DeviceIdentity;
use crate::sensor::{SensorEntity, StateValue};
use prometheus::{
    Encoder, Gauge, GaugeVec, IntCounter, IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

/// Metrics collector for fnOS sensors
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,

    pub up: Arc<Gauge>,
    pub refresh_total: Arc<IntCounter>,
    pub refresh_failures_total: Arc<IntCounter>,
    pub last_refresh_timestamp_seconds: Arc<Gauge>,
    pub device_info: Arc<IntGaugeVec>,

    pub sensor_value: Arc<GaugeVec>,
    pub sensor_state: Arc<IntGaugeVec>,
    pub sensor_available: Arc<IntGaugeVec>,
}

impl MetricsCollector {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let up = Gauge::with_opts(
            Opts::new("up", "Whether the last fnOS refresh succeeded (1=yes, 0=no)")
                .namespace("fnos"),
        )?;

        let refresh_total = IntCounter::with_opts(
            Opts::new("refresh_total", "Number of completed refresh cycles").namespace("fnos"),
        )?;

        let refresh_failures_total = IntCounter::with_opts(
            Opts::new("refresh_failures_total", "Number of failed refresh cycles")
                .namespace("fnos"),
        )?;

        let last_refresh_timestamp_seconds = Gauge::with_opts(
            Opts::new(
                "last_refresh_timestamp_seconds",
                "Unix timestamp of the last successful refresh",
            )
            .namespace("fnos"),
        )?;

        let device_info = IntGaugeVec::new(
            Opts::new("device_info", "fnOS device information (value is always 1)")
                .namespace("fnos"),
            &["machine_id", "name", "model", "version"],
        )?;

        let sensor_value = GaugeVec::new(
            Opts::new("sensor_value", "Numeric sensor state").namespace("fnos"),
            &["unique_id", "device", "key", "unit"],
        )?;

        let sensor_state = IntGaugeVec::new(
            Opts::new("sensor_state", "Text sensor state (value is always 1)")
                .namespace("fnos"),
            &["unique_id", "device", "key", "state"],
        )?;

        let sensor_available = IntGaugeVec::new(
            Opts::new(
                "sensor_available",
                "Sensor availability (1=available, 0=unavailable)",
            )
            .namespace("fnos"),
            &["unique_id", "device", "key"],
        )?;

        registry.register(Box::new(up.clone()))?;
        registry.register(Box::new(refresh_total.clone()))?;
        registry.register(Box::new(refresh_failures_total.clone()))?;
        registry.register(Box::new(last_refresh_timestamp_seconds.clone()))?;
        registry.register(Box::new(device_info.clone()))?;
        registry.register(Box::new(sensor_value.clone()))?;
        registry.register(Box::new(sensor_state.clone()))?;
        registry.register(Box::new(sensor_available.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            up: Arc::new(up),
            refresh_total: Arc::new(refresh_total),
            refresh_failures_total: Arc::new(refresh_failures_total),
            last_refresh_timestamp_seconds: Arc::new(last_refresh_timestamp_seconds),
            device_info: Arc::new(device_info),
            sensor_value: Arc::new(sensor_value),
            sensor_state: Arc::new(sensor_state),
            sensor_available: Arc::new(sensor_available),
        })
    }

    pub fn set_device_info(&self, identity: &DeviceIdentity) {
        let device = &identity.device;
        self.device_info
            .with_label_values(&[
                identity.machine_id.as_str(),
                device.name.as_str(),
                device.model.as_deref().unwrap_or(""),
                device.sw_version.as_deref().unwrap_or(""),
            ])
            .set(1);
    }

    /// Republish every entity from `state`.
    ///
    /// Sensor families are reset first so a sensor whose value became
    /// unknown disappears instead of keeping a stale sample.
    pub fn update_from_entities(&self, entities: &[SensorEntity], state: &CoordinatorState) {
        self.up
            .set(if state.last_update_success { 1.0 } else { 0.0 });
        if let Some(ts) = state
            .last_updated
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        {
            self.last_refresh_timestamp_seconds.set(ts.as_secs_f64());
        }

        self.sensor_value.reset();
        self.sensor_state.reset();
        self.sensor_available.reset();

        for entity in entities {
            let entity_state = entity.state(state);
            let labels = [
                entity_state.unique_id.as_str(),
                entity_state.device.as_str(),
                entity_state.metadata.key,
            ];

            self.sensor_available
                .with_label_values(&labels)
                .set(i64::from(entity_state.available));

            if !entity_state.available {
                continue;
            }

            match &entity_state.value {
                Some(StateValue::Text(text)) => {
                    self.sensor_state
                        .with_label_values(&[labels[0], labels[1], labels[2], text.as_str()])
                        .set(1);
                }
                Some(value) => {
                    if let Some(number) = value.as_f64() {
                        let unit = entity_state.metadata.unit.map(|u| u.as_str()).unwrap_or("");
                        self.sensor_value
                            .with_label_values(&[labels[0], labels[1], labels[2], unit])
                            .set(number);
                    }
                }
                None => {}
            }
        }
    }

    /// Record the outcome of one refresh cycle.
    pub fn record_refresh(&self, success: bool) {
        self.refresh_total.inc();
        if !success {
            self.refresh_failures_total.inc();
        }
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics collector")
    }
}
