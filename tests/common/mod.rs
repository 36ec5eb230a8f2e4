// Shared test helpers: a scripted in-memory fnOS client.
#![allow(dead_code)]

use fnos_monitor::config::CoordinatorConfig;
use fnos_monitor::device::DeviceIdentity;
use fnos_monitor::error::{FnosError, Result};
use fnos_monitor::fnos::types::*;
use fnos_monitor::fnos::FnosApi;
use secrecy::SecretString;
use serde_json::json;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// Canned responses returned by [`MockClient`].
#[derive(Clone)]
pub struct MockData {
    pub machine_id: MachineId,
    pub hardware: HardwareInfo,
    pub host_name: HostName,
    pub uptime: Uptime,
    pub cpu: CpuStats,
    pub memory: MemoryStats,
    pub network: NetworkStats,
    pub store: StoreSummary,
    pub disks: DiskList,
    pub monitoring: DiskMonitoringList,
    pub smart: HashMap<String, DiskSmart>,
}

impl Default for MockData {
    fn default() -> Self {
        let mut smart = HashMap::new();
        smart.insert(
            "disk1".to_string(),
            serde_json::from_value(json!({"smart_status": {"passed": true}})).unwrap(),
        );
        smart.insert(
            "disk2".to_string(),
            serde_json::from_value(json!({"smart_status": {"passed": false}})).unwrap(),
        );

        Self {
            machine_id: MachineId {
                machine_id: "m-0001".to_string(),
            },
            hardware: serde_json::from_value(json!({"cpu": {"name": "Intel N100"}})).unwrap(),
            host_name: serde_json::from_value(json!({
                "hostName": "nas",
                "trimVersion": "0.9.2"
            }))
            .unwrap(),
            uptime: Uptime { uptime: Some(86400) },
            cpu: serde_json::from_value(json!({
                "cpu": {
                    "busy": {"user": 12.5, "system": 3.0, "other": 0.5, "all": 16.0},
                    "loadavg": {"avg1min": 0.42, "avg5min": 0.31, "avg15min": 0.2},
                    "temp": [48.0, 51.0]
                }
            }))
            .unwrap(),
            memory: serde_json::from_value(json!({
                "mem": {"used": 50, "total": 200, "free": 150, "cached": 20},
                "swap": {"total": 100, "free": 80}
            }))
            .unwrap(),
            network: serde_json::from_value(json!({
                "ifs": [
                    {"name": "eth0", "receive": 2048.0, "transmit": 1024.0},
                    {"name": "eth1", "receive": 0.0, "transmit": 0.0}
                ]
            }))
            .unwrap(),
            store: serde_json::from_value(json!({
                "array": [
                    {"name": "vol1", "uuid": "u-1", "fssize": 1000, "frsize": 250},
                    {"name": "vol2", "uuid": "u-2", "fssize": 0, "frsize": 0}
                ]
            }))
            .unwrap(),
            disks: serde_json::from_value(json!({
                "disk": [
                    {"name": "disk1", "serialNumber": "SN1", "modelName": "WD Red", "vendor": "WDC"},
                    {"name": "disk2", "serialNumber": "SN2", "modelName": "IronWolf", "vendor": "Seagate"}
                ]
            }))
            .unwrap(),
            monitoring: serde_json::from_value(json!({
                "disk": [{"name": "disk2", "temp": 40.0}]
            }))
            .unwrap(),
            smart,
        }
    }
}

#[derive(Default)]
struct MockState {
    calls: Vec<String>,
    failures: HashMap<String, VecDeque<FnosError>>,
    stalled: HashSet<String>,
    login_rejected: bool,
    data: MockData,
}

/// In-memory [`FnosApi`] that records every call and can be scripted to
/// fail specific operations.
#[derive(Clone, Default)]
pub struct MockClient {
    state: Arc<Mutex<MockState>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call to `op` fail with `err`. Queued failures for the
    /// same op are consumed in order.
    pub fn fail_next(&self, op: &str, err: FnosError) {
        self.state
            .lock()
            .unwrap()
            .failures
            .entry(op.to_string())
            .or_default()
            .push_back(err);
    }

    /// Make every call to `op` hang forever.
    pub fn stall(&self, op: &str) {
        self.state.lock().unwrap().stalled.insert(op.to_string());
    }

    pub fn reject_login(&self) {
        self.state.lock().unwrap().login_rejected = true;
    }

    pub fn update_data(&self, f: impl FnOnce(&mut MockData)) {
        f(&mut self.state.lock().unwrap().data);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.as_str() == op)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    async fn record(&self, op: &str) -> Result<MockData> {
        let stalled = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(op.to_string());
            if let Some(err) = state.failures.get_mut(op).and_then(|q| q.pop_front()) {
                return Err(err);
            }
            state.stalled.contains(op)
        };
        if stalled {
            std::future::pending::<()>().await;
        }
        Ok(self.state.lock().unwrap().data.clone())
    }
}

impl FnosApi for MockClient {
    async fn connect(&self, _host: &str) -> Result<()> {
        self.record("connect").await.map(|_| ())
    }

    async fn login(&self, _username: &str, _password: &SecretString) -> Result<LoginResult> {
        self.record("login").await?;
        let rejected = self.state.lock().unwrap().login_rejected;
        Ok(LoginResult { success: !rejected })
    }

    async fn disconnect(&self) -> Result<()> {
        self.record("disconnect").await.map(|_| ())
    }

    async fn reconnect(&self) -> Result<()> {
        self.record("reconnect").await.map(|_| ())
    }

    async fn host_name(&self) -> Result<HostName> {
        self.record("host_name").await.map(|d| d.host_name)
    }

    async fn uptime(&self) -> Result<Uptime> {
        self.record("uptime").await.map(|d| d.uptime)
    }

    async fn machine_id(&self) -> Result<MachineId> {
        self.record("machine_id").await.map(|d| d.machine_id)
    }

    async fn hardware_info(&self) -> Result<HardwareInfo> {
        self.record("hardware_info").await.map(|d| d.hardware)
    }

    async fn cpu(&self) -> Result<CpuStats> {
        self.record("cpu").await.map(|d| d.cpu)
    }

    async fn memory(&self) -> Result<MemoryStats> {
        self.record("memory").await.map(|d| d.memory)
    }

    async fn network(&self) -> Result<NetworkStats> {
        self.record("network").await.map(|d| d.network)
    }

    async fn store_general(&self) -> Result<StoreSummary> {
        self.record("store_general").await.map(|d| d.store)
    }

    async fn list_disks(&self) -> Result<DiskList> {
        self.record("list_disks").await.map(|d| d.disks)
    }

    async fn disk_monitoring(&self) -> Result<DiskMonitoringList> {
        self.record("disk_monitoring").await.map(|d| d.monitoring)
    }

    async fn disk_smart(&self, disk: &str) -> Result<DiskSmart> {
        let data = self.record(&format!("disk_smart:{}", disk)).await?;
        data.smart
            .get(disk)
            .cloned()
            .ok_or_else(|| FnosError::Api(format!("no SMART data for {}", disk)))
    }
}

pub fn coordinator_config() -> CoordinatorConfig {
    CoordinatorConfig {
        update_interval_seconds: 30,
        refresh_timeout_seconds: None,
    }
}

/// Snapshot assembled from the default [`MockData`], as a refresh would build it.
pub fn sample_snapshot() -> Snapshot {
    let data = MockData::default();
    let disks = data
        .disks
        .disk
        .iter()
        .map(|info| DiskRecord {
            info: info.clone(),
            monitoring: data
                .monitoring
                .disk
                .iter()
                .find(|m| m.name == info.name)
                .cloned(),
            smart: data.smart.get(&info.name).cloned(),
        })
        .collect();
    Snapshot {
        uptime: data.uptime,
        host_name: data.host_name,
        cpu: data.cpu,
        memory: data.memory,
        store: data.store,
        disks,
        network: data.network,
    }
}

pub fn sample_identity() -> DeviceIdentity {
    let data = MockData::default();
    DeviceIdentity::new(data.machine_id, &data.host_name, &data.hardware)
}
