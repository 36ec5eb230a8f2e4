//! fnOS WebSocket API Client
//!
//! This module provides the [`FnosApi`] contract consumed by the coordinator
//! and the setup validator, plus [`FnosClient`], its WebSocket implementation.
//!
//! # Architecture
//!
//! - **Connection**: WebSocket (ws:// or wss://) to `/websocket?type=main`
//! - **Authentication**: `user.login` with username and password; credentials
//!   are cached so [`FnosApi::reconnect`] can restore the session
//! - **Protocol**: JSON text frames tagged with `req` and a `reqid`
//!
//! # Example
//!
//! ```no_run
//! use fnos_monitor::fnos::{FnosApi, FnosClient};
//! use secrecy::SecretString;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = FnosClient::new(false, true);
//! client.connect("fnos.local:5666").await?;
//! let login = client.login("admin", &SecretString::from("password")).await?;
//! assert!(login.success);
//! let cpu = client.cpu().await?;
//! # Ok(())
//! # }
//! ```

use crate::error::{FnosError, Result};
use crate::fnos::connection::ConnectionManager;
use crate::fnos::types::*;
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use std::future::Future;

/// Operations the monitor needs from an fnOS device.
///
/// Every call may fail with [`FnosError::NotConnected`] when the session is
/// gone; the caller decides whether to [`reconnect`](FnosApi::reconnect).
pub trait FnosApi: Send + Sync {
    fn connect(&self, host: &str) -> impl Future<Output = Result<()>> + Send;
    fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<LoginResult>> + Send;
    fn disconnect(&self) -> impl Future<Output = Result<()>> + Send;
    fn reconnect(&self) -> impl Future<Output = Result<()>> + Send;

    fn host_name(&self) -> impl Future<Output = Result<HostName>> + Send;
    fn uptime(&self) -> impl Future<Output = Result<Uptime>> + Send;
    fn machine_id(&self) -> impl Future<Output = Result<MachineId>> + Send;
    fn hardware_info(&self) -> impl Future<Output = Result<HardwareInfo>> + Send;
    fn cpu(&self) -> impl Future<Output = Result<CpuStats>> + Send;
    fn memory(&self) -> impl Future<Output = Result<MemoryStats>> + Send;
    fn network(&self) -> impl Future<Output = Result<NetworkStats>> + Send;
    fn store_general(&self) -> impl Future<Output = Result<StoreSummary>> + Send;
    fn list_disks(&self) -> impl Future<Output = Result<DiskList>> + Send;
    fn disk_monitoring(&self) -> impl Future<Output = Result<DiskMonitoringList>> + Send;
    fn disk_smart(&self, disk: &str) -> impl Future<Output = Result<DiskSmart>> + Send;
}

/// Client for the fnOS WebSocket API
///
/// This client is `Send` and `Sync`; all calls go through one
/// [`ConnectionManager`] session guarded by an async mutex.
pub struct FnosClient {
    connection_manager: ConnectionManager,
}

impl FnosClient {
    pub fn new(use_tls: bool, verify_ssl: bool) -> Self {
        Self {
            connection_manager: ConnectionManager::new(use_tls, verify_ssl),
        }
    }

    async fn call(&self, req: &str) -> Result<serde_json::Map<String, serde_json::Value>> {
        self.connection_manager
            .execute(req, serde_json::Map::new())
            .await
    }

    /// Call `req` and deserialize the named body field.
    async fn call_field<T>(&self, req: &str, field: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.call(req).await?;
        take_field(body, req, field)
    }
}

fn take_field<T>(
    mut body: serde_json::Map<String, serde_json::Value>,
    req: &str,
    field: &str,
) -> Result<T>
where
    T: DeserializeOwned,
{
    let value = body
        .remove(field)
        .ok_or_else(|| FnosError::Api(format!("{} response is missing '{}'", req, field)))?;
    serde_json::from_value(value).map_err(FnosError::Json)
}

impl FnosApi for FnosClient {
    async fn connect(&self, host: &str) -> Result<()> {
        self.connection_manager.connect(host).await
    }

    async fn login(&self, username: &str, password: &SecretString) -> Result<LoginResult> {
        self.connection_manager.login(username, password).await
    }

    async fn disconnect(&self) -> Result<()> {
        self.connection_manager.close().await;
        Ok(())
    }

    async fn reconnect(&self) -> Result<()> {
        self.connection_manager.reconnect().await
    }

    async fn host_name(&self) -> Result<HostName> {
        self.call_field("appcgi.sysinfo.getHostName", "data").await
    }

    async fn uptime(&self) -> Result<Uptime> {
        self.call_field("appcgi.sysinfo.getUptime", "data").await
    }

    async fn machine_id(&self) -> Result<MachineId> {
        self.call_field("appcgi.sysinfo.getMachineId", "data").await
    }

    async fn hardware_info(&self) -> Result<HardwareInfo> {
        self.call_field("appcgi.sysinfo.getHardwareInfo", "data")
            .await
    }

    async fn cpu(&self) -> Result<CpuStats> {
        self.call_field("appcgi.resmon.cpu", "data").await
    }

    async fn memory(&self) -> Result<MemoryStats> {
        self.call_field("appcgi.resmon.mem", "data").await
    }

    async fn network(&self) -> Result<NetworkStats> {
        self.call_field("appcgi.resmon.net", "data").await
    }

    async fn store_general(&self) -> Result<StoreSummary> {
        // The summary is the response body itself rather than a nested field.
        let body = self.call("stor.general").await?;
        serde_json::from_value(serde_json::Value::Object(body)).map_err(FnosError::Json)
    }

    async fn list_disks(&self) -> Result<DiskList> {
        let body = self.call("stor.listDisk").await?;
        serde_json::from_value(serde_json::Value::Object(body)).map_err(FnosError::Json)
    }

    async fn disk_monitoring(&self) -> Result<DiskMonitoringList> {
        self.call_field("appcgi.resmon.disk", "data").await
    }

    async fn disk_smart(&self, disk: &str) -> Result<DiskSmart> {
        let mut params = serde_json::Map::new();
        params.insert("disk".to_string(), disk.into());
        let body = self
            .connection_manager
            .execute("stor.diskSmart", params)
            .await?;
        take_field(body, "stor.diskSmart", "smart")
    }
}
