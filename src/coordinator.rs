//! Polling Coordinator
//!
//! Owns the fnOS client handle, the device identity and the current
//! [`Snapshot`], and refreshes the snapshot on a fixed schedule.
//!
//! # Refresh Cycle
//!
//! 1. Host name, uptime, CPU, memory, storage summary and network reads
//! 2. Disk enumeration and disk monitoring reads
//! 3. Per-disk enrichment: first monitoring entry with a matching name, then
//!    one SMART read per disk
//!
//! Every read goes through [`Coordinator::with_reconnect`]: a
//! [`FnosError::NotConnected`] triggers one `reconnect()` and exactly one
//! more attempt. Any remaining failure aborts the whole cycle; the previous
//! snapshot stays in place and the state is marked failed.
//!
//! # Publishing
//!
//! State is published through a `tokio::sync::watch` channel. Every
//! completed cycle is published, even when the data did not change, so
//! `last_updated` tracks the last successful poll.

use crate::config::CoordinatorConfig;
use crate::device::DeviceIdentity;
use crate::error::{FnosError, Result};
use crate::fnos::types::{DiskMonitoring, DiskRecord, Snapshot};
use crate::fnos::FnosApi;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, SystemTime};
use tokio::sync::{watch, Mutex};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, info_span, warn, Instrument};

/// What subscribers observe after each refresh cycle.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorState {
    /// Last successfully fetched snapshot.
    pub snapshot: Option<Arc<Snapshot>>,
    pub last_update_success: bool,
    /// Completion time of the last successful refresh.
    pub last_updated: Option<SystemTime>,
    pub last_error: Option<String>,
    /// Completed cycles, successful or not.
    pub refresh_count: u64,
}

pub struct Coordinator<C> {
    client: C,
    title: String,
    update_interval: Duration,
    refresh_timeout: Option<Duration>,
    identity: OnceLock<DeviceIdentity>,
    state: watch::Sender<Arc<CoordinatorState>>,
    refresh_lock: Mutex<()>,
    job_seq: AtomicU64,
}

impl<C: FnosApi> Coordinator<C> {
    pub fn new(client: C, title: impl Into<String>, config: &CoordinatorConfig) -> Self {
        let (state, _) = watch::channel(Arc::new(CoordinatorState::default()));
        Self {
            client,
            title: title.into(),
            update_interval: config.update_interval(),
            refresh_timeout: config.refresh_timeout(),
            identity: OnceLock::new(),
            state,
            refresh_lock: Mutex::new(()),
            job_seq: AtomicU64::new(0),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Device identity; `None` until [`first_refresh`](Self::first_refresh) succeeds.
    pub fn identity(&self) -> Option<&DeviceIdentity> {
        self.identity.get()
    }

    pub fn state(&self) -> Arc<CoordinatorState> {
        Arc::clone(&self.state.borrow())
    }

    /// Register a consumer. Scheduled refreshes only run while at least one
    /// receiver is alive.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CoordinatorState>> {
        self.state.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.receiver_count()
    }

    /// Fetch the device identity (once) and perform the first refresh.
    ///
    /// Failures come back as [`FnosError::NotReady`]; the caller is expected
    /// to retry setup later.
    pub async fn first_refresh(&self) -> Result<()> {
        if self.identity.get().is_none() {
            let identity = self.fetch_identity().await.map_err(FnosError::not_ready)?;
            info!(
                "[{}] Device identity: {} ({})",
                self.title, identity.device.name, identity.machine_id
            );
            // A concurrent setup may have won; the first identity is kept.
            let _ = self.identity.set(identity);
        }

        self.refresh().await.map_err(FnosError::not_ready)?;
        Ok(())
    }

    async fn fetch_identity(&self) -> Result<DeviceIdentity> {
        let machine_id = self
            .with_reconnect("machine id", || self.client.machine_id())
            .await?;
        let hardware = self
            .with_reconnect("hardware info", || self.client.hardware_info())
            .await?;
        let host_name = self
            .with_reconnect("host name", || self.client.host_name())
            .await?;
        Ok(DeviceIdentity::new(machine_id, &host_name, &hardware))
    }

    /// Run one full refresh and publish the outcome.
    ///
    /// Only one refresh runs at a time; a concurrent caller waits for the
    /// in-flight cycle and then runs its own.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>> {
        let _guard = self.refresh_lock.lock().await;
        let job = self.job_seq.fetch_add(1, Ordering::SeqCst);
        let span = info_span!("refresh", entry = %self.title, job);

        async {
            debug!("Refresh started");
            let result = self.fetch_with_timeout().await;
            let previous = self.state();

            match result {
                Ok(snapshot) => {
                    let snapshot = Arc::new(snapshot);
                    info!(
                        "Refresh succeeded: {} volumes, {} disks, {} interfaces",
                        snapshot.store.array.len(),
                        snapshot.disks.len(),
                        snapshot.network.ifs.len()
                    );
                    self.state.send_replace(Arc::new(CoordinatorState {
                        snapshot: Some(Arc::clone(&snapshot)),
                        last_update_success: true,
                        last_updated: Some(SystemTime::now()),
                        last_error: None,
                        refresh_count: previous.refresh_count + 1,
                    }));
                    Ok(snapshot)
                }
                Err(e) => {
                    warn!("Refresh failed: {}", e);
                    self.state.send_replace(Arc::new(CoordinatorState {
                        snapshot: previous.snapshot.clone(),
                        last_update_success: false,
                        last_updated: previous.last_updated,
                        last_error: Some(e.to_string()),
                        refresh_count: previous.refresh_count + 1,
                    }));
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn fetch_with_timeout(&self) -> Result<Snapshot> {
        match self.refresh_timeout {
            Some(limit) => tokio::time::timeout(limit, self.fetch_snapshot())
                .await
                .map_err(|_| FnosError::Timeout(limit))?,
            None => self.fetch_snapshot().await,
        }
    }

    async fn fetch_snapshot(&self) -> Result<Snapshot> {
        let host_name = self
            .with_reconnect("host name", || self.client.host_name())
            .await?;
        let uptime = self
            .with_reconnect("uptime", || self.client.uptime())
            .await?;
        let cpu = self.with_reconnect("cpu", || self.client.cpu()).await?;
        let memory = self
            .with_reconnect("memory", || self.client.memory())
            .await?;
        let store = self
            .with_reconnect("storage summary", || self.client.store_general())
            .await?;
        debug!("Storage summary: {} volumes", store.array.len());
        let network = self
            .with_reconnect("network", || self.client.network())
            .await?;

        let disks = self.fetch_disks().await?;

        Ok(Snapshot {
            uptime,
            host_name,
            cpu,
            memory,
            store,
            disks,
            network,
        })
    }

    /// Enumerate disks and merge monitoring and SMART readings into each.
    async fn fetch_disks(&self) -> Result<Vec<DiskRecord>> {
        let list = self
            .with_reconnect("disk list", || self.client.list_disks())
            .await?;
        let monitoring = self
            .with_reconnect("disk monitoring", || self.client.disk_monitoring())
            .await?;
        debug!(
            "Got {} disks and {} monitoring entries",
            list.disk.len(),
            monitoring.disk.len()
        );

        let mut disks = Vec::with_capacity(list.disk.len());
        for info in list.disk {
            let matched = find_monitoring(&monitoring.disk, &info.name).cloned();
            let smart = self
                .with_reconnect("disk smart", || self.client.disk_smart(&info.name))
                .await?;
            disks.push(DiskRecord {
                info,
                monitoring: matched,
                smart: Some(smart),
            });
        }

        Ok(disks)
    }

    /// Attempt `op`; on `NotConnected` reconnect and attempt it once more.
    async fn with_reconnect<T, F, Fut>(&self, what: &str, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match op().await {
            Err(FnosError::NotConnected) => {
                warn!("{} read failed: not connected, reconnecting", what);
                self.client.reconnect().await?;
                op().await
            }
            result => result,
        }
    }

    /// Refresh every `update_interval` until `shutdown` fires.
    ///
    /// The first tick comes one interval from now, since setup already
    /// performed the initial refresh.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval_at(Instant::now() + self.update_interval, self.update_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("[{}] Stopping refresh loop", self.title);
                    break;
                }
                _ = ticker.tick() => {
                    if self.subscriber_count() == 0 {
                        debug!("[{}] No subscribers, skipping scheduled refresh", self.title);
                        continue;
                    }
                    // Already logged and published
                    let _ = self.refresh().await;
                }
            }
        }
    }

    /// Release the client connection. Safe to call more than once.
    pub async fn shutdown(&self) {
        info!("[{}] Shutting down coordinator", self.title);
        if let Err(e) = self.client.disconnect().await {
            warn!("[{}] Disconnect failed: {}", self.title, e);
        }
    }
}

/// First monitoring entry whose name equals `name`.
pub fn find_monitoring<'a>(entries: &'a [DiskMonitoring], name: &str) -> Option<&'a DiskMonitoring> {
    entries.iter().find(|entry| entry.name == name)
}
