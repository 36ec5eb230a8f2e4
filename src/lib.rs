//! fnOS Monitor
//!
//! Polls an fnOS NAS over its WebSocket management API and exposes system
//! metrics (CPU, memory, uptime, volumes, disks, network interfaces) as
//! sensor entities.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐      WebSocket       ┌──────────────────────────┐
//! │    fnOS     │ ◄─────────────────►  │       fnos-monitor       │
//! │     NAS     │     JSON frames      │                          │
//! └─────────────┘                      │  ┌────────┐ ┌─────────┐  │     HTTP     ┌────────────┐
//!                                      │  │ Client │→│Coordina-│  │ ◄──────────► │ Prometheus │
//!                                      │  └────────┘ │  tor    │  │  /metrics    └────────────┘
//!                                      │             └────┬────┘  │
//!                                      │        snapshot  ▼       │
//!                                      │            ┌─────────┐   │
//!                                      │            │ Sensors │   │
//!                                      │            └─────────┘   │
//!                                      └──────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`fnos`] - Client contract, WebSocket client and API type definitions
//! - [`coordinator`] - Refresh loop and snapshot aggregation
//! - [`sensor`] - Descriptor tables and sensor entities
//! - [`device`] - Device identity and child devices
//! - [`setup`] - Connection settings validation
//! - [`integration`] - Entry setup and unload
//! - [`metrics`] - Prometheus metric definitions
//! - [`server`] - HTTP server
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//!
//! # Quick Start
//!
//! ```no_run
//! use fnos_monitor::{config::Config, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/Default.toml")?;
//!     server::start(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod device;
pub mod error;
pub mod fnos;
pub mod integration;
pub mod metrics;
pub mod sensor;
pub mod server;
pub mod setup;
