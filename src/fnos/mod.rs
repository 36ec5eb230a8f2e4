pub mod client;
pub mod connection;
pub mod types;

pub use client::{FnosApi, FnosClient};
pub use connection::ConnectionManager;
