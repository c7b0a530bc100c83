//! Rust library for controlling HTD Lync 12 multi-zone audio controllers
//!
//! The Lync 12 speaks a small binary protocol over TCP (port 10006 by
//! default). This library provides an async client for it:
//!
//! - Zone queries (one zone or the whole device)
//! - Power, volume, mute and source control per zone
//! - A local copy of the last known state of all twelve zones
//! - A diagnostics channel for responses the client had to ignore
//! - Device configuration with default zone and source names
//!
//! # Quick Start
//!
//! ```no_run
//! use htd_lync12::HtdClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HtdClient::new("192.168.1.50", 10006);
//!
//!     client.set_power(3, true).await?;
//!     client.set_volume(3, 40).await?;
//!     client.set_source(3, 2).await?;
//!
//!     for zone in client.query_all().await? {
//!         println!("Zone {}: {:?} vol {}", zone.zone, zone.power, zone.volume);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Timeouts
//!
//! Each command uses its own short-lived connection with a 500 ms bound.
//! When the controller does not answer, operations still succeed: every
//! zone is marked unknown and the degraded state is returned. Poll again
//! to recover.
//!
//! # Architecture
//!
//! - **Client**: public operations and the shared zone state
//! - **Zone**: per-zone handle with names, for media-player style use
//! - **Protocol**: command frames, checksum and volume mapping
//! - **Parser**: status frame decoding
//! - **Connection**: one TCP request/response per command
//! - **Config**: device configuration

mod client;
mod config;
mod connection;
mod diagnostics;
mod error;
#[cfg(test)]
mod mock;
mod parser;
pub mod protocol;
mod store;
mod types;
mod zone;

// Public exports
pub use client::HtdClient;
pub use config::{load_devices, DeviceConfig};
pub use connection::{Connection, DEFAULT_TIMEOUT};
pub use diagnostics::{Diagnostic, DiagnosticReceiver};
pub use error::{HtdError, Result};
pub use parser::StatusFrame;
pub use types::{
    MuteState, PowerState, Reply, ZoneId, ZoneState, DEFAULT_PORT, FRAME_LEN, MAX_VOLUME,
    SOURCE_COUNT, ZONE_COUNT,
};
pub use zone::{Playback, Zone};
