// MIT License - Copyright (c) 2018 Nick Whyte
// Rust translation of nessclient
//
//! # ness-lan-bridge
//!
//! Direct TCP/IP communication with Ness D8x/D16x alarm control panels
//! over an IP232 module or any serial-to-TCP bridge.
//!
//! The library decodes the panel's ASCII-hex frame stream into a closed
//! set of typed events, maintains a stateful interpretation of those
//! events (arming state, per-zone sealed/unsealed state), and constructs
//! the keypad command strings for user actions. No external dependencies
//! beyond tokio, thiserror, tracing, bitflags, and chrono.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ness_lan_bridge::{ClientConfig, NessClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ClientConfig::builder()
//!         .host("192.168.1.50")
//!         .port(23)
//!         .build();
//!
//!     let mut client = NessClient::connect(config).await?;
//!
//!     client
//!         .on_state_change(|state| println!("Arming state: {:?}", state))
//!         .await;
//!     client
//!         .on_zone_change(|zone, triggered| println!("Zone {}: {}", zone, triggered))
//!         .await;
//!
//!     client.arm_away(Some("1234")).await?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     client.disconnect().await;
//!     Ok(())
//! }
//! ```

pub mod alarm;
pub mod client;
pub mod config;
mod connection;
pub mod error;
pub mod event;
pub mod packet;

// Re-exports for convenience
pub use alarm::{Alarm, AlarmZone, ArmingState};
pub use client::{EventReceiver, NessClient};
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{NessError, Result};
pub use event::{
    ArmingStatus, ArmingUpdate, AuxiliaryOutputs, AuxiliaryOutputsUpdate, Event, EventType,
    MiscellaneousAlarms, MiscellaneousAlarmsUpdate, Model, Outputs, OutputsUpdate,
    PanelVersionUpdate, RequestId, State, SystemStatusEvent, ViewStateUpdate, ZoneUpdate, Zones,
};
pub use packet::{CommandType, Packet};
