//! # airjam
//!
//! Monitor-mode 802.11 sniffer and disruption daemon. The radio delivers
//! raw capture records; this crate classifies them by shape, parses
//! access-point beacons and client data frames into bounded deduplicated
//! inventories, hops channels when discovery goes idle, publishes JSON
//! snapshots of both inventories, and can synthesize deauthentication and
//! spoofed-beacon bursts for active disruption.
//!
//! ## Architecture
//!
//! - `frame`: raw capture records, length classification, addressing bits
//! - `beacon`: access-point records and beacon body parsing
//! - `station`: client records and data-frame prefix parsing
//! - `inventory`: bounded keyed store with circular eviction
//! - `scan`: discovery-driven channel hop scheduler
//! - `forge`: forged management frame synthesis
//! - `report`: JSON inventory snapshots
//! - `daemon`: control loop, configuration, and I/O seams

pub mod beacon;
pub mod forge;
pub mod frame;
pub mod inventory;
pub mod report;
pub mod scan;
pub mod station;

pub mod daemon;

// Re-export commonly used types
pub use crate::{
    beacon::AccessPoint,
    forge::{DEAUTH_BURST_COUNT, DEAUTH_FRAME_LEN},
    frame::{DsStatus, FrameShape, MacAddr, RawFrame},
    inventory::Inventory,
    scan::ScanScheduler,
    station::Station,
};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AirjamError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Radio error: {0}")]
    Radio(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("System error: {0}")]
    System(String),
}

pub type Result<T> = std::result::Result<T, AirjamError>;

// Constants
/// Octets in a link-layer address.
pub const ETH_MAC_LEN: usize = 6;
/// Capacity of the access-point inventory.
pub const MAX_BEACONS: usize = 256;
/// Capacity of the station inventory.
pub const MAX_CLIENTS: usize = 256;
/// First scannable 2.4 GHz channel.
pub const CHANNEL_MIN: u8 = 1;
/// Last scannable 2.4 GHz channel.
pub const CHANNEL_MAX: u8 = 14;
