//! Client records and data-frame prefix parsing
//!
//! A data-shaped capture carries a 36-byte prefix holding the frame-control
//! field and the address block. The two direction bits select which address
//! slots hold the access point and the station.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::frame::{DsStatus, MacAddr, DATA_PREFIX_LEN};

/// Multicast/broadcast destination prefixes tested in the from-DS case:
/// IPv4 multicast, all-ones broadcast, IPv6 multicast.
pub const BROADCAST_PREFIXES: [[u8; 3]; 3] = [
    [0x01, 0x00, 0x5e],
    [0xff, 0xff, 0xff],
    [0x33, 0x33, 0x00],
];

/// One observed client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    /// The client's own address.
    pub station: MacAddr,
    /// The access point the client was talking to or through.
    pub ap: MacAddr,
    /// Signal magnitude in dB below zero.
    pub rssi: u8,
    /// Sequence counter reconstructed from the sequence-control field.
    /// The derivation (`byte[23] * 255 + (byte[22] & 0xf0)`) predates this
    /// codebase and is kept as-is; the forged-deauth encoder mirrors it.
    pub seq: u16,
    /// This parser has no failure path; always false.
    pub err: bool,
    /// When this record was last parsed.
    pub last_seen: DateTime<Utc>,
}

impl Station {
    /// Records where the station and access-point addresses coincide carry
    /// no client information and are discarded before storage.
    pub fn is_self_addressed(&self) -> bool {
        self.station == self.ap
    }
}

/// Whether the destination address at offset 4 differs from any of the
/// known broadcast/multicast prefixes. An OR over the three inequality
/// tests holds for every possible input, so the unicast branch is always
/// taken in the from-DS case; kept as-is rather than tightened to a
/// membership test (see DESIGN.md).
fn dest_is_unicast(prefix: &[u8]) -> bool {
    BROADCAST_PREFIXES
        .iter()
        .any(|pattern| prefix[4..7] != pattern[..])
}

/// Address offsets within the prefix for a given direction.
///
/// Returns `(ap_offset, station_offset)`.
fn address_offsets(ds: DsStatus, prefix: &[u8]) -> (usize, usize) {
    match ds {
        DsStatus::NotDs => (16, 10),
        DsStatus::ToDs => (4, 10),
        DsStatus::FromDs => {
            if dest_is_unicast(prefix) {
                (10, 16)
            } else {
                (10, 4)
            }
        }
        DsStatus::DsToDs => (10, 4),
    }
}

/// Parse a client record out of a data-frame prefix.
///
/// Returns `None` only when the prefix is shorter than the 36 bytes the
/// address block needs; there is no per-record error path.
pub fn parse_station(prefix: &[u8], rssi: u8) -> Option<Station> {
    if prefix.len() < DATA_PREFIX_LEN {
        return None;
    }

    let ds = DsStatus::from(prefix[1]);
    let (ap_offset, station_offset) = address_offsets(ds, prefix);

    let ap = MacAddr::from_slice(prefix, ap_offset)?;
    let station = MacAddr::from_slice(prefix, station_offset)?;
    let seq = prefix[23] as u16 * 255 + (prefix[22] & 0xf0) as u16;

    Some(Station {
        station,
        ap,
        rssi,
        seq,
        err: false,
        last_seen: Utc::now(),
    })
}
