//! Raw capture records and frame classification
//!
//! The radio delivers each captured frame as an opaque record: a 12-byte
//! receive-control header followed by an aggregation-format payload. The
//! record's total length is the only reliable shape discriminator, so
//! classification is by exact length rather than by frame-control decoding.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ETH_MAC_LEN;

/// Length of the receive-control header prefixed to every capture record.
pub const RX_HEADER_LEN: usize = 12;
/// Total record length of a beacon-shaped capture.
pub const BEACON_RECORD_LEN: usize = 128;
/// Payload body length carried by a beacon-shaped record.
pub const BEACON_BODY_LEN: usize = 112;
/// Payload prefix length carried by a data-shaped record.
pub const DATA_PREFIX_LEN: usize = 36;

/// Frame-control first bytes accepted on the data path (plain data and
/// QoS data).
pub const DATA_FRAME_MARKERS: [u8; 2] = [0x08, 0x88];

/// 6-octet link-layer address; the sole key for both inventories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddr(pub [u8; ETH_MAC_LEN]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff; ETH_MAC_LEN]);

    /// Copy an address out of a payload at the given offset.
    ///
    /// Returns `None` when fewer than six octets remain.
    pub fn from_slice(data: &[u8], offset: usize) -> Option<Self> {
        let bytes = data.get(offset..offset + ETH_MAC_LEN)?;
        let mut addr = [0u8; ETH_MAC_LEN];
        addr.copy_from_slice(bytes);
        Some(MacAddr(addr))
    }

    pub fn as_bytes(&self) -> &[u8; ETH_MAC_LEN] {
        &self.0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl From<[u8; ETH_MAC_LEN]> for MacAddr {
    fn from(octets: [u8; ETH_MAC_LEN]) -> Self {
        MacAddr(octets)
    }
}

/// Shape bucket for an incoming capture record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrameShape {
    /// Receive-control header only, no payload. Discarded.
    Control,
    /// Fixed-size management capture carrying a 112-byte beacon body.
    Beacon,
    /// Everything else: a 36-byte address/sequence prefix. Unrecognized
    /// lengths land here too, which can misclassify; accepted imprecision.
    Data,
}

impl FrameShape {
    /// Bucket a record by its total length.
    pub fn classify(total_len: usize) -> Self {
        match total_len {
            RX_HEADER_LEN => FrameShape::Control,
            BEACON_RECORD_LEN => FrameShape::Beacon,
            _ => FrameShape::Data,
        }
    }
}

/// Two-bit distribution-system direction field of a data frame, bits 0-1
/// of frame-control byte 1. All four values are named so address-role
/// selection stays exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum DsStatus {
    /// Ad hoc / neither to nor from the distribution system.
    NotDs = 0,
    /// Station to access point.
    ToDs = 1,
    /// Access point to station.
    FromDs = 2,
    /// Access point to access point.
    DsToDs = 3,
}

impl From<u8> for DsStatus {
    fn from(value: u8) -> Self {
        match value & 0x03 {
            0 => Self::NotDs,
            1 => Self::ToDs,
            2 => Self::FromDs,
            _ => Self::DsToDs,
        }
    }
}

impl From<DsStatus> for u8 {
    fn from(ds: DsStatus) -> Self {
        ds as u8
    }
}

/// One raw capture record as delivered by the radio backend.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Record bytes, receive-control header included.
    pub data: Bytes,
}

impl RawFrame {
    pub fn new(data: Bytes) -> Self {
        Self { data }
    }

    /// Total record length as reported by the capture subsystem.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Shape bucket for this record.
    pub fn shape(&self) -> FrameShape {
        FrameShape::classify(self.data.len())
    }

    /// Signal magnitude in dB below zero, from the signed dBm byte at the
    /// head of the receive-control header.
    pub fn rssi_magnitude(&self) -> u8 {
        let dbm = self.data.first().copied().unwrap_or(0) as i8;
        dbm.wrapping_neg() as u8
    }

    /// The 112-byte beacon body of a beacon-shaped record.
    pub fn beacon_body(&self) -> Option<&[u8]> {
        if self.shape() != FrameShape::Beacon {
            return None;
        }
        self.data.get(RX_HEADER_LEN..RX_HEADER_LEN + BEACON_BODY_LEN)
    }

    /// The 36-byte address/sequence prefix of a data-shaped record.
    pub fn data_prefix(&self) -> Option<&[u8]> {
        if self.shape() != FrameShape::Data {
            return None;
        }
        self.data.get(RX_HEADER_LEN..RX_HEADER_LEN + DATA_PREFIX_LEN)
    }

    /// Whether a data-shaped record carries a frame the station parser
    /// should look at (plain data 0x08 or QoS data 0x88).
    pub fn is_station_data(&self) -> bool {
        match self.data_prefix() {
            Some(prefix) => DATA_FRAME_MARKERS.contains(&prefix[0]),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_of_len(len: usize) -> RawFrame {
        RawFrame::new(Bytes::from(vec![0u8; len]))
    }

    #[test]
    fn test_mac_display_lowercase_colon_hex() {
        let mac = MacAddr([0xde, 0xad, 0xbe, 0xef, 0x00, 0x1a]);
        assert_eq!(mac.to_string(), "de:ad:be:ef:00:1a");
    }

    #[test]
    fn test_mac_from_slice_bounds() {
        let data = [1u8, 2, 3, 4, 5, 6, 7];
        assert_eq!(MacAddr::from_slice(&data, 1), Some(MacAddr([2, 3, 4, 5, 6, 7])));
        assert_eq!(MacAddr::from_slice(&data, 2), None);
    }

    #[test]
    fn test_classification_by_exact_length() {
        assert_eq!(FrameShape::classify(12), FrameShape::Control);
        assert_eq!(FrameShape::classify(128), FrameShape::Beacon);
        assert_eq!(FrameShape::classify(60), FrameShape::Data);
        // Unrecognized lengths deliberately fall into the data bucket.
        assert_eq!(FrameShape::classify(0), FrameShape::Data);
        assert_eq!(FrameShape::classify(127), FrameShape::Data);
        assert_eq!(FrameShape::classify(129), FrameShape::Data);
    }

    #[test]
    fn test_ds_status_exhaustive() {
        assert_eq!(DsStatus::from(0x00), DsStatus::NotDs);
        assert_eq!(DsStatus::from(0x01), DsStatus::ToDs);
        assert_eq!(DsStatus::from(0x02), DsStatus::FromDs);
        assert_eq!(DsStatus::from(0x03), DsStatus::DsToDs);
        // Only bits 0-1 participate.
        assert_eq!(DsStatus::from(0xfe), DsStatus::FromDs);
    }

    #[test]
    fn test_rssi_magnitude() {
        let mut bytes = vec![0u8; 128];
        bytes[0] = (-74i8) as u8;
        let frame = RawFrame::new(Bytes::from(bytes));
        assert_eq!(frame.rssi_magnitude(), 74);
    }

    #[test]
    fn test_body_accessors_respect_shape() {
        let beacon = record_of_len(128);
        assert_eq!(beacon.beacon_body().unwrap().len(), BEACON_BODY_LEN);
        assert!(beacon.data_prefix().is_none());

        let data = record_of_len(64);
        assert_eq!(data.data_prefix().unwrap().len(), DATA_PREFIX_LEN);
        assert!(data.beacon_body().is_none());

        let control = record_of_len(12);
        assert!(control.beacon_body().is_none());
        assert!(control.data_prefix().is_none());
    }

    #[test]
    fn test_station_data_gate() {
        let mut bytes = vec![0u8; 64];
        bytes[RX_HEADER_LEN] = 0x08;
        assert!(RawFrame::new(Bytes::from(bytes.clone())).is_station_data());
        bytes[RX_HEADER_LEN] = 0x88;
        assert!(RawFrame::new(Bytes::from(bytes.clone())).is_station_data());
        bytes[RX_HEADER_LEN] = 0x80;
        assert!(!RawFrame::new(Bytes::from(bytes)).is_station_data());
    }
}
