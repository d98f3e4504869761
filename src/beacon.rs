//! Access-point records and beacon body parsing
//!
//! A beacon-shaped capture carries a 112-byte management body. The BSSID
//! sits at a fixed offset; SSID and channel are recovered by walking the
//! tag-length-value information elements that start at body offset 36.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::frame::MacAddr;

/// Offset of the BSSID (address 3) within the beacon body.
pub const BSSID_OFFSET: usize = 10;
/// Offset where the information elements begin within the beacon body.
pub const IE_OFFSET: usize = 36;
/// Longest SSID an element may carry.
pub const SSID_MAX_LEN: usize = 32;

/// Information element tags the parser acts on.
const TAG_SSID: u8 = 0x00;
const TAG_DS_CHANNEL: u8 = 0x03;

/// One observed access point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPoint {
    /// Address identifying the access point.
    pub bssid: MacAddr,
    /// SSID bytes; only the first `ssid_len` are meaningful, the rest stay
    /// zeroed.
    pub ssid: [u8; SSID_MAX_LEN],
    /// Number of meaningful SSID bytes. Zero means empty/cleared.
    pub ssid_len: u8,
    /// Advertised channel, 1-14; zero when no channel element was seen.
    pub channel: u8,
    /// Signal magnitude in dB below zero.
    pub rssi: u8,
    /// Set when the SSID length was out of range or the element walk never
    /// started. Erroneous records are dropped before storage.
    pub err: bool,
    /// When this record was last parsed.
    pub last_seen: DateTime<Utc>,
}

impl AccessPoint {
    /// The meaningful SSID bytes.
    pub fn ssid_bytes(&self) -> &[u8] {
        &self.ssid[..self.ssid_len as usize]
    }

    /// SSID rendered as text; non-UTF-8 bytes are replaced.
    pub fn ssid_lossy(&self) -> String {
        String::from_utf8_lossy(self.ssid_bytes()).into_owned()
    }
}

/// Parse an access-point record out of a beacon body.
///
/// The walk only runs when the first element tag at offset 36 is the SSID
/// tag; otherwise the record is flagged erroneous and SSID/channel are left
/// untouched. The BSSID is copied from its fixed offset either way. A
/// channel element ends the walk immediately; a truncated element flags the
/// record and ends it too.
pub fn parse_beacon(body: &[u8], rssi: u8) -> AccessPoint {
    let mut ap = AccessPoint {
        bssid: MacAddr::from_slice(body, BSSID_OFFSET).unwrap_or(MacAddr([0; 6])),
        ssid: [0; SSID_MAX_LEN],
        ssid_len: 0,
        channel: 0,
        rssi,
        err: false,
        last_seen: Utc::now(),
    };

    if body.get(IE_OFFSET).copied() == Some(TAG_SSID) {
        let mut pos = IE_OFFSET;
        while pos < body.len() {
            let Some(&elem_len) = body.get(pos + 1) else {
                break;
            };
            match body[pos] {
                TAG_SSID => {
                    let len = elem_len as usize;
                    if len == 0 {
                        ap.ssid = [0; SSID_MAX_LEN];
                        ap.ssid_len = 0;
                    } else if len > SSID_MAX_LEN {
                        ap.err = true;
                    } else if let Some(value) = body.get(pos + 2..pos + 2 + len) {
                        ap.ssid = [0; SSID_MAX_LEN];
                        ap.ssid[..len].copy_from_slice(value);
                        ap.ssid_len = elem_len;
                        ap.err = false;
                    } else {
                        // Element runs past the body; nothing copied.
                        ap.err = true;
                        break;
                    }
                }
                TAG_DS_CHANNEL => {
                    if let Some(&channel) = body.get(pos + 2) {
                        ap.channel = channel;
                    }
                    // The walk never continues past the channel element.
                    break;
                }
                _ => {}
            }
            pos += elem_len as usize + 2;
        }
    } else {
        ap.err = true;
    }

    ap
}
