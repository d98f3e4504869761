//! JSON inventory snapshots
//!
//! Each report cycle publishes two JSON objects, beacons then clients,
//! keyed by lowercase colon-separated MAC addresses in slot order. The
//! output format is fixed wire contract for downstream consumers:
//!
//! `{"<bssid>":{"channel":<int>,"rssi":-<uint>,"ssid":"<text>"},...}`
//! `{"<station>":{"beacon":"<ap>","rssi":-<uint>},...}`
//!
//! An empty inventory serializes to `{}`. Serialization streams straight
//! through serde_json's compact writer, which also supplies the string
//! escaping the keys and SSID text need.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::beacon::AccessPoint;
use crate::inventory::Inventory;
use crate::station::Station;
use crate::Result;

/// Beacon inventory snapshot, serialized in slot order.
pub struct BeaconReport<'a>(pub &'a Inventory<AccessPoint>);

/// Client inventory snapshot, serialized in slot order.
pub struct ClientReport<'a>(pub &'a Inventory<Station>);

/// Combined snapshot of both inventories.
#[derive(serde::Serialize)]
pub struct Snapshot<'a> {
    pub beacons: BeaconReport<'a>,
    pub clients: ClientReport<'a>,
}

#[derive(serde::Serialize)]
struct BeaconEntry<'a> {
    channel: u8,
    rssi: i32,
    ssid: &'a str,
}

#[derive(serde::Serialize)]
struct ClientEntry {
    beacon: String,
    rssi: i32,
}

impl Serialize for BeaconReport<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for ap in self.0.iter() {
            let ssid = ap.ssid_lossy();
            map.serialize_entry(
                &ap.bssid.to_string(),
                &BeaconEntry {
                    channel: ap.channel,
                    rssi: -(ap.rssi as i32),
                    ssid: &ssid,
                },
            )?;
        }
        map.end()
    }
}

impl Serialize for ClientReport<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for station in self.0.iter() {
            map.serialize_entry(
                &station.station.to_string(),
                &ClientEntry {
                    beacon: station.ap.to_string(),
                    rssi: -(station.rssi as i32),
                },
            )?;
        }
        map.end()
    }
}

/// Render the beacon inventory as its JSON object.
pub fn beacons_json(inventory: &Inventory<AccessPoint>) -> Result<String> {
    Ok(serde_json::to_string(&BeaconReport(inventory))?)
}

/// Render the client inventory as its JSON object.
pub fn clients_json(inventory: &Inventory<Station>) -> Result<String> {
    Ok(serde_json::to_string(&ClientReport(inventory))?)
}

/// Render the combined `{"beacons":...,"clients":...}` snapshot.
pub fn snapshot_json(
    beacons: &Inventory<AccessPoint>,
    clients: &Inventory<Station>,
) -> Result<String> {
    Ok(serde_json::to_string(&Snapshot {
        beacons: BeaconReport(beacons),
        clients: ClientReport(clients),
    })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beacon::SSID_MAX_LEN;
    use crate::frame::MacAddr;
    use crate::{MAX_BEACONS, MAX_CLIENTS};
    use chrono::Utc;

    fn ap(bssid: [u8; 6], ssid: &[u8], channel: u8, rssi: u8) -> AccessPoint {
        let mut stored = [0u8; SSID_MAX_LEN];
        stored[..ssid.len()].copy_from_slice(ssid);
        AccessPoint {
            bssid: MacAddr(bssid),
            ssid: stored,
            ssid_len: ssid.len() as u8,
            channel,
            rssi,
            err: false,
            last_seen: Utc::now(),
        }
    }

    fn client(station: [u8; 6], ap: [u8; 6], rssi: u8) -> Station {
        Station {
            station: MacAddr(station),
            ap: MacAddr(ap),
            rssi,
            seq: 0,
            err: false,
            last_seen: Utc::now(),
        }
    }

    #[test]
    fn test_empty_inventories_serialize_to_bare_objects() {
        let beacons: Inventory<AccessPoint> = Inventory::new(MAX_BEACONS);
        let clients: Inventory<Station> = Inventory::new(MAX_CLIENTS);

        assert_eq!(beacons_json(&beacons).unwrap(), "{}");
        assert_eq!(clients_json(&clients).unwrap(), "{}");
        assert_eq!(
            snapshot_json(&beacons, &clients).unwrap(),
            r#"{"beacons":{},"clients":{}}"#
        );
    }

    #[test]
    fn test_beacon_report_byte_exact() {
        let mut beacons = Inventory::new(MAX_BEACONS);
        beacons.store(ap([0xde, 0xad, 0xbe, 0xef, 0x00, 0x01], b"Home", 6, 74));

        assert_eq!(
            beacons_json(&beacons).unwrap(),
            r#"{"de:ad:be:ef:00:01":{"channel":6,"rssi":-74,"ssid":"Home"}}"#
        );
    }

    #[test]
    fn test_beacon_report_multiple_entries_in_slot_order() {
        let mut beacons = Inventory::new(MAX_BEACONS);
        beacons.store(ap([1, 1, 1, 1, 1, 1], b"a", 1, 10));
        beacons.store(ap([2, 2, 2, 2, 2, 2], b"b", 11, 20));

        assert_eq!(
            beacons_json(&beacons).unwrap(),
            r#"{"01:01:01:01:01:01":{"channel":1,"rssi":-10,"ssid":"a"},"02:02:02:02:02:02":{"channel":11,"rssi":-20,"ssid":"b"}}"#
        );
    }

    #[test]
    fn test_client_report_byte_exact() {
        let mut clients = Inventory::new(MAX_CLIENTS);
        clients.store(client(
            [0xaa, 0x00, 0x00, 0x00, 0x00, 0x01],
            [0xbb, 0x00, 0x00, 0x00, 0x00, 0x02],
            41,
        ));

        assert_eq!(
            clients_json(&clients).unwrap(),
            r#"{"aa:00:00:00:00:01":{"beacon":"bb:00:00:00:00:02","rssi":-41}}"#
        );
    }

    #[test]
    fn test_ssid_text_is_escaped() {
        let mut beacons = Inventory::new(MAX_BEACONS);
        beacons.store(ap([0; 6], b"sa\"y", 3, 5));

        assert_eq!(
            beacons_json(&beacons).unwrap(),
            r#"{"00:00:00:00:00:00":{"channel":3,"rssi":-5,"ssid":"sa\"y"}}"#
        );
    }

    #[test]
    fn test_unknown_channel_serializes_as_zero() {
        let mut beacons = Inventory::new(MAX_BEACONS);
        beacons.store(ap([9; 6], b"x", 0, 1));
        assert!(beacons_json(&beacons).unwrap().contains(r#""channel":0"#));
    }
}
