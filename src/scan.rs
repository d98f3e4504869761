//! Channel-hop scheduling
//!
//! Dwell time on a channel is proportional to how quickly new entities
//! stop appearing: every first sighting resets an idle counter, and only
//! a run of idle control-loop ticks moves the scan to the next channel.

use serde::{Deserialize, Serialize};

use crate::{CHANNEL_MAX, CHANNEL_MIN};

/// Consecutive idle ticks before the scan leaves the current channel.
pub const IDLE_TICKS_BEFORE_HOP: u8 = 10;

/// Discovery-idle channel hop heuristic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanScheduler {
    channel: u8,
    idle_ticks: u8,
    fresh_discovery: bool,
}

impl ScanScheduler {
    pub fn new(start_channel: u8) -> Self {
        Self {
            channel: start_channel.clamp(CHANNEL_MIN, CHANNEL_MAX),
            idle_ticks: 0,
            fresh_discovery: false,
        }
    }

    /// Current scan channel.
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Note that a store() call saw a first sighting since the last tick.
    pub fn note_discovery(&mut self) {
        self.fresh_discovery = true;
    }

    /// Advance the scheduler by one control-loop tick.
    ///
    /// A tick with a discovery since the previous one resets the idle
    /// counter; an idle tick increments it, and the tick on which it
    /// reaches the threshold hops to the next channel (14 wraps to 1) and
    /// returns the channel the radio should retune to.
    pub fn tick(&mut self) -> Option<u8> {
        if std::mem::take(&mut self.fresh_discovery) {
            self.idle_ticks = 0;
            return None;
        }

        self.idle_ticks += 1;
        if self.idle_ticks < IDLE_TICKS_BEFORE_HOP {
            return None;
        }

        self.idle_ticks = 0;
        self.channel += 1;
        if self.channel > CHANNEL_MAX {
            self.channel = CHANNEL_MIN;
        }
        Some(self.channel)
    }
}

impl Default for ScanScheduler {
    fn default() -> Self {
        Self::new(CHANNEL_MIN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hops_after_exactly_ten_idle_ticks() {
        let mut scan = ScanScheduler::new(3);
        for _ in 0..9 {
            assert_eq!(scan.tick(), None);
        }
        assert_eq!(scan.tick(), Some(4));
        assert_eq!(scan.channel(), 4);
    }

    #[test]
    fn test_discovery_resets_idle_run() {
        let mut scan = ScanScheduler::new(1);
        for _ in 0..9 {
            assert_eq!(scan.tick(), None);
        }
        scan.note_discovery();
        // The discovery tick resets the counter; a fresh run of ten idle
        // ticks is needed before the hop.
        assert_eq!(scan.tick(), None);
        for _ in 0..9 {
            assert_eq!(scan.tick(), None);
        }
        assert_eq!(scan.tick(), Some(2));
    }

    #[test]
    fn test_channel_fourteen_wraps_to_one() {
        let mut scan = ScanScheduler::new(14);
        for _ in 0..9 {
            scan.tick();
        }
        assert_eq!(scan.tick(), Some(1));
    }

    #[test]
    fn test_start_channel_clamped_to_scan_range() {
        assert_eq!(ScanScheduler::new(0).channel(), 1);
        assert_eq!(ScanScheduler::new(42).channel(), 14);
    }
}
