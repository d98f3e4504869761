//! Daemon core
//!
//! The control loop is the sole owner of both inventories. Raw capture
//! records and attack commands arrive over channels, get drained between
//! the timed phases of each pass, and everything else — parsing, storage,
//! channel hopping, reporting, burst transmission — happens inline. A
//! burst therefore blocks the loop for its full duration, which is the
//! intended behavior: there is no feedback to wait on.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::config::DaemonConfig;
use super::io::{raw_frame_channel, FrameInjector, RadioControl, ReportSink};
use crate::beacon::{parse_beacon, AccessPoint};
use crate::forge;
use crate::frame::{FrameShape, MacAddr, RawFrame};
use crate::inventory::Inventory;
use crate::report;
use crate::scan::ScanScheduler;
use crate::station::{parse_station, Station};
use crate::Result;

/// Daemon lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DaemonState {
    Initializing,
    Running,
    Stopping,
    Stopped,
}

/// Daemon counters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonStats {
    /// Capture records received from the radio
    pub frames_seen: u64,
    /// Access-point records parsed cleanly
    pub beacons_parsed: u64,
    /// Station records parsed and kept
    pub stations_parsed: u64,
    /// Records dropped at any stage
    pub frames_dropped: u64,
    /// First sightings across both inventories
    pub discoveries: u64,
    /// Channel hops requested
    pub channel_hops: u64,
    /// Snapshots published across all sinks
    pub reports_published: u64,
    /// Snapshot publications that failed
    pub report_errors: u64,
    /// Deauthentication bursts completed
    pub deauth_bursts: u64,
    /// Spoofed-beacon bursts completed
    pub beacon_bursts: u64,
}

/// Commands the control loop accepts from outside.
#[derive(Debug, Clone)]
pub enum DaemonCommand {
    /// Deauthenticate a stored station off its access point.
    Deauth { station: MacAddr },
    /// Advertise a forged access point.
    SpoofBeacon { ssid: String, packets: u8 },
    /// Stop the control loop.
    Shutdown,
}

/// Handle for feeding the daemon from the outside: the capture backend
/// delivers frames through it and operators issue commands.
#[derive(Debug, Clone)]
pub struct DaemonHandle {
    frames: mpsc::UnboundedSender<RawFrame>,
    commands: mpsc::UnboundedSender<DaemonCommand>,
}

impl DaemonHandle {
    /// Deliver one raw capture record. Never blocks; intended to be called
    /// from the capture backend's receive path.
    pub fn deliver_frame(&self, frame: RawFrame) {
        // A closed channel means the daemon is gone; the record is moot.
        let _ = self.frames.send(frame);
    }

    pub fn deauth(&self, station: MacAddr) {
        let _ = self.commands.send(DaemonCommand::Deauth { station });
    }

    pub fn spoof_beacon(&self, ssid: String, packets: u8) {
        let _ = self.commands.send(DaemonCommand::SpoofBeacon { ssid, packets });
    }

    pub fn shutdown(&self) {
        let _ = self.commands.send(DaemonCommand::Shutdown);
    }
}

/// Main daemon structure.
pub struct AirjamDaemon {
    config: DaemonConfig,
    state: DaemonState,
    stats: DaemonStats,
    beacons: Inventory<AccessPoint>,
    clients: Inventory<Station>,
    scan: ScanScheduler,
    radio: Arc<dyn RadioControl>,
    injector: Arc<dyn FrameInjector>,
    sinks: Vec<Arc<dyn ReportSink>>,
    frames: mpsc::UnboundedReceiver<RawFrame>,
    commands: mpsc::UnboundedReceiver<DaemonCommand>,
}

impl AirjamDaemon {
    /// Create a daemon and the handle that feeds it.
    pub fn new(
        config: DaemonConfig,
        radio: Arc<dyn RadioControl>,
        injector: Arc<dyn FrameInjector>,
        sinks: Vec<Arc<dyn ReportSink>>,
    ) -> (Self, DaemonHandle) {
        let (frame_tx, frame_rx) = raw_frame_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let daemon = Self {
            scan: ScanScheduler::new(config.radio.start_channel),
            beacons: Inventory::new(config.inventory.max_beacons),
            clients: Inventory::new(config.inventory.max_clients),
            config,
            state: DaemonState::Initializing,
            stats: DaemonStats::default(),
            radio,
            injector,
            sinks,
            frames: frame_rx,
            commands: command_rx,
        };
        let handle = DaemonHandle {
            frames: frame_tx,
            commands: command_tx,
        };
        (daemon, handle)
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    pub fn stats(&self) -> &DaemonStats {
        &self.stats
    }

    pub fn beacons(&self) -> &Inventory<AccessPoint> {
        &self.beacons
    }

    pub fn clients(&self) -> &Inventory<Station> {
        &self.clients
    }

    /// Channel the scan currently sits on.
    pub fn channel(&self) -> u8 {
        self.scan.channel()
    }

    /// Classify and parse one capture record into the inventories.
    ///
    /// Every failure path degrades to dropping the record; nothing here
    /// is fatal.
    pub fn ingest(&mut self, frame: RawFrame) {
        self.stats.frames_seen += 1;

        match frame.shape() {
            FrameShape::Control => {
                self.stats.frames_dropped += 1;
            }
            FrameShape::Beacon => {
                let Some(body) = frame.beacon_body() else {
                    self.stats.frames_dropped += 1;
                    return;
                };
                let ap = parse_beacon(body, frame.rssi_magnitude());
                if ap.err {
                    self.stats.frames_dropped += 1;
                    return;
                }
                self.stats.beacons_parsed += 1;
                if !self.beacons.store(ap) {
                    self.scan.note_discovery();
                    self.stats.discoveries += 1;
                }
            }
            FrameShape::Data => {
                if !frame.is_station_data() {
                    self.stats.frames_dropped += 1;
                    return;
                }
                let Some(prefix) = frame.data_prefix() else {
                    self.stats.frames_dropped += 1;
                    return;
                };
                match parse_station(prefix, frame.rssi_magnitude()) {
                    Some(station) if !station.err && !station.is_self_addressed() => {
                        self.stats.stations_parsed += 1;
                        if !self.clients.store(station) {
                            self.scan.note_discovery();
                            self.stats.discoveries += 1;
                        }
                    }
                    _ => {
                        self.stats.frames_dropped += 1;
                    }
                }
            }
        }
    }

    /// Drain every pending capture record.
    pub fn drain_frames(&mut self) {
        while let Ok(frame) = self.frames.try_recv() {
            self.ingest(frame);
        }
    }

    /// Drain pending commands; returns true when a shutdown was requested.
    pub async fn drain_commands(&mut self) -> bool {
        while let Ok(command) = self.commands.try_recv() {
            if self.handle_command(command).await {
                return true;
            }
        }
        false
    }

    /// Execute one command; returns true for shutdown.
    async fn handle_command(&mut self, command: DaemonCommand) -> bool {
        match command {
            DaemonCommand::Deauth { station } => match self.clients.get(&station) {
                Some(record) => {
                    let record = *record;
                    match forge::deauth_burst(self.injector.as_ref(), &record).await {
                        Ok(()) => self.stats.deauth_bursts += 1,
                        Err(e) => log::warn!("deauth burst failed: {}", e),
                    }
                }
                None => log::warn!("deauth requested for unknown station {}", station),
            },
            DaemonCommand::SpoofBeacon { ssid, packets } => {
                match forge::spoofed_beacon_burst(self.injector.as_ref(), &ssid, packets).await {
                    Ok(()) => self.stats.beacon_bursts += 1,
                    Err(e) => log::warn!("beacon burst failed: {}", e),
                }
            }
            DaemonCommand::Shutdown => {
                log::info!("shutdown requested");
                return true;
            }
        }
        false
    }

    /// Advance the scan scheduler one tick and retune when it hops.
    pub async fn scan_tick(&mut self) {
        if let Some(channel) = self.scan.tick() {
            self.stats.channel_hops += 1;
            log::debug!("discovery idle, hopping to channel {}", channel);
            if let Err(e) = self.radio.set_channel(channel).await {
                log::warn!("retune to channel {} failed: {}", channel, e);
            }
        }
    }

    /// Publish the beacon snapshot to every sink.
    pub async fn publish_beacons(&mut self) {
        match report::beacons_json(&self.beacons) {
            Ok(payload) => self.publish(&payload).await,
            Err(e) => {
                self.stats.report_errors += 1;
                log::warn!("beacon snapshot failed: {}", e);
            }
        }
    }

    /// Publish the client snapshot to every sink.
    pub async fn publish_clients(&mut self) {
        match report::clients_json(&self.clients) {
            Ok(payload) => self.publish(&payload).await,
            Err(e) => {
                self.stats.report_errors += 1;
                log::warn!("client snapshot failed: {}", e);
            }
        }
    }

    async fn publish(&mut self, payload: &str) {
        for sink in &self.sinks {
            match sink.publish(payload).await {
                Ok(()) => self.stats.reports_published += 1,
                Err(e) => {
                    self.stats.report_errors += 1;
                    log::warn!("snapshot publish failed: {}", e);
                }
            }
        }
    }

    /// Run the control loop until a shutdown command arrives.
    ///
    /// Each pass: drain frames and commands, give the scheduler its tick,
    /// then publish the beacon and client snapshots one report interval
    /// apart, draining freshly arrived frames after each pause.
    pub async fn run(&mut self) -> Result<()> {
        let interval = Duration::from_millis(self.config.report.interval_ms);

        self.state = DaemonState::Running;
        log::info!(
            "control loop running on {} from channel {}",
            self.config.radio.interface,
            self.scan.channel()
        );
        if let Err(e) = self.radio.set_channel(self.scan.channel()).await {
            log::warn!("initial retune failed: {}", e);
        }

        loop {
            self.drain_frames();
            if self.drain_commands().await {
                break;
            }
            self.scan_tick().await;

            tokio::time::sleep(interval).await;
            self.drain_frames();
            self.publish_beacons().await;

            tokio::time::sleep(interval).await;
            self.drain_frames();
            self.publish_clients().await;
        }

        self.state = DaemonState::Stopping;
        log::info!(
            "stopping after {} frames, {} discoveries, {} hops",
            self.stats.frames_seen,
            self.stats.discoveries,
            self.stats.channel_hops
        );
        self.state = DaemonState::Stopped;
        Ok(())
    }
}
