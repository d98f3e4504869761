//! Daemon configuration
//!
//! Configuration is a plain serde structure with sane defaults, loadable
//! from a JSON file and overridable from the command line.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{AirjamError, Result, CHANNEL_MAX, CHANNEL_MIN, MAX_BEACONS, MAX_CLIENTS};

/// Main daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// General daemon settings
    pub general: GeneralConfig,
    /// Radio and scan settings
    pub radio: RadioConfig,
    /// Inventory capacities
    pub inventory: InventoryConfig,
    /// Reporting settings
    pub report: ReportConfig,
}

/// General daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Name this node reports under
    pub node_name: String,
    /// Run without touching hardware (loopback radio)
    pub dry_run: bool,
}

/// Radio configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioConfig {
    /// Monitor-mode interface name
    pub interface: String,
    /// Channel the scan starts on
    pub start_channel: u8,
}

/// Inventory capacities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Access-point table capacity
    pub max_beacons: usize,
    /// Station table capacity
    pub max_clients: usize,
}

/// Reporting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Pause between the hop check, the beacon snapshot, and the client
    /// snapshot, in milliseconds
    pub interval_ms: u64,
    /// Publish snapshots on stdout
    pub console: bool,
    /// Optional message-bus destination, `host:port`
    pub bus_addr: Option<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig {
                node_name: "airjam-node".to_string(),
                dry_run: false,
            },
            radio: RadioConfig {
                interface: "wlan0".to_string(),
                start_channel: CHANNEL_MIN,
            },
            inventory: InventoryConfig {
                max_beacons: MAX_BEACONS,
                max_clients: MAX_CLIENTS,
            },
            report: ReportConfig {
                interval_ms: 2000,
                console: true,
                bus_addr: None,
            },
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| AirjamError::Config(format!("read {}: {}", path.display(), e)))?;
        let config: DaemonConfig = serde_json::from_str(&content)
            .map_err(|e| AirjamError::Config(format!("parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
            .map_err(|e| AirjamError::Config(format!("write {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Check the configuration for values the daemon cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.radio.interface.is_empty() {
            return Err(AirjamError::Config("radio.interface is empty".to_string()));
        }
        if !(CHANNEL_MIN..=CHANNEL_MAX).contains(&self.radio.start_channel) {
            return Err(AirjamError::Config(format!(
                "radio.start_channel {} outside {}-{}",
                self.radio.start_channel, CHANNEL_MIN, CHANNEL_MAX
            )));
        }
        if self.inventory.max_beacons == 0 || self.inventory.max_clients == 0 {
            return Err(AirjamError::Config(
                "inventory capacities must be non-zero".to_string(),
            ));
        }
        if self.report.interval_ms == 0 {
            return Err(AirjamError::Config(
                "report.interval_ms must be non-zero".to_string(),
            ));
        }
        if let Some(addr) = &self.report.bus_addr {
            addr.parse::<std::net::SocketAddr>().map_err(|e| {
                AirjamError::Config(format!("report.bus_addr \"{}\": {}", addr, e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DaemonConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.radio.start_channel, 1);
        assert_eq!(config.inventory.max_beacons, 256);
        assert_eq!(config.report.interval_ms, 2000);
    }

    #[test]
    fn test_validate_rejects_out_of_range_channel() {
        let mut config = DaemonConfig::default();
        config.radio.start_channel = 15;
        assert!(config.validate().is_err());
        config.radio.start_channel = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = DaemonConfig::default();
        config.inventory.max_beacons = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_bus_addr() {
        let mut config = DaemonConfig::default();
        config.report.bus_addr = Some("not-an-addr".to_string());
        assert!(config.validate().is_err());
        config.report.bus_addr = Some("127.0.0.1:9999".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_round_trips_through_json() {
        let config = DaemonConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: DaemonConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.radio.interface, config.radio.interface);
        assert_eq!(back.report.interval_ms, config.report.interval_ms);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = DaemonConfig::load(Path::new("/nonexistent/airjam.json")).unwrap_err();
        assert!(matches!(err, AirjamError::Config(_)));
    }
}
