//! Airjam daemon binary
//!
//! Parses the command line, loads configuration, sets up logging and
//! signal handling, and runs the sniffer control loop.

use airjam::daemon::{DaemonBuilder, DaemonConfig, DaemonHandle, DaemonUtils};
use airjam::{AirjamError, Result};
use clap::{Arg, Command};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Default configuration file path
const DEFAULT_CONFIG_PATH: &str = "/etc/airjam/daemon.json";

/// Default log level
const DEFAULT_LOG_LEVEL: &str = "info";

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("airjam-daemon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Monitor-mode 802.11 sniffer and disruption daemon")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .default_value(DEFAULT_CONFIG_PATH),
        )
        .arg(
            Arg::new("interface")
                .short('i')
                .long("interface")
                .value_name("INTERFACE")
                .help("Monitor-mode interface to use"),
        )
        .arg(
            Arg::new("channel")
                .long("channel")
                .value_name("N")
                .help("Channel the scan starts on"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
                .default_value(DEFAULT_LOG_LEVEL),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Run against a loopback radio instead of hardware")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = matches.get_one::<String>("log-level").expect("has default");
    init_logging(log_level)?;

    info!("starting airjam daemon v{}", env!("CARGO_PKG_VERSION"));

    let config_path = PathBuf::from(matches.get_one::<String>("config").expect("has default"));
    let mut config = load_configuration(&config_path);

    if let Some(interface) = matches.get_one::<String>("interface") {
        config.radio.interface = interface.clone();
    }
    if let Some(channel) = matches.get_one::<String>("channel") {
        config.radio.start_channel = channel
            .parse()
            .map_err(|e| AirjamError::Config(format!("--channel {}: {}", channel, e)))?;
    }
    if matches.get_flag("dry-run") {
        config.general.dry_run = true;
    }

    if !config.general.dry_run && !DaemonUtils::is_privileged() {
        error!("raw monitor-mode capture requires root privileges (or use --dry-run)");
        std::process::exit(1);
    }

    let (mut daemon, handle) = DaemonBuilder::new().with_config(config).build().await?;
    setup_signal_handlers(handle.clone());

    info!("daemon pid {}", DaemonUtils::get_pid());
    let result = daemon.run().await;
    match &result {
        Ok(()) => info!("airjam daemon shutdown complete"),
        Err(e) => error!("airjam daemon error: {}", e),
    }
    result
}

/// Initialize the logging system.
fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .map_err(|e| AirjamError::Config(format!("invalid log level '{}': {}", level, e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    Ok(())
}

/// Load daemon configuration, falling back to defaults when the file does
/// not exist.
fn load_configuration(config_path: &PathBuf) -> DaemonConfig {
    if !config_path.exists() {
        warn!(
            "configuration file not found: {}, using defaults",
            config_path.display()
        );
        return DaemonConfig::default();
    }

    info!("loading configuration from: {}", config_path.display());
    match DaemonConfig::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{}; using defaults", e);
            DaemonConfig::default()
        }
    }
}

/// Route termination signals into a daemon shutdown command.
fn setup_signal_handlers(handle: DaemonHandle) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to register SIGTERM handler");
            let mut sigint =
                signal(SignalKind::interrupt()).expect("failed to register SIGINT handler");

            tokio::select! {
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating graceful shutdown");
                }
                _ = sigint.recv() => {
                    info!("received SIGINT, initiating graceful shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
            info!("received Ctrl+C, initiating graceful shutdown");
        }

        handle.shutdown();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_CONFIG_PATH, "/etc/airjam/daemon.json");
        assert_eq!(DEFAULT_LOG_LEVEL, "info");
    }

    #[test]
    fn test_load_nonexistent_config_falls_back_to_defaults() {
        let config = load_configuration(&PathBuf::from("/nonexistent/airjam.json"));
        assert_eq!(config.general.node_name, "airjam-node");
    }
}
