//! CLI definitions for the OTBR agent.

use std::path::PathBuf;

use clap::Parser;

use otbr_config::Config;

/// OTBR agent CLI.
#[derive(Debug, Parser)]
#[command(name = "otbr-agent")]
#[command(about = "Thread border router agent")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Thread network interface name
    #[arg(short = 'I', long = "thread-ifname")]
    pub thread_ifname: Option<String>,

    /// Syslog debug level (0-7)
    #[arg(short, long = "debug-level")]
    pub debug_level: Option<i32>,

    /// Log to the console at debug detail
    #[arg(short, long)]
    pub verbose: bool,

    /// Print every event as a JSON line on stdout
    #[arg(long)]
    pub print_events: bool,

    /// Radio device path or URL
    pub radio_device: Option<String>,

    /// Radio driver configuration
    pub radio_config: Option<String>,
}

impl Cli {
    /// Overlay command line flags on the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ifname) = &self.thread_ifname {
            config.agent.interface_name = ifname.clone();
        }
        if let Some(level) = self.debug_level {
            config.log.level = level;
        }
        if self.verbose {
            config.log.verbose = true;
        }
        if self.print_events {
            config.agent.print_events = true;
        }
        if let Some(device) = &self.radio_device {
            config.radio.device = Some(device.clone());
        }
        if let Some(radio_config) = &self.radio_config {
            config.radio.config = Some(radio_config.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags_and_positionals() {
        let cli = Cli::try_parse_from([
            "otbr-agent",
            "-I",
            "wpan1",
            "-d",
            "7",
            "-v",
            "spinel+hdlc+uart:///dev/ttyACM0",
            "uart-baudrate=460800",
        ])
        .unwrap();

        assert_eq!(cli.thread_ifname.as_deref(), Some("wpan1"));
        assert_eq!(cli.debug_level, Some(7));
        assert!(cli.verbose);
        assert_eq!(
            cli.radio_device.as_deref(),
            Some("spinel+hdlc+uart:///dev/ttyACM0")
        );
        assert_eq!(cli.radio_config.as_deref(), Some("uart-baudrate=460800"));
    }

    #[test]
    fn test_apply_overrides_only_given_flags() {
        let cli = Cli::try_parse_from(["otbr-agent", "--thread-ifname", "wpan9"]).unwrap();
        let mut config = Config::default();
        config.log.level = 3;

        cli.apply(&mut config);

        assert_eq!(config.agent.interface_name, "wpan9");
        assert_eq!(config.log.level, 3);
        assert!(!config.log.verbose);
        assert!(config.radio.device.is_none());
    }

    #[test]
    fn test_non_numeric_debug_level_rejected() {
        assert!(Cli::try_parse_from(["otbr-agent", "-d", "loud"]).is_err());
    }
}
