//! Mapping from the file/CLI configuration to adapter settings.

use std::time::Duration;

use anyhow::{Context, Result};

use otbr_config::{Config, StaleTimers};
use otbr_ncp::sim::SimConfig;
use otbr_ncp::{ExtPanId, NcpConfig, Pskc, RadioConfig, StaleTimerPolicy, ThreadVersion};

pub(crate) fn ncp_config(config: &Config) -> NcpConfig {
    NcpConfig {
        radio: RadioConfig {
            interface_name: config.agent.interface_name.clone(),
            device: config.radio.device.clone(),
            config: config.radio.config.clone(),
            reset_radio: config.radio.reset_radio,
            speed_up_factor: config.radio.speed_up_factor,
        },
        resume_network: config.agent.resume_network,
        stale_timers: match config.agent.stale_timers {
            StaleTimers::Purge => StaleTimerPolicy::Purge,
            StaleTimers::Keep => StaleTimerPolicy::Keep,
        },
        debug_level: config.log.level,
    }
}

pub(crate) fn sim_config(config: &Config) -> Result<SimConfig> {
    let sim = &config.simulation;
    Ok(SimConfig {
        network_name: sim.network_name.clone(),
        ext_pan_id: ExtPanId::from_hex(&sim.ext_pan_id)
            .with_context(|| format!("invalid simulation.ext_pan_id '{}'", sim.ext_pan_id))?,
        pskc: Pskc::from_hex(&sim.pskc)
            .with_context(|| format!("invalid simulation.pskc '{}'", sim.pskc))?,
        thread_version: ThreadVersion(sim.thread_version),
        attach_delay: Duration::from_millis(sim.attach_delay_ms),
        dataset: sim.dataset,
    })
}

pub(crate) fn poll_timeout(config: &Config) -> Duration {
    Duration::from_millis(config.agent.poll_timeout_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_map_through() {
        let config = Config::default();
        let ncp = ncp_config(&config);

        assert_eq!(ncp, NcpConfig::default());
        assert_eq!(poll_timeout(&config), Duration::from_secs(10));
    }

    #[test]
    fn test_overrides_map_through() {
        let mut config = Config::default();
        config.agent.interface_name = "wpan3".to_string();
        config.agent.stale_timers = StaleTimers::Keep;
        config.radio.device = Some("spinel+hdlc+uart:///dev/ttyACM0".to_string());
        config.log.level = 7;

        let ncp = ncp_config(&config);

        assert_eq!(ncp.radio.interface_name, "wpan3");
        assert_eq!(ncp.stale_timers, StaleTimerPolicy::Keep);
        assert_eq!(ncp.radio.device.as_deref(), Some("spinel+hdlc+uart:///dev/ttyACM0"));
        assert_eq!(ncp.debug_level, 7);
    }

    #[test]
    fn test_sim_config_defaults_match() {
        let sim = sim_config(&Config::default()).unwrap();
        assert_eq!(sim, SimConfig::default());
    }

    #[test]
    fn test_sim_config_bad_hex() {
        let mut config = Config::default();
        config.simulation.pskc = "nothex".to_string();

        let err = sim_config(&config).unwrap_err();
        assert!(err.to_string().contains("simulation.pskc"));
    }
}
