//! Configuration validation.

use std::path::Path;

use crate::error::ConfigError;
use crate::loader::ConfigLoader;
use crate::schema::Config;

/// Linux `IFNAMSIZ` minus the terminator.
const MAX_INTERFACE_NAME_LEN: usize = 15;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error into a [`ConfigError::InvalidValue`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_agent(config, &mut result);
        Self::validate_radio(config, &mut result);
        Self::validate_log(config, &mut result);
        Self::validate_simulation(config, &mut result);

        result
    }

    fn validate_agent(config: &Config, result: &mut ValidationResult) {
        let name = &config.agent.interface_name;
        if name.is_empty() {
            result.add_error(ValidationError::new(
                "agent.interface_name",
                "Interface name cannot be empty",
            ));
        } else if name.len() > MAX_INTERFACE_NAME_LEN {
            result.add_error(ValidationError::new(
                "agent.interface_name",
                format!(
                    "Interface name '{}' is longer than {} bytes",
                    name, MAX_INTERFACE_NAME_LEN
                ),
            ));
        }

        if config.agent.poll_timeout_ms == 0 {
            result.add_error(ValidationError::new(
                "agent.poll_timeout_ms",
                "poll_timeout_ms must be greater than 0",
            ));
        }

        if config.agent.poll_timeout_ms > 60_000 {
            result.add_warning(ValidationWarning::new(
                "agent.poll_timeout_ms",
                "poll_timeout_ms is very high (>60s), reset requests may be serviced late",
            ));
        }
    }

    fn validate_radio(config: &Config, result: &mut ValidationResult) {
        if config.radio.device.is_none() {
            result.add_warning(ValidationWarning::new(
                "radio.device",
                "No radio device set, running the simulated NCP",
            ));
        }

        if config.radio.speed_up_factor == 0 {
            result.add_error(ValidationError::new(
                "radio.speed_up_factor",
                "speed_up_factor must be at least 1",
            ));
        }
    }

    fn validate_log(config: &Config, result: &mut ValidationResult) {
        if !(0..=7).contains(&config.log.level) {
            result.add_error(ValidationError::new(
                "log.level",
                format!("Log level {} is outside the syslog range 0..=7", config.log.level),
            ));
        }

        if let Some(dir) = &config.log.file_dir {
            let expanded = ConfigLoader::expand_path(dir);
            if !Path::new(&expanded).is_dir() {
                result.add_warning(ValidationWarning::new(
                    "log.file_dir",
                    format!("Log directory does not exist yet: {}", expanded),
                ));
            }
        }
    }

    fn validate_simulation(config: &Config, result: &mut ValidationResult) {
        let sim = &config.simulation;

        if sim.network_name.is_empty() || sim.network_name.len() > 16 {
            result.add_error(ValidationError::new(
                "simulation.network_name",
                "Network name must be 1 to 16 bytes",
            ));
        }

        if !is_hex_of_len(&sim.ext_pan_id, 16) {
            result.add_error(ValidationError::new(
                "simulation.ext_pan_id",
                "Extended PAN ID must be 16 hex digits",
            ));
        }

        if !is_hex_of_len(&sim.pskc, 32) {
            result.add_error(ValidationError::new(
                "simulation.pskc",
                "PSKc must be 32 hex digits",
            ));
        }
    }
}

fn is_hex_of_len(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
