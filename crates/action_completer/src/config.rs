//! Completer configuration and TOML loading.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Minimum fuzzy score (0-100) accepted when no tolerance is configured.
pub const DEFAULT_FUZZY_TOLERANCE: u8 = 75;

/// Tunables for resolution, completion, and validation.
///
/// Every field has a default, so a TOML document only needs the keys it overrides:
///
/// ```rust
/// use action_completer::CompleterConfig;
///
/// let config = CompleterConfig::from_toml_str("fuzzy_tolerance = 60\n").expect("config");
/// assert_eq!(config.fuzzy_tolerance, 60);
/// assert!(config.validate_choices);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompleterConfig {
    /// Minimum fuzzy score for committing a fuzzy descent and for keeping a completion candidate.
    pub fuzzy_tolerance: u8,
    /// Reject parameter values outside a fixed value/set/dynamic source when the parameter has no
    /// custom validators.
    pub validate_choices: bool,
    /// Escape whitespace in candidate values so they re-tokenize as one fragment.
    pub encode_completions: bool,
}

impl Default for CompleterConfig {
    fn default() -> Self {
        Self {
            fuzzy_tolerance: DEFAULT_FUZZY_TOLERANCE,
            validate_choices: true,
            encode_completions: true,
        }
    }
}

impl CompleterConfig {
    /// Parses and validates a TOML config body.
    pub fn from_toml_str(body: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(body).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let body = fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&body)
    }

    /// Checks semantic constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fuzzy_tolerance > 100 {
            return Err(ConfigError::ToleranceOutOfRange(self.fuzzy_tolerance));
        }
        Ok(())
    }

    /// Sets the fuzzy tolerance.
    pub fn with_fuzzy_tolerance(mut self, tolerance: u8) -> Self {
        self.fuzzy_tolerance = tolerance;
        self
    }
}
