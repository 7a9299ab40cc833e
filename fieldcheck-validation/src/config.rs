// Engine configuration

use crate::{Result, ValidatorError};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Environment variable controlling [`ValidatorConfig::fail_fast`].
pub const FAIL_FAST_ENV: &str = "FIELDCHECK_FAIL_FAST";

/// Validator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Stop at the first failing rule of each field.
    ///
    /// When enabled (the default) a field contributes at most one
    /// [`FieldError`](crate::FieldError). When disabled every violated
    /// rule of the field is reported.
    pub fail_fast: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self { fail_fast: true }
    }
}

impl ValidatorConfig {
    /// Create config from environment variables.
    ///
    /// Unrecognised values are ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = env::var(FAIL_FAST_ENV) {
            match parse_flag(&raw) {
                Some(flag) => config.fail_fast = flag,
                None => warn!(
                    var = FAIL_FAST_ENV,
                    value = %raw,
                    "Ignoring unrecognised boolean"
                ),
            }
        }

        config
    }

    /// Parse configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ValidatorError::Config(e.to_string()))
    }

    /// Set per-field fail-fast behaviour
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
