//! Studio configuration
//!
//! Optional JSON file named by `CARDSMITH_CONFIG_PATH`. Every field has a
//! default, so an empty object is a valid config.

use crate::error::{CardError, Result};
use crate::traits::localization::{is_supported_locale, FALLBACK_LOCALE, SUPPORTED_LOCALES};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::{env, fs};
use tracing::debug;

pub const CONFIG_PATH_ENV: &str = "CARDSMITH_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Locale for trait labels (default: en-US)
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Pretty-print written project files (default: true)
    #[serde(default = "default_pretty_json")]
    pub pretty_json: bool,

    /// Batch size at which card recompute switches to rayon (default: 64)
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

fn default_locale() -> String {
    FALLBACK_LOCALE.to_string()
}
fn default_pretty_json() -> bool {
    true
}
fn default_parallel_threshold() -> usize {
    64
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            pretty_json: default_pretty_json(),
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

impl StudioConfig {
    /// Load from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            CardError::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: StudioConfig = serde_json::from_str(json)
            .map_err(|e| CardError::InvalidConfig(format!("Failed to parse config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Config from `CARDSMITH_CONFIG_PATH`, defaults when unset or blank
    pub fn from_env() -> Result<Self> {
        let Ok(path) = env::var(CONFIG_PATH_ENV) else {
            return Ok(Self::default());
        };

        let path = path.trim();
        if path.is_empty() {
            return Ok(Self::default());
        }

        debug!(path, "loading studio config from {CONFIG_PATH_ENV}");
        Self::load(path)
    }

    pub fn validate(&self) -> Result<()> {
        if !is_supported_locale(&self.locale) {
            return Err(CardError::InvalidConfig(format!(
                "locale must be one of {:?}, got '{}'",
                SUPPORTED_LOCALES, self.locale
            )));
        }
        if self.parallel_threshold == 0 {
            return Err(CardError::InvalidConfig("parallel_threshold must be >= 1".into()));
        }
        Ok(())
    }
}
