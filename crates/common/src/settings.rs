use std::fmt;
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use error_stack::{Report, ResultExt};
use serde::Deserialize;
use validator::Validate;

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_CALLBACK_MAX_AGE_SECS, DEFAULT_CALLBACK_MAX_FUTURE_SKEW_SECS,
};
use crate::error::CheckoutError;
use crate::request_signing::FreshnessWindow;

pub const ENVIRONMENT_VARIABLE_PREFIX: &str = "MOR_CHECKOUT";
pub const ENVIRONMENT_VARIABLE_SEPARATOR: &str = "__";

fn default_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

#[derive(Deserialize, Validate, Clone)]
pub struct Api {
    #[serde(default = "default_base_url")]
    #[validate(url)]
    pub base_url: String,
    #[validate(length(min = 1, message = "signing_key must not be empty"))]
    pub signing_key: String,
    #[validate(length(min = 1, message = "partner_domain must not be empty"))]
    pub partner_domain: String,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub timeout_secs: Option<u64>,
}

impl Api {
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("base_url", &self.base_url)
            .field("signing_key", &"<redacted>")
            .field("partner_domain", &self.partner_domain)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_max_age_secs() -> u64 {
    DEFAULT_CALLBACK_MAX_AGE_SECS
}

fn default_max_future_skew_secs() -> u64 {
    DEFAULT_CALLBACK_MAX_FUTURE_SKEW_SECS
}

#[derive(Debug, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct Callback {
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    #[serde(default = "default_max_future_skew_secs")]
    pub max_future_skew_secs: u64,
}

impl Default for Callback {
    fn default() -> Self {
        Self {
            max_age_secs: DEFAULT_CALLBACK_MAX_AGE_SECS,
            max_future_skew_secs: DEFAULT_CALLBACK_MAX_FUTURE_SKEW_SECS,
        }
    }
}

impl Callback {
    #[must_use]
    pub fn freshness_window(&self) -> FreshnessWindow {
        FreshnessWindow {
            max_age_secs: self.max_age_secs,
            max_future_skew_secs: self.max_future_skew_secs,
        }
    }
}

#[derive(Debug, Deserialize, Validate, Clone)]
pub struct Settings {
    #[validate(nested)]
    pub api: Api,
    #[serde(default)]
    #[validate(nested)]
    pub callback: Callback,
}

impl Settings {
    /// Parses settings from TOML and merges `MOR_CHECKOUT__*` environment
    /// overrides, e.g. `MOR_CHECKOUT__API__SIGNING_KEY`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Configuration`] if the TOML is invalid,
    /// required fields are missing, or validation fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, Report<CheckoutError>> {
        let environment = Environment::default()
            .prefix(ENVIRONMENT_VARIABLE_PREFIX)
            .separator(ENVIRONMENT_VARIABLE_SEPARATOR);

        let toml = File::from_str(toml_str, FileFormat::Toml);
        let config = Config::builder()
            .add_source(toml)
            .add_source(environment)
            .build()
            .change_context(CheckoutError::Configuration {
                message: "Failed to build configuration".into(),
            })?;

        let settings: Self =
            config
                .try_deserialize()
                .change_context(CheckoutError::Configuration {
                    message: "Failed to deserialize configuration".into(),
                })?;

        settings
            .validate()
            .change_context(CheckoutError::Configuration {
                message: "Settings validation failed".into(),
            })?;

        Ok(settings)
    }

    /// Reads a TOML file and parses it with [`Settings::from_toml`].
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Configuration`] if the file cannot be read or
    /// its contents are invalid.
    pub fn from_file(path: &Path) -> Result<Self, Report<CheckoutError>> {
        let content = std::fs::read_to_string(path)
            .change_context(CheckoutError::Configuration {
                message: format!("Failed to read settings file {}", path.display()),
            })?;
        Self::from_toml(&content).attach(format!("Settings file: {}", path.display()))
    }
}
