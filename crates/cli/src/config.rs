//! Configuration commands.
//!
//! Configuration is loaded from a TOML file and merged with environment
//! variables prefixed with `MOR_CHECKOUT__`. For example,
//! `MOR_CHECKOUT__API__SIGNING_KEY` overrides `api.signing_key`, which keeps
//! the secret out of the file.

use std::path::Path;

use mor_checkout_common::settings::Settings;

use crate::error::CliError;

/// Load, merge and validate settings from `file`.
pub(crate) fn load_settings(file: &Path, verbose: bool) -> Result<Settings, CliError> {
    if !file.exists() {
        return Err(CliError::Config(format!(
            "Config file not found: {} (use --config or MOR_CHECKOUT_CONFIG)",
            file.display()
        )));
    }

    if verbose {
        log::debug!("Loading config from: {}", file.display());
        log::debug!("Environment variables with MOR_CHECKOUT__ prefix will be merged");
    }

    let settings = Settings::from_file(file)?;
    log::debug!("Settings {settings:?}");
    Ok(settings)
}

/// Summary of the effective settings. Never includes the signing key.
pub(crate) fn describe(settings: &Settings) -> Vec<String> {
    let timeout = settings
        .api
        .timeout_secs
        .map_or_else(|| "none".to_string(), |secs| format!("{secs}s"));
    vec![
        format!("API base URL: {}", settings.api.base_url),
        format!("Partner domain: {}", settings.api.partner_domain),
        format!("Request timeout: {timeout}"),
        format!(
            "Callback window: {}s past, {}s future",
            settings.callback.max_age_secs, settings.callback.max_future_skew_secs
        ),
    ]
}

/// Validate configuration file.
pub fn validate(file: &Path, verbose: bool) -> Result<(), CliError> {
    let settings = load_settings(file, verbose)?;

    println!("Configuration is valid");
    println!("  File: {}", file.display());
    for line in describe(&settings) {
        println!("  {line}");
    }

    Ok(())
}
