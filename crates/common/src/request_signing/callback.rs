//! Validation of the signed redirect that returns a shopper to the partner site.
//!
//! After payment the hosted page redirects to the partner's success or failure
//! URL with `mor_order_id`, `external_order_id`, `timestamp` and `nonce` query
//! parameters. The nonce is `HMAC-SHA256(key, external_order_id + timestamp)`.
//! A callback is accepted only when every parameter is present, the timestamp
//! sits inside the freshness window and the nonce matches.

use chrono::{DateTime, TimeDelta, Utc};
use error_stack::Report;
use url::Url;

use crate::constants::{
    DEFAULT_CALLBACK_MAX_AGE_SECS, DEFAULT_CALLBACK_MAX_FUTURE_SKEW_SECS, PARAM_EXTERNAL_ORDER_ID,
    PARAM_MOR_ORDER_ID, PARAM_NONCE, PARAM_TIMESTAMP,
};
use crate::error::CallbackError;
use crate::request_signing::signing;
use crate::request_signing::timestamp::parse_timestamp;

/// Parameters carried on the redirect back from the hosted payment page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectCallback {
    pub mor_order_id: String,
    pub external_order_id: String,
    pub timestamp: String,
    pub nonce: String,
}

impl RedirectCallback {
    /// Extracts the callback from a raw query string (with or without `?`).
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::MissingParameter`] naming the first required
    /// parameter that is absent or empty.
    pub fn from_query(query: &str) -> Result<Self, Report<CallbackError>> {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    /// Extracts the callback from a full return URL.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::InvalidReturnUrl`] if the URL cannot be parsed
    /// and [`CallbackError::MissingParameter`] if it lacks a required
    /// parameter.
    pub fn from_url(return_url: &str) -> Result<Self, Report<CallbackError>> {
        let url = Url::parse(return_url).map_err(|e| {
            Report::new(CallbackError::InvalidReturnUrl {
                message: e.to_string(),
            })
        })?;
        Self::from_pairs(url.query_pairs())
    }

    fn from_pairs<'a, I>(pairs: I) -> Result<Self, Report<CallbackError>>
    where
        I: Iterator<Item = (std::borrow::Cow<'a, str>, std::borrow::Cow<'a, str>)>,
    {
        let mut mor_order_id = None;
        let mut external_order_id = None;
        let mut timestamp = None;
        let mut nonce = None;

        for (name, value) in pairs {
            let slot = match name.as_ref() {
                PARAM_MOR_ORDER_ID => &mut mor_order_id,
                PARAM_EXTERNAL_ORDER_ID => &mut external_order_id,
                PARAM_TIMESTAMP => &mut timestamp,
                PARAM_NONCE => &mut nonce,
                _ => continue,
            };
            if slot.is_none() && !value.is_empty() {
                *slot = Some(value.into_owned());
            }
        }

        Ok(Self {
            mor_order_id: required(mor_order_id, PARAM_MOR_ORDER_ID)?,
            external_order_id: required(external_order_id, PARAM_EXTERNAL_ORDER_ID)?,
            timestamp: required(timestamp, PARAM_TIMESTAMP)?,
            nonce: required(nonce, PARAM_NONCE)?,
        })
    }
}

fn required(value: Option<String>, name: &str) -> Result<String, Report<CallbackError>> {
    value.ok_or_else(|| {
        Report::new(CallbackError::MissingParameter {
            name: name.to_string(),
        })
    })
}

/// Freshness window applied to callback timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessWindow {
    /// Oldest accepted age; an age equal to this value is still accepted.
    pub max_age_secs: u64,
    /// Furthest a timestamp may sit ahead of the validator's clock.
    pub max_future_skew_secs: u64,
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        Self {
            max_age_secs: DEFAULT_CALLBACK_MAX_AGE_SECS,
            max_future_skew_secs: DEFAULT_CALLBACK_MAX_FUTURE_SKEW_SECS,
        }
    }
}

/// Verifies a callback's timestamp and nonce.
///
/// # Errors
///
/// - [`CallbackError::InvalidTimestamp`] if the timestamp cannot be parsed
/// - [`CallbackError::ExpiredTimestamp`] if it is older than the window allows
/// - [`CallbackError::TimestampInFuture`] if it is too far ahead of `now`
/// - [`CallbackError::InvalidSignature`] if the nonce does not match
pub fn verify(
    external_order_id: &str,
    timestamp: &str,
    nonce: &str,
    key: &[u8],
    now: DateTime<Utc>,
    window: FreshnessWindow,
) -> Result<(), Report<CallbackError>> {
    let issued_at = parse_timestamp(timestamp).ok_or_else(|| {
        Report::new(CallbackError::InvalidTimestamp {
            value: timestamp.to_string(),
        })
    })?;

    // Compared at full precision; whole seconds are only for reporting.
    let age = now - issued_at;
    if age > window_limit(window.max_age_secs) {
        let age_secs = age.num_seconds();
        log::warn!(
            "Rejecting callback for {}: timestamp {} is {}s old",
            external_order_id,
            timestamp,
            age_secs
        );
        return Err(Report::new(CallbackError::ExpiredTimestamp { age_secs }));
    }
    if -age > window_limit(window.max_future_skew_secs) {
        let skew_secs = (-age).num_seconds();
        log::warn!(
            "Rejecting callback for {}: timestamp {} is {}s in the future",
            external_order_id,
            timestamp,
            skew_secs
        );
        return Err(Report::new(CallbackError::TimestampInFuture { skew_secs }));
    }

    if !signing::verify_signature(external_order_id, timestamp, key, nonce) {
        log::warn!("Rejecting callback for {}: nonce mismatch", external_order_id);
        return Err(Report::new(CallbackError::InvalidSignature));
    }

    Ok(())
}

/// Boolean form of [`verify`] using the default freshness window.
#[must_use]
pub fn validate(
    external_order_id: &str,
    timestamp: &str,
    nonce: &str,
    key: &[u8],
    now: DateTime<Utc>,
) -> bool {
    verify(
        external_order_id,
        timestamp,
        nonce,
        key,
        now,
        FreshnessWindow::default(),
    )
    .is_ok()
}

fn window_limit(secs: u64) -> TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

/// Validates inbound callbacks against a shared key and freshness window.
#[derive(Clone)]
pub struct CallbackValidator {
    key: Vec<u8>,
    window: FreshnessWindow,
}

impl CallbackValidator {
    pub fn new(key: impl AsRef<[u8]>, window: FreshnessWindow) -> Self {
        Self {
            key: key.as_ref().to_vec(),
            window,
        }
    }

    /// Checks an already extracted callback.
    ///
    /// # Errors
    ///
    /// See [`verify`].
    pub fn verify(
        &self,
        callback: &RedirectCallback,
        now: DateTime<Utc>,
    ) -> Result<(), Report<CallbackError>> {
        verify(
            &callback.external_order_id,
            &callback.timestamp,
            &callback.nonce,
            &self.key,
            now,
            self.window,
        )
    }

    /// Extracts and checks the callback carried by a return URL.
    ///
    /// # Errors
    ///
    /// Returns [`CallbackError::InvalidReturnUrl`] or
    /// [`CallbackError::MissingParameter`] if the callback cannot be
    /// extracted, otherwise see [`verify`].
    pub fn verify_url(
        &self,
        return_url: &str,
        now: DateTime<Utc>,
    ) -> Result<RedirectCallback, Report<CallbackError>> {
        let callback = RedirectCallback::from_url(return_url)?;
        self.verify(&callback, now)?;
        log::info!(
            "Validated callback for MOR order {} (external order {})",
            callback.mor_order_id,
            callback.external_order_id
        );
        Ok(callback)
    }
}

impl std::fmt::Debug for CallbackValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackValidator")
            .field("key", &"<redacted>")
            .field("window", &self.window)
            .finish()
    }
}
