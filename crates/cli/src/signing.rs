//! Signature debugging and callback verification commands.

use chrono::Utc;
use mor_checkout_common::client::CheckoutClient;
use mor_checkout_common::request_signing::{
    format_timestamp, parse_timestamp, CallbackValidator, RequestSigner, SignedRequest,
    SigningPayload,
};
use mor_checkout_common::settings::Settings;

use crate::error::CliError;
use crate::orders::render_status;

/// Signs `payload` exactly as given.
///
/// Unless `raw` is set the payload must be valid JSON; it is not reformatted,
/// so the signature matches a body sent byte for byte.
pub(crate) fn sign_payload(
    settings: &Settings,
    payload: &str,
    raw: bool,
    timestamp: Option<&str>,
) -> Result<SignedRequest, CliError> {
    let payload = if raw {
        SigningPayload::raw(payload)
    } else {
        serde_json::from_str::<serde_json::Value>(payload)?;
        SigningPayload::Json(payload.to_string())
    };

    let timestamp = match timestamp {
        Some(ts) => {
            if parse_timestamp(ts).is_none() {
                return Err(CliError::Usage(format!(
                    "timestamp must look like 2024-01-01T00:00:00Z, got {ts}"
                )));
            }
            ts.to_string()
        }
        None => format_timestamp(Utc::now()),
    };

    Ok(RequestSigner::new(&settings.api.signing_key).sign(payload, &timestamp))
}

pub fn sign(
    settings: &Settings,
    payload: &str,
    raw: bool,
    timestamp: Option<&str>,
) -> Result<(), CliError> {
    let signed = sign_payload(settings, payload, raw, timestamp)?;
    println!("Payload:   {}", signed.payload.canonical());
    println!("Timestamp: {}", signed.timestamp);
    println!("Signature: {}", signed.signature);
    Ok(())
}

pub fn callback(settings: &Settings, url: &str, fetch: bool) -> Result<(), CliError> {
    let validator = CallbackValidator::new(
        &settings.api.signing_key,
        settings.callback.freshness_window(),
    );
    let callback = validator.verify_url(url, Utc::now())?;

    println!("Callback is authentic");
    println!("  MOR order ID: {}", callback.mor_order_id);
    println!("  External order ID: {}", callback.external_order_id);
    println!("  Timestamp: {}", callback.timestamp);

    if fetch {
        let client = CheckoutClient::from_settings(settings);
        let response = client.checkout_status_by_external_id(&callback.external_order_id)?;
        for line in render_status(&response) {
            println!("{line}");
        }
    }

    Ok(())
}
