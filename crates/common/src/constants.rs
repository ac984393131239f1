use http::header::HeaderName;

pub const HEADER_SPT_MOR_SIGNATURE: HeaderName = HeaderName::from_static("x-spt-mor-signature");
pub const HEADER_SPT_MOR_DOMAIN: HeaderName = HeaderName::from_static("x-spt-mor-domain");
pub const HEADER_SPT_MOR_TIMESTAMP: HeaderName = HeaderName::from_static("x-spt-mor-timestamp");

pub const CONTENT_TYPE_JSON: &str = "application/json";

pub const DEFAULT_API_BASE_URL: &str =
    "https://staging-morcheckout.standardpartstoolkit.com/api/v1";

pub const CHECKOUT_PATH: &str = "/checkout";
pub const CHECKOUT_STATUS_PATH: &str = "/checkout-status";
pub const TAX_ESTIMATE_PATH: &str = "/calculate-tax-estimate";

pub const PARAM_MOR_ORDER_ID: &str = "mor_order_id";
pub const PARAM_EXTERNAL_ORDER_ID: &str = "external_order_id";
pub const PARAM_TIMESTAMP: &str = "timestamp";
pub const PARAM_NONCE: &str = "nonce";

/// Seconds a callback timestamp may lag behind the validator's clock.
pub const DEFAULT_CALLBACK_MAX_AGE_SECS: u64 = 300;
/// Seconds a callback timestamp may run ahead of the validator's clock.
pub const DEFAULT_CALLBACK_MAX_FUTURE_SKEW_SECS: u64 = 300;

/// Raw bodies quoted in error messages are cut to this many characters.
pub const MAX_ERROR_BODY_CHARS: usize = 500;
