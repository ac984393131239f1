//! HMAC-SHA256 request signing.
//!
//! The API authenticates every call with
//! `HMAC-SHA256(key, canonical_payload + timestamp)`, hex encoded. The
//! canonical payload is either the exact JSON body that goes on the wire or,
//! for identifier lookups and callback nonces, a plain string.

use std::fmt;

use error_stack::{Report, ResultExt};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::error::CheckoutError;

type HmacSha256 = Hmac<Sha256>;

/// Material covered by a signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningPayload {
    /// A value serialized once with `serde_json`. The same string is sent as
    /// the request body, so what is signed is what is transmitted.
    Json(String),
    /// A plain string signed verbatim and never sent as a body.
    Raw(String),
}

impl SigningPayload {
    /// Serializes `value` into its canonical JSON form.
    ///
    /// Object keys follow struct field order for derived types and sorted
    /// order for untyped [`serde_json::Value`] maps.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Serialization`] if the value cannot be
    /// represented as JSON.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Report<CheckoutError>> {
        let canonical =
            serde_json::to_string(value).change_context(CheckoutError::Serialization {
                message: "Failed to serialize request body".into(),
            })?;
        Ok(Self::Json(canonical))
    }

    pub fn raw(value: impl Into<String>) -> Self {
        Self::Raw(value.into())
    }

    /// The exact string fed into the MAC ahead of the timestamp.
    #[must_use]
    pub fn canonical(&self) -> &str {
        match self {
            Self::Json(s) | Self::Raw(s) => s,
        }
    }

    /// The HTTP body to send, if this payload travels as one.
    #[must_use]
    pub fn http_body(&self) -> Option<&str> {
        match self {
            Self::Json(s) => Some(s),
            Self::Raw(_) => None,
        }
    }
}

/// Computes the lowercase hex HMAC-SHA256 of `payload` followed by `timestamp`.
#[must_use]
pub fn sign(payload: &str, timestamp: &str, key: &[u8]) -> String {
    hex::encode(mac_for(payload, timestamp, key).finalize().into_bytes())
}

/// Checks a hex encoded signature against the recomputed MAC in constant time.
///
/// Signatures that are not valid hex never match.
#[must_use]
pub fn verify_signature(payload: &str, timestamp: &str, key: &[u8], signature_hex: &str) -> bool {
    let Ok(provided) = hex::decode(signature_hex) else {
        return false;
    };
    mac_for(payload, timestamp, key)
        .verify_slice(&provided)
        .is_ok()
}

fn mac_for(payload: &str, timestamp: &str, key: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    mac.update(timestamp.as_bytes());
    mac
}

/// A payload together with the timestamp and signature that authenticate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub payload: SigningPayload,
    pub timestamp: String,
    pub signature: String,
}

/// Holds the shared secret and produces [`SignedRequest`]s.
#[derive(Clone)]
pub struct RequestSigner {
    key: Vec<u8>,
}

impl RequestSigner {
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: key.as_ref().to_vec(),
        }
    }

    #[must_use]
    pub fn sign(&self, payload: SigningPayload, timestamp: &str) -> SignedRequest {
        let signature = sign(payload.canonical(), timestamp, &self.key);
        SignedRequest {
            payload,
            timestamp: timestamp.to_string(),
            signature,
        }
    }

    #[must_use]
    pub fn verify(&self, payload: &str, timestamp: &str, signature_hex: &str) -> bool {
        verify_signature(payload, timestamp, &self.key, signature_hex)
    }
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    const KEY: &[u8] = b"secret";
    const TS: &str = "2024-01-01T00:00:00Z";

    #[derive(Serialize)]
    struct Item {
        sku: &'static str,
        price: f64,
    }

    fn sample_item() -> Item {
        Item {
            sku: "PROD-001",
            price: 29.99,
        }
    }

    #[test]
    fn test_json_payload_keeps_field_order() {
        let payload = SigningPayload::json(&sample_item()).unwrap();
        assert_eq!(payload.canonical(), r#"{"sku":"PROD-001","price":29.99}"#);
        assert_eq!(payload.http_body(), Some(payload.canonical()));
    }

    #[test]
    fn test_raw_payload_has_no_body() {
        let payload = SigningPayload::raw("MOR-123456");
        assert_eq!(payload.canonical(), "MOR-123456");
        assert_eq!(payload.http_body(), None);
    }

    #[test]
    fn test_golden_signature() {
        let payload = SigningPayload::json(&sample_item()).unwrap();
        assert_eq!(
            sign(payload.canonical(), TS, KEY),
            "c4870a8c36c255a56e312fc129d1d80a1124dee7e0c907e78aea0ce5f4665f87"
        );
    }

    #[test]
    fn test_golden_raw_signature() {
        assert_eq!(
            sign("ORD-1", TS, KEY),
            "899369b39afd382e09224ebd6c77b9b1e268154e71cbacfa6788dd0e149ac309"
        );
    }

    #[test]
    fn test_sign_is_deterministic() {
        let first = sign("payload", TS, KEY);
        let second = sign("payload", TS, KEY);
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_no_separator_between_payload_and_timestamp() {
        assert_eq!(sign("ab", "c", KEY), sign("a", "bc", KEY));
        assert_eq!(sign("abc", "", KEY), sign("", "abc", KEY));
    }

    fn mutate_at(s: &str, index: usize) -> String {
        s.char_indices()
            .map(|(i, c)| {
                if i == index {
                    if c == 'x' {
                        'y'
                    } else {
                        'x'
                    }
                } else {
                    c
                }
            })
            .collect()
    }

    #[test]
    fn test_single_character_mutations_change_signature() {
        let payload = r#"{"sku":"PROD-001","price":29.99}"#;
        let key = "secret";
        let baseline = sign(payload, TS, key.as_bytes());

        for i in 0..payload.len() {
            let mutated = mutate_at(payload, i);
            assert_ne!(sign(&mutated, TS, key.as_bytes()), baseline, "payload index {i}");
        }
        for i in 0..TS.len() {
            let mutated = mutate_at(TS, i);
            assert_ne!(sign(payload, &mutated, key.as_bytes()), baseline, "timestamp index {i}");
        }
        for i in 0..key.len() {
            let mutated = mutate_at(key, i);
            assert_ne!(sign(payload, TS, mutated.as_bytes()), baseline, "key index {i}");
        }
    }

    #[test]
    fn test_verify_accepts_matching_signature() {
        let signature = sign("ORD-1", TS, KEY);
        assert!(verify_signature("ORD-1", TS, KEY, &signature));
    }

    #[test]
    fn test_verify_rejects_mismatch_and_garbage() {
        let signature = sign("ORD-1", TS, KEY);
        assert!(!verify_signature("ORD-2", TS, KEY, &signature));
        assert!(!verify_signature("ORD-1", TS, b"other", &signature));
        assert!(!verify_signature("ORD-1", TS, KEY, "not-hex"));
        assert!(!verify_signature("ORD-1", TS, KEY, &signature[..62]));
        assert!(!verify_signature("ORD-1", TS, KEY, ""));
    }

    #[test]
    fn test_verify_accepts_uppercase_hex() {
        let signature = sign("ORD-1", TS, KEY).to_uppercase();
        assert!(verify_signature("ORD-1", TS, KEY, &signature));
    }

    #[test]
    fn test_request_signer_produces_signed_request() {
        let signer = RequestSigner::new("secret");
        let signed = signer.sign(SigningPayload::raw("ORD-1"), TS);
        assert_eq!(signed.timestamp, TS);
        assert_eq!(
            signed.signature,
            "899369b39afd382e09224ebd6c77b9b1e268154e71cbacfa6788dd0e149ac309"
        );
        assert!(signer.verify("ORD-1", TS, &signed.signature));
    }

    #[test]
    fn test_request_signer_debug_redacts_key() {
        let signer = RequestSigner::new("super-secret-value");
        let debug = format!("{signer:?}");
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("redacted"));
    }
}
