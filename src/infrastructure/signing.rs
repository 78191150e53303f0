//! Coinone V2 private-API request signing
//!
//! Every private call shares one recipe: the payload fields plus the
//! reserved `access_token` and `nonce` entries are serialized to compact
//! JSON, Base64-encoded into the request body, and an HMAC-SHA512 over the
//! Base64 text (keyed by the secret) becomes the signature header.

use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use serde_json::{Map, Value};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// A signed private-API request body
#[derive(Debug, Clone, PartialEq)]
pub struct SignedRequest {
    /// Base64-encoded JSON payload, sent as the POST body and the
    /// `X-COINONE-PAYLOAD` header
    pub payload: String,
    /// Lowercase hex HMAC-SHA512 signature, sent as `X-COINONE-SIGNATURE`
    pub signature: String,
}

/// Sign a private-API payload
///
/// The nonce is supplied by the caller (current time in milliseconds in
/// production); two requests in the same millisecond are an accepted edge
/// case, not corrected here.
pub fn sign_payload(
    secret_key: &str,
    access_token: &str,
    nonce: u64,
    fields: &Map<String, Value>,
) -> Result<SignedRequest, String> {
    let mut payload = fields.clone();
    payload.insert("access_token".to_string(), Value::from(access_token));
    payload.insert("nonce".to_string(), Value::from(nonce));

    let json_payload = serde_json::to_string(&Value::Object(payload))
        .map_err(|e| format!("Failed to serialize payload: {}", e))?;

    let encoded_payload = general_purpose::STANDARD.encode(json_payload.as_bytes());

    let mut mac = HmacSha512::new_from_slice(secret_key.as_bytes())
        .map_err(|e| format!("HMAC error: {}", e))?;
    mac.update(encoded_payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    Ok(SignedRequest {
        payload: encoded_payload,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order_fields() -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("price".to_string(), json!(50000000));
        fields.insert("qty".to_string(), json!(0.01));
        fields.insert("currency".to_string(), json!("BTC"));
        fields
    }

    #[test]
    fn test_signing_is_deterministic() {
        let fields = order_fields();
        let a = sign_payload("secret", "token", 1700000000000, &fields).unwrap();
        let b = sign_payload("secret", "token", 1700000000000, &fields).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_changing_a_field_changes_signature() {
        let fields = order_fields();
        let mut changed = order_fields();
        changed.insert("price".to_string(), json!(50000001));

        let a = sign_payload("secret", "token", 1700000000000, &fields).unwrap();
        let b = sign_payload("secret", "token", 1700000000000, &changed).unwrap();
        assert_ne!(a.payload, b.payload);
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn test_changing_nonce_changes_signature() {
        let fields = order_fields();
        let a = sign_payload("secret", "token", 1700000000000, &fields).unwrap();
        let b = sign_payload("secret", "token", 1700000000001, &fields).unwrap();
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn test_changing_secret_changes_signature_but_not_payload() {
        let fields = order_fields();
        let a = sign_payload("secret-a", "token", 1700000000000, &fields).unwrap();
        let b = sign_payload("secret-b", "token", 1700000000000, &fields).unwrap();
        assert_eq!(a.payload, b.payload);
        assert_ne!(a.signature, b.signature);
    }

    #[test]
    fn test_payload_decodes_to_json_with_reserved_fields() {
        let fields = order_fields();
        let signed = sign_payload("secret", "token", 42, &fields).unwrap();

        let decoded = general_purpose::STANDARD.decode(&signed.payload).unwrap();
        let value: Value = serde_json::from_slice(&decoded).unwrap();

        assert_eq!(value["access_token"], "token");
        assert_eq!(value["nonce"], 42);
        assert_eq!(value["currency"], "BTC");
        assert_eq!(value["price"], 50000000);
    }

    #[test]
    fn test_signature_is_lowercase_hex_sha512() {
        let signed = sign_payload("secret", "token", 1, &Map::new()).unwrap();
        // SHA-512 digest is 64 bytes, 128 hex characters.
        assert_eq!(signed.signature.len(), 128);
        assert!(signed
            .signature
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}
