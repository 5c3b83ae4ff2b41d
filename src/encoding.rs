//! Reversible text encoding for stored credential values.
//!
//! Values are the standard-alphabet, padded base64 of their UTF-8 bytes. This
//! only makes them opaque and safe for text-only key/value storage; it offers
//! no confidentiality.

use base64::prelude::*;

use crate::error::CredentialError;

pub fn encode(value: &str) -> String {
    BASE64_STANDARD.encode(value.as_bytes())
}

/// Decode a stored value. `key` names the entry in any error.
pub fn decode(key: &'static str, value: &str) -> Result<String, CredentialError> {
    let bytes = BASE64_STANDARD
        .decode(value)
        .map_err(|source| CredentialError::InvalidEncoding { key, source })?;
    String::from_utf8(bytes).map_err(|source| CredentialError::InvalidUtf8 { key, source })
}
