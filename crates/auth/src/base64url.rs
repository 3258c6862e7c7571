//! Unpadded base64url encoding and decoding
//!
//! All binary-to-text conversion in the auth core goes through this module:
//! PKCE challenges, JWT payload segments, and cross-domain session blobs.
//! Output never contains `+`, `/`, or `=`; decoding tolerates input that
//! still carries padding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::{AuthError, AuthResult};

/// Encode bytes as unpadded base64url text.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode base64url text into raw bytes.
///
/// Trailing `=` padding is stripped before decoding, so both padded and
/// unpadded forms are accepted.
///
/// # Errors
/// Returns [`AuthError::Decode`] when the input is structurally invalid.
pub fn decode(text: &str) -> AuthResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(text.trim_end_matches('='))
        .map_err(|e| AuthError::Decode(e.to_string()))
}

/// Decode base64url text into a UTF-8 string.
///
/// The decoded byte sequence is interpreted as UTF-8, so multi-byte
/// sequences survive intact rather than being mapped byte-per-character.
///
/// # Errors
/// Returns [`AuthError::Decode`] when the input is not valid base64url or
/// the decoded bytes are not valid UTF-8.
pub fn decode_utf8(text: &str) -> AuthResult<String> {
    let bytes = decode(text)?;
    String::from_utf8(bytes).map_err(|e| AuthError::Decode(e.to_string()))
}
