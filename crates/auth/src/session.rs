//! Cross-domain session blob decoding
//!
//! When a trusted relay performs the token exchange server-side, it hands
//! the dashboard an already-assembled session as an opaque base64url blob
//! instead of a raw authorization code. Decoding requires both halves of
//! the payload to be present; anything less is rejected whole.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::base64url;
use crate::claims::User;
use crate::error::{AuthError, AuthResult};
use crate::types::TokenResponse;

/// Session payload exchanged via the cross-domain relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Token set issued by the provider. Must carry an access token.
    pub token: TokenResponse,
    /// Identity record assembled by the relay.
    pub user: User,
}

/// Decode a relay session blob, or the reason it failed.
pub(crate) fn try_decode_session(blob: &str) -> AuthResult<SessionPayload> {
    let json = base64url::decode_utf8(blob)
        .map_err(|e| AuthError::MalformedSession(e.to_string()))?;
    let value: Value =
        serde_json::from_str(&json).map_err(|e| AuthError::MalformedSession(e.to_string()))?;

    // Both fields are mandatory once decoded; reject before deserializing
    // so a half-formed blob never becomes a half-formed session.
    let has_access_token = value
        .get("token")
        .and_then(|token| token.get("access_token"))
        .and_then(Value::as_str)
        .is_some_and(|token| !token.is_empty());
    if !has_access_token {
        return Err(AuthError::IncompleteSession("token.access_token"));
    }
    if !value.get("user").is_some_and(Value::is_object) {
        return Err(AuthError::IncompleteSession("user"));
    }

    serde_json::from_value(value).map_err(|e| AuthError::MalformedSession(e.to_string()))
}

/// Decode an opaque cross-domain session blob into `{token, user}`.
///
/// Returns `None` on any decode failure or missing mandatory field; this
/// never panics or propagates an error to the caller.
#[must_use]
pub fn decode_session(blob: &str) -> Option<SessionPayload> {
    match try_decode_session(blob) {
        Ok(session) => Some(session),
        Err(error) => {
            warn!(%error, "Could not decode relay session");
            None
        }
    }
}
