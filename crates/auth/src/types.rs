//! Wire types shared across the authentication flow

use serde::{Deserialize, Serialize};

/// Token endpoint response (RFC 6749 §5.1).
///
/// Every field is optional: providers differ in what they return, and the
/// relay may hand back partial sets. The absence of `access_token` is what
/// signals a failed exchange, not an HTTP-level error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenResponse {
    /// JWT access token for API authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Refresh token for obtaining new access tokens. Rotation is
    /// optional; callers keep the previous one when this is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// ID token (OpenID Connect).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Token type ("Bearer" in practice).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    /// Access token lifetime in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Granted scopes (space-separated).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}
