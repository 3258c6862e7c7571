//! JWT payload decoding and identity claims extraction
//!
//! Tokens are decoded manually (three dot-separated segments, base64url
//! payload, JSON body) because the core must work without a platform JWT
//! library and never needs signature verification client-side; the
//! provider and relay are the trust anchors. Every [`User`] field has a
//! defined default when its claim is absent; a decode failure yields no
//! record at all, never a partial one.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::base64url;
use crate::error::{AuthError, AuthResult};

/// Identity record derived purely from JWT claims.
///
/// Defaults are uniform: strings empty, numbers zero, booleans false,
/// lists empty. `name` falls back to `email`; `display_name` falls back to
/// `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    /// Organization that owns the account.
    pub owner: String,
    /// Account name (falls back to `email`).
    pub name: String,
    /// Stable account identifier.
    pub id: String,
    /// Human-readable name (falls back to `name`).
    pub display_name: String,
    /// Email address.
    pub email: String,
    /// Avatar URL.
    pub avatar: String,
    /// Organization administrator flag.
    pub is_admin: bool,
    /// Platform administrator flag.
    pub is_global_admin: bool,
    /// Account suspended flag.
    pub is_forbidden: bool,
    /// Provider-assigned score.
    pub score: i64,
    /// Role names attached to the account.
    pub roles: Vec<String>,
}

/// Decode a JWT's payload segment into a JSON value.
///
/// A JWT is exactly three dot-separated segments; any other shape is
/// malformed. Neither the header nor the signature is inspected.
///
/// # Errors
/// Returns [`AuthError::MalformedToken`] on a wrong segment count and
/// [`AuthError::Decode`]/[`AuthError::MalformedToken`] on payload decode or
/// parse failure.
pub fn decode_payload(jwt: &str) -> AuthResult<Value> {
    let segments: Vec<&str> = jwt.split('.').collect();
    if segments.len() != 3 {
        return Err(AuthError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let payload = base64url::decode_utf8(segments[1])?;
    serde_json::from_str(&payload).map_err(|e| AuthError::MalformedToken(e.to_string()))
}

/// Extract a typed identity record from a JWT, or the reason it failed.
pub(crate) fn try_extract_user(jwt: &str) -> AuthResult<User> {
    decode_payload(jwt).map(|claims| user_from_claims(&claims))
}

/// Decode a JWT's claims into a [`User`], applying the documented
/// defaults.
///
/// Returns `None` on any structural or decode failure.
#[must_use]
pub fn extract_user(jwt: &str) -> Option<User> {
    match try_extract_user(jwt) {
        Ok(user) => Some(user),
        Err(error) => {
            warn!(%error, "Could not extract user from token");
            None
        }
    }
}

/// Uniform claim accessors applied over the payload. Each claim maps to
/// one default; fallback chains are resolved after the table pass.
fn user_from_claims(claims: &Value) -> User {
    let text = |claim: &str| -> String {
        claims
            .get(claim)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let flag = |claim: &str| claims.get(claim).and_then(Value::as_bool).unwrap_or(false);
    let number = |claim: &str| claims.get(claim).and_then(Value::as_i64).unwrap_or(0);
    let list = |claim: &str| -> Vec<String> {
        claims
            .get(claim)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        // Role claims arrive either as plain strings or as
                        // objects carrying a name field.
                        item.as_str()
                            .map(String::from)
                            .or_else(|| item.get("name").and_then(Value::as_str).map(String::from))
                    })
                    .collect()
            })
            .unwrap_or_default()
    };

    let email = text("email");
    let name = {
        let name = text("name");
        if name.is_empty() { email.clone() } else { name }
    };
    let display_name = {
        let display_name = text("displayName");
        if display_name.is_empty() { name.clone() } else { display_name }
    };

    User {
        owner: text("owner"),
        name,
        id: text("id"),
        display_name,
        email,
        avatar: text("avatar"),
        is_admin: flag("isAdmin"),
        is_global_admin: flag("isGlobalAdmin"),
        is_forbidden: flag("isForbidden"),
        score: number("score"),
        roles: list("roles"),
    }
}
