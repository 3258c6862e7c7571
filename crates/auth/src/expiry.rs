//! Token expiry tracking
//!
//! Expiry comes from the JWT `exp` claim (seconds since epoch). The check
//! fails closed: a token whose expiry cannot be determined is treated as
//! already expired, so the caller refreshes rather than sending a request
//! that will be rejected.

use chrono::Utc;
use serde_json::Value;

use crate::claims;

/// Default refresh buffer: refresh when within five minutes of expiry.
pub const DEFAULT_EXPIRY_BUFFER_MINUTES: i64 = 5;

/// Expiry instant of a JWT in epoch milliseconds, from its `exp` claim.
///
/// Returns `None` when the token cannot be decoded or carries no `exp`.
#[must_use]
pub fn expiry_millis(jwt: &str) -> Option<i64> {
    let payload = claims::decode_payload(jwt).ok()?;
    payload
        .get("exp")
        .and_then(Value::as_i64)
        // An exp too large for millisecond precision is undeterminable,
        // which the check below treats as already expired.
        .and_then(|seconds| seconds.checked_mul(1000))
}

/// Boundary-inclusive expiry check against an explicit clock.
fn expiring_at(expiry_ms: Option<i64>, now_ms: i64, buffer_minutes: i64) -> bool {
    match expiry_ms {
        Some(expiry) => now_ms >= expiry - buffer_minutes * 60_000,
        // Fail closed: undecodable tokens count as expired.
        None => true,
    }
}

/// Whether the token is expired or will expire within `buffer_minutes`.
///
/// True exactly when `now >= exp − buffer` (boundary inclusive), and
/// always true for tokens whose expiry cannot be determined.
#[must_use]
pub fn is_expiring_soon(jwt: &str, buffer_minutes: i64) -> bool {
    expiring_at(expiry_millis(jwt), Utc::now().timestamp_millis(), buffer_minutes)
}
