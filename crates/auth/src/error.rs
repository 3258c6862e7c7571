//! Error types for the authentication core
//!
//! Internal operations return `Result<T, AuthError>` so callers and tests
//! can distinguish failure causes. The public convenience wrappers collapse
//! failures to `None`/`false` after logging, letting the dashboard UI decide
//! how to present them. Only the initial config load propagates errors
//! across the public boundary.

use thiserror::Error;

/// Result alias used throughout the authentication core.
pub type AuthResult<T> = Result<T, AuthError>;

/// Failure taxonomy for authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Provider configuration is absent. Authentication is disabled, which
    /// is an expected deployment mode rather than a fault.
    #[error("auth configuration unavailable; authentication disabled")]
    ConfigUnavailable,

    /// No interactive browsing context to redirect; sign-in cannot start.
    #[error("no interactive browsing context")]
    NonInteractive,

    /// HTTP transport failure (connection, timeout, body read).
    #[error("network failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("request rejected with status {status}")]
    Rejected {
        /// HTTP status code of the rejection.
        status: u16,
        /// Error body, captured for diagnostics only.
        body: String,
    },

    /// Returned state does not match the stored nonce (potential CSRF or
    /// cross-domain anomaly).
    #[error("state mismatch: expected {expected}, received {received}")]
    StateMismatch {
        /// The nonce persisted when the flow started.
        expected: String,
        /// The value returned on the callback.
        received: String,
    },

    /// Token is not a structurally valid JWT.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Cross-domain session blob could not be decoded.
    #[error("malformed session: {0}")]
    MalformedSession(String),

    /// Session blob decoded but a mandatory field is missing.
    #[error("incomplete session: missing {0}")]
    IncompleteSession(&'static str),

    /// base64url or UTF-8 decoding failure.
    #[error("decode error: {0}")]
    Decode(String),

    /// The token endpoint answered 2xx without an access token.
    #[error("token exchange rejected by provider")]
    ExchangeRejected,

    /// Durable flow-state storage failure.
    #[error("flow storage failure: {0}")]
    Storage(String),
}
