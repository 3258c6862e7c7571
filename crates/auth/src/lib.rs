//! Client-side authentication core for the Arena trading dashboard.
//!
//! Implements the OAuth 2.0 authorization-code flow with PKCE against a
//! Casdoor-style identity provider, built to keep working in contexts
//! where the platform's accelerated digest provider is unavailable:
//!
//! - **Dual-strategy SHA-256**: accelerated provider with a bit-exact
//!   pure-computation fallback ([`digest`])
//! - **PKCE**: RFC 7636 verifier/challenge generation ([`pkce`])
//! - **Flow**: sign-in URL assembly, code exchange, relay-based refresh,
//!   SSO logout ([`flow`])
//! - **Claims**: manual JWT payload decoding into a typed identity record
//!   ([`claims`]), expiry tracking ([`expiry`])
//! - **Session relay**: cross-domain session blob decoding ([`session`])
//! - **Config**: lazy once-per-process provider configuration ([`config`])
//!
//! # Error Policy
//!
//! Internal APIs return [`error::AuthResult`]; the public surface degrades
//! to `None`/`false` plus a diagnostic log for everything except the
//! initial config load, which propagates failures to its caller. The UI
//! decides how to present a failure (typically by prompting re-login).
//!
//! # Usage
//!
//! ```no_run
//! use arena_auth::{AuthFlow, ConfigLoader, MemoryFlowStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = ConfigLoader::new("https://dashboard.example");
//! let config = loader.ensure_loaded().await?.cloned();
//!
//! let flow = AuthFlow::new(config, "https://relay.example", MemoryFlowStore::new());
//! if let Some(request) = flow.sign_in_url(Some("https://dashboard.example")) {
//!     // Navigate the browser to request.url; the callback delivers
//!     // (code, state) which flow.exchange_code redeems for tokens.
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod base64url;
pub mod claims;
pub mod config;
pub mod digest;
pub mod error;
pub mod expiry;
pub mod flow;
pub mod pkce;
pub mod session;
pub mod storage;
pub mod types;

// Re-export commonly used types and functions
pub use claims::{extract_user, User};
pub use config::{AuthConfig, ConfigLoader};
pub use digest::DigestEngine;
pub use error::{AuthError, AuthResult};
pub use expiry::{expiry_millis, is_expiring_soon, DEFAULT_EXPIRY_BUFFER_MINUTES};
pub use flow::{AuthFlow, SignInRequest};
pub use pkce::{
    generate_code_challenge, generate_code_verifier, generate_state, PkceChallenge,
};
pub use session::{decode_session, SessionPayload};
pub use storage::{FlowStore, KeyringFlowStore, MemoryFlowStore, STATE_SLOT, VERIFIER_SLOT};
pub use types::TokenResponse;
