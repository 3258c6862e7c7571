//! PKCE (Proof Key for Code Exchange) generation
//!
//! Implements RFC 7636 for OAuth authorization without a client secret.
//! The verifier is an anti-replay binding token, not a long-lived secret,
//! so non-cryptographic randomness is acceptable; what matters is collision
//! avoidance and the exact charset/length contract.

use rand::Rng;

use crate::base64url;
use crate::digest::DigestEngine;

/// Verifier length in characters. RFC 7636 allows 43-128; we use the
/// maximum.
pub const VERIFIER_LEN: usize = 128;

/// State nonce length in characters.
pub const STATE_LEN: usize = 32;

/// RFC 3986 unreserved characters (66 total).
const UNRESERVED: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Produce a fixed-length random string drawn uniformly from the
/// unreserved charset.
#[must_use]
pub fn random_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..UNRESERVED.len());
            UNRESERVED[idx] as char
        })
        .collect()
}

/// Generate a 128-character code verifier.
#[must_use]
pub fn generate_code_verifier() -> String {
    random_string(VERIFIER_LEN)
}

/// Derive the S256 code challenge for a verifier:
/// `BASE64URL(SHA256(ASCII(code_verifier)))`.
#[must_use]
pub fn generate_code_challenge(engine: DigestEngine, verifier: &str) -> String {
    base64url::encode(&engine.digest(verifier.as_bytes()))
}

/// Generate a random state nonce for callback correlation.
#[must_use]
pub fn generate_state() -> String {
    random_string(STATE_LEN)
}

/// PKCE verifier/challenge pair for one authorization attempt.
///
/// The verifier is kept secret until token exchange; the challenge is sent
/// up front so the provider can later confirm the presented verifier.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    /// 128-char random string from the unreserved charset. Persisted to
    /// durable storage so it survives the full-page redirect.
    pub code_verifier: String,

    /// base64url-encoded SHA-256 of the verifier, sent in the
    /// authorization request.
    pub code_challenge: String,
}

impl PkceChallenge {
    /// Generate a fresh verifier/challenge pair using the given digest
    /// strategy.
    #[must_use]
    pub fn generate(engine: DigestEngine) -> Self {
        let code_verifier = generate_code_verifier();
        let code_challenge = generate_code_challenge(engine, &code_verifier);
        Self { code_verifier, code_challenge }
    }

    /// Challenge method. Always "S256"; the plain (unhashed) PKCE variant
    /// is never offered.
    #[must_use]
    pub fn challenge_method(&self) -> &'static str {
        "S256"
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for pkce.
    use super::*;

    /// Validates `PkceChallenge::generate` behavior for the contract
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms the verifier is exactly 128 chars from the unreserved set.
    /// - Ensures the challenge is non-empty and at least 43 chars.
    /// - Confirms `challenge_method()` equals `"S256"`.
    #[test]
    fn generated_pair_meets_contract() {
        let pair = PkceChallenge::generate(DigestEngine::select());

        assert_eq!(pair.code_verifier.len(), VERIFIER_LEN);
        assert!(pair
            .code_verifier
            .bytes()
            .all(|b| UNRESERVED.contains(&b)));
        assert!(pair.code_challenge.len() >= 43);
        assert_eq!(pair.challenge_method(), "S256");
    }

    /// Validates `generate_code_challenge` behavior for the deterministic
    /// scenario: re-hashing the same verifier yields the same challenge on
    /// both digest strategies.
    #[test]
    fn challenge_is_deterministic() {
        let pair = PkceChallenge::generate(DigestEngine::Software);
        let recomputed = generate_code_challenge(DigestEngine::Software, &pair.code_verifier);
        assert_eq!(pair.code_challenge, recomputed);
        assert_eq!(
            recomputed,
            generate_code_challenge(DigestEngine::Platform, &pair.code_verifier)
        );
    }

    /// Validates `PkceChallenge::generate` behavior for the uniqueness
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms two generated verifiers (and their challenges) differ.
    #[test]
    fn repeated_generation_is_unique() {
        let first = PkceChallenge::generate(DigestEngine::select());
        let second = PkceChallenge::generate(DigestEngine::select());

        assert_ne!(first.code_verifier, second.code_verifier);
        assert_ne!(first.code_challenge, second.code_challenge);
        assert_ne!(generate_state(), generate_state());
    }

    /// Validates the challenge encoding for the url-safe scenario: no `+`,
    /// `/`, or `=` ever appears.
    #[test]
    fn challenge_is_url_safe() {
        for _ in 0..8 {
            let pair = PkceChallenge::generate(DigestEngine::Software);
            assert!(!pair.code_challenge.contains('+'));
            assert!(!pair.code_challenge.contains('/'));
            assert!(!pair.code_challenge.contains('='));
        }
    }
}
