//! Durable flow-state storage
//!
//! The authorization flow spans a full-page redirect, so the code verifier
//! and state nonce must outlive the process that generated them. Exactly
//! two slots exist, each write-once-then-delete within a single flow
//! attempt. The trait seam enables testing with an in-memory double and
//! supports headless contexts where no platform keyring is available.
//!
//! Concurrent sign-in attempts in one context would overwrite each other's
//! slots; the flow does not support interleaved attempts.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use keyring::Entry;
use tracing::debug;

use crate::error::{AuthError, AuthResult};

/// Slot holding the PKCE code verifier across the redirect.
pub const VERIFIER_SLOT: &str = "pkce_code_verifier";

/// Slot holding the CSRF state nonce across the redirect.
pub const STATE_SLOT: &str = "oauth_state";

/// Key/value storage for transient flow state.
pub trait FlowStore: Send + Sync {
    /// Write a slot, replacing any previous value.
    ///
    /// # Errors
    /// Returns [`AuthError::Storage`] when the backend rejects the write.
    fn put(&self, slot: &str, value: &str) -> AuthResult<()>;

    /// Read a slot without consuming it.
    fn get(&self, slot: &str) -> Option<String>;

    /// Read and delete a slot in one step.
    fn take(&self, slot: &str) -> Option<String>;

    /// Delete a slot. Deleting an absent slot is not an error.
    fn remove(&self, slot: &str);
}

/// Platform-keyring-backed store: one credential entry per slot.
pub struct KeyringFlowStore {
    service: String,
}

impl KeyringFlowStore {
    /// Create a store scoped to the given service name
    /// (e.g., "Arena.auth").
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    fn entry(&self, slot: &str) -> AuthResult<Entry> {
        Entry::new(&self.service, slot).map_err(|e| AuthError::Storage(e.to_string()))
    }
}

impl FlowStore for KeyringFlowStore {
    fn put(&self, slot: &str, value: &str) -> AuthResult<()> {
        debug!(slot = %slot, "Persisting flow state");
        self.entry(slot)?
            .set_password(value)
            .map_err(|e| AuthError::Storage(e.to_string()))
    }

    fn get(&self, slot: &str) -> Option<String> {
        self.entry(slot).ok()?.get_password().ok()
    }

    fn take(&self, slot: &str) -> Option<String> {
        let value = self.get(slot);
        self.remove(slot);
        value
    }

    fn remove(&self, slot: &str) {
        if let Ok(entry) = self.entry(slot) {
            let _ = entry.delete_credential();
        }
    }
}

/// In-memory store for tests and non-interactive contexts.
#[derive(Default)]
pub struct MemoryFlowStore {
    slots: RwLock<HashMap<String, String>>,
}

impl MemoryFlowStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlowStore for MemoryFlowStore {
    fn put(&self, slot: &str, value: &str) -> AuthResult<()> {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, slot: &str) -> Option<String> {
        self.slots
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(slot)
            .cloned()
    }

    fn take(&self, slot: &str) -> Option<String> {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(slot)
    }

    fn remove(&self, slot: &str) {
        self.take(slot);
    }
}
