//! Provider configuration loading and caching
//!
//! The dashboard serves its auth provider settings as a static JSON
//! document. The loader fetches it lazily, exactly once per process, and
//! treats a non-success response as "authentication disabled" rather than
//! an error. The initial fetch is the only operation in the core that
//! propagates failures to its caller.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{AuthError, AuthResult};

/// Path of the config document relative to the dashboard origin.
const CONFIG_PATH: &str = "/auth-config.json";

/// Identity provider configuration, immutable for the process lifetime.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    /// Base URL of the identity provider.
    pub auth_provider_base_url: String,

    /// OAuth client ID registered with the provider.
    pub client_id: String,

    /// Application name within the provider.
    #[serde(default)]
    pub app_name: String,

    /// Organization name within the provider.
    #[serde(default)]
    pub organization_name: String,

    /// Path component of the relay callback.
    #[serde(default = "default_redirect_path")]
    pub redirect_path: String,
}

fn default_redirect_path() -> String {
    "/callback".to_string()
}

/// Process-wide config cache with an idempotent load entry point.
///
/// There is deliberately no other mutation path: once `ensure_loaded`
/// resolves, every later call observes the same outcome without touching
/// the network again.
pub struct ConfigLoader {
    endpoint: String,
    client: Client,
    cell: OnceCell<Option<AuthConfig>>,
}

impl ConfigLoader {
    /// Create a loader for the given dashboard origin.
    #[must_use]
    pub fn new(dashboard_base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            endpoint: format!("{}{CONFIG_PATH}", dashboard_base_url.trim_end_matches('/')),
            client,
            cell: OnceCell::new(),
        }
    }

    /// Fetch and cache the provider configuration.
    ///
    /// # Returns
    /// `Ok(Some(config))` when auth is configured, `Ok(None)` when the
    /// config document is absent (authentication disabled, an expected
    /// deployment mode rather than an error).
    ///
    /// # Errors
    /// Propagates transport failures from the first load attempt.
    pub async fn ensure_loaded(&self) -> AuthResult<Option<&AuthConfig>> {
        let cached = self
            .cell
            .get_or_try_init(|| async {
                debug!(endpoint = %self.endpoint, "Fetching auth config");
                let response = self.client.get(&self.endpoint).send().await?;

                if !response.status().is_success() {
                    info!(status = %response.status(), "Auth config unavailable; authentication disabled");
                    return Ok::<_, AuthError>(None);
                }

                let config: AuthConfig = response.json().await?;
                info!(provider = %config.auth_provider_base_url, "Auth config loaded");
                Ok(Some(config))
            })
            .await?;

        Ok(cached.as_ref())
    }

    /// Get the cached configuration without triggering a load.
    #[must_use]
    pub fn get(&self) -> Option<&AuthConfig> {
        self.cell.get().and_then(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for config. Network behavior is covered by the
    //! integration suite; these pin the wire format.
    use super::*;

    /// Validates `AuthConfig` deserialization for the camelCase document
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms camelCase keys map onto snake_case fields.
    /// - Confirms `redirect_path` defaults when absent.
    #[test]
    fn config_document_deserializes() {
        let config: AuthConfig = serde_json::from_str(
            r#"{
                "authProviderBaseUrl": "https://idp.example",
                "clientId": "abc",
                "appName": "arena",
                "organizationName": "arena-org"
            }"#,
        )
        .expect("config document");

        assert_eq!(config.auth_provider_base_url, "https://idp.example");
        assert_eq!(config.client_id, "abc");
        assert_eq!(config.app_name, "arena");
        assert_eq!(config.organization_name, "arena-org");
        assert_eq!(config.redirect_path, "/callback");
    }

    /// Validates `ConfigLoader::new` behavior for the endpoint assembly
    /// scenario: trailing slashes do not double up.
    #[test]
    fn endpoint_has_no_double_slash() {
        let loader = ConfigLoader::new("https://dash.example/");
        assert_eq!(loader.endpoint, "https://dash.example/auth-config.json");
        assert!(loader.get().is_none());
    }
}
