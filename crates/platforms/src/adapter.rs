use {async_trait::async_trait, crier_oauth::TokenGrant, secrecy::Secret, serde_json::Value};

use crate::{content::PostContent, descriptor::PlatformDescriptor, error::Result};

/// Core platform adapter trait. Each social network implements this.
///
/// Adapters are stateless beyond app credentials and an HTTP client; all
/// per-user connection state lives with the connection manager.
#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// Identity and publishing constraints. `descriptor().id` is the
    /// registry key.
    fn descriptor(&self) -> &PlatformDescriptor;

    /// Whether the authorization flow carries a PKCE challenge.
    fn uses_pkce(&self) -> bool {
        false
    }

    /// Build the provider authorization URL for the user's browser.
    /// `challenge` is the S256 challenge, present iff the adapter uses PKCE.
    fn authorize_url(&self, state: &str, challenge: Option<&str>) -> String;

    /// Exchange an authorization code for tokens. `verifier` accompanies
    /// PKCE flows.
    async fn exchange_code(&self, code: &str, verifier: Option<&str>) -> Result<TokenGrant>;

    /// Fetch the authorized account's profile, provider-shaped.
    async fn fetch_profile(&self, access_token: &Secret<String>) -> Result<Value>;

    /// Publish one post. Returns the provider's post id.
    ///
    /// `profile` is the JSON captured at connect time; adapters that need an
    /// author id (LinkedIn person URNs) read it from there.
    async fn publish(
        &self,
        access_token: &Secret<String>,
        content: &PostContent,
        profile: &Value,
    ) -> Result<String>;

    /// Token refresh capability. Providers that never issue refresh tokens
    /// return `None` rather than a failing stub.
    fn refresher(&self) -> Option<&dyn TokenRefresh> {
        None
    }
}

/// Renew an access token from a refresh token.
#[async_trait]
pub trait TokenRefresh: Send + Sync {
    async fn refresh(&self, refresh_token: &Secret<String>) -> Result<TokenGrant>;
}
