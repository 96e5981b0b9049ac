use std::collections::HashMap;

use crate::{adapter::PlatformAdapter, descriptor::PlatformDescriptor};

/// Registry of all loaded platform adapters, keyed by descriptor id.
pub struct PlatformRegistry {
    adapters: HashMap<String, Box<dyn PlatformAdapter>>,
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    pub fn register(&mut self, adapter: Box<dyn PlatformAdapter>) {
        self.adapters
            .insert(adapter.descriptor().id.to_string(), adapter);
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&dyn PlatformAdapter> {
        self.adapters.get(id).map(|a| a.as_ref())
    }

    /// Registered platform ids, sorted for stable output.
    #[must_use]
    pub fn list(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.adapters.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// Descriptors of all registered platforms, sorted by id.
    #[must_use]
    pub fn descriptors(&self) -> Vec<&PlatformDescriptor> {
        let mut all: Vec<&PlatformDescriptor> =
            self.adapters.values().map(|a| a.descriptor()).collect();
        all.sort_unstable_by_key(|d| d.id);
        all
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {async_trait::async_trait, crier_oauth::TokenGrant, secrecy::Secret, serde_json::Value};

    use {
        super::*,
        crate::{
            content::PostContent,
            descriptor::PlatformConstraints,
            error::{Error, Result},
        },
    };

    struct FakeAdapter {
        descriptor: PlatformDescriptor,
    }

    fn fake(id: &'static str) -> FakeAdapter {
        FakeAdapter {
            descriptor: PlatformDescriptor {
                id,
                display_name: id,
                color: "#000000",
                icon: "?",
                constraints: PlatformConstraints {
                    max_text_length: 100,
                    supports_images: true,
                    supports_videos: false,
                    requires_media: false,
                    max_hashtags: 5,
                    optimal_hashtags: 2,
                },
            },
        }
    }

    #[async_trait]
    impl PlatformAdapter for FakeAdapter {
        fn descriptor(&self) -> &PlatformDescriptor {
            &self.descriptor
        }

        fn authorize_url(&self, state: &str, _challenge: Option<&str>) -> String {
            format!("https://auth.example/{}?state={state}", self.descriptor.id)
        }

        async fn exchange_code(&self, _code: &str, _verifier: Option<&str>) -> Result<TokenGrant> {
            Err(Error::unsupported("fake"))
        }

        async fn fetch_profile(&self, _access_token: &Secret<String>) -> Result<Value> {
            Err(Error::unsupported("fake"))
        }

        async fn publish(
            &self,
            _access_token: &Secret<String>,
            _content: &PostContent,
            _profile: &Value,
        ) -> Result<String> {
            Err(Error::unsupported("fake"))
        }
    }

    #[test]
    fn register_and_resolve() {
        let mut registry = PlatformRegistry::new();
        registry.register(Box::new(fake("zeta")));
        registry.register(Box::new(fake("alpha")));

        assert!(registry.get("alpha").is_some());
        assert!(registry.get("nope").is_none());
        assert_eq!(registry.list(), vec!["alpha", "zeta"]);
        assert_eq!(registry.descriptors()[0].id, "alpha");
    }

    #[test]
    fn refresher_defaults_to_absent() {
        let adapter = fake("alpha");
        assert!(adapter.refresher().is_none());
        assert!(!adapter.uses_pkce());
    }
}
