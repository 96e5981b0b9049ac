//! Composition root: config in, wired dispatcher out.

use std::{path::PathBuf, sync::Arc, time::Duration};

use {
    crier_config::CrierConfig,
    crier_connections::{ConnectionManager, FileStore},
    crier_dispatch::{Dispatcher, HttpScheduler, MemoryScheduler, SchedulerBackend},
    crier_instagram::InstagramAdapter,
    crier_linkedin::LinkedInAdapter,
    crier_oauth::AppCredentials,
    crier_platforms::{PlatformDescriptor, PlatformRegistry},
    crier_twitter::TwitterAdapter,
    tracing::debug,
};

/// Platform ids this binary ships adapters for.
pub const SUPPORTED_PLATFORMS: &[&str] = &["twitter", "linkedin", "instagram"];

/// Descriptor for a supported platform id, credentials or not. Validation
/// and the `platforms` listing work off these alone.
pub fn descriptor_for(platform_id: &str) -> Option<&'static PlatformDescriptor> {
    match platform_id {
        "twitter" => Some(&crier_twitter::DESCRIPTOR),
        "linkedin" => Some(&crier_linkedin::DESCRIPTOR),
        "instagram" => Some(&crier_instagram::DESCRIPTOR),
        _ => None,
    }
}

/// Everything a command needs, wired once per invocation.
pub struct App {
    pub config: CrierConfig,
    pub registry: Arc<PlatformRegistry>,
    pub manager: Arc<ConnectionManager>,
    pub dispatcher: Dispatcher,
}

impl App {
    /// Wire adapters, store, manager, and dispatcher from `config`.
    ///
    /// Only platforms with credentials in the config get a live adapter.
    pub async fn init(config: CrierConfig) -> anyhow::Result<Self> {
        let registry = Arc::new(build_registry(&config));
        let store = Arc::new(FileStore::new(store_path(&config)?));
        let manager = Arc::new(ConnectionManager::new(Arc::clone(&registry), store).await?);
        let scheduler = build_scheduler(&config)?;
        let dispatcher = Dispatcher::new(Arc::clone(&registry), Arc::clone(&manager), scheduler);
        Ok(Self {
            config,
            registry,
            manager,
            dispatcher,
        })
    }
}

fn build_registry(config: &CrierConfig) -> PlatformRegistry {
    let redirect = config.callback.redirect_uri();
    let mut registry = PlatformRegistry::new();
    if let Some(creds) = config.platforms.get("twitter") {
        registry.register(Box::new(TwitterAdapter::new(app_credentials(
            creds, &redirect,
        ))));
    }
    if let Some(creds) = config.platforms.get("linkedin") {
        registry.register(Box::new(LinkedInAdapter::new(app_credentials(
            creds, &redirect,
        ))));
    }
    if let Some(creds) = config.platforms.get("instagram") {
        registry.register(Box::new(InstagramAdapter::new(app_credentials(
            creds, &redirect,
        ))));
    }
    debug!(platforms = ?registry.list(), "adapters registered");
    registry
}

fn app_credentials(
    creds: &crier_config::PlatformCredentials,
    default_redirect: &str,
) -> AppCredentials {
    AppCredentials {
        client_id: creds.client_id.clone(),
        client_secret: creds.client_secret.clone(),
        redirect_uri: creds
            .redirect_uri
            .clone()
            .unwrap_or_else(|| default_redirect.to_string()),
    }
}

/// Store file from config, or `connections.json` under the user data dir.
fn store_path(config: &CrierConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = &config.store.path {
        return Ok(path.clone());
    }
    let dir = crier_config::data_dir().ok_or_else(|| {
        anyhow::anyhow!("no user data directory available; set store.path in the config")
    })?;
    Ok(dir.join("connections.json"))
}

fn build_scheduler(config: &CrierConfig) -> anyhow::Result<Arc<dyn SchedulerBackend>> {
    match &config.scheduler.url {
        Some(url) => {
            let timeout = Duration::from_secs(config.scheduler.timeout_secs);
            Ok(Arc::new(HttpScheduler::new(url, timeout)?))
        },
        None => Ok(Arc::new(MemoryScheduler::new())),
    }
}
