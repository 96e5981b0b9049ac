//! The per-platform connection state machine.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use {
    crier_oauth::{generate_pkce, generate_state},
    crier_platforms::{PlatformAdapter, PlatformRegistry},
    secrecy::Secret,
    tracing::{debug, info, warn},
};

use crate::{
    Result,
    error::Error,
    store::ConnectionStore,
    types::{AuthorizeTicket, ConnectionRecord, ConnectionStatus},
};

/// One in-flight authorization attempt. At most one per platform; a newer
/// initiate replaces it, which is also how abandoned attempts get collected.
struct PendingAuthorization {
    state: String,
    verifier: Option<String>,
}

/// Owns every platform connection: initiation, callback completion,
/// disconnect, status, and silent token refresh.
///
/// Per platform the lifecycle is disconnected → awaiting callback →
/// connected; completion failures and disconnects fall back to
/// disconnected. Reconnecting a connected platform simply replaces the
/// record. All state lives here and in the injected store; the manager is
/// the sole writer.
pub struct ConnectionManager {
    registry: Arc<PlatformRegistry>,
    store: Arc<dyn ConnectionStore>,
    connections: RwLock<HashMap<String, ConnectionRecord>>,
    pending: RwLock<HashMap<String, PendingAuthorization>>,
    /// Detail of the most recent failed completion per platform, surfaced
    /// via status until the next successful connect or disconnect.
    last_errors: RwLock<HashMap<String, String>>,
}

impl ConnectionManager {
    /// Build a manager and rehydrate persisted records, once per process.
    pub async fn new(
        registry: Arc<PlatformRegistry>,
        store: Arc<dyn ConnectionStore>,
    ) -> Result<Self> {
        let records = store.load_all().await?;
        let connections: HashMap<String, ConnectionRecord> = records
            .into_iter()
            .map(|r| (r.platform_id.clone(), r))
            .collect();
        if !connections.is_empty() {
            info!(count = connections.len(), "rehydrated persisted connections");
        }
        Ok(Self {
            registry,
            store,
            connections: RwLock::new(connections),
            pending: RwLock::new(HashMap::new()),
            last_errors: RwLock::new(HashMap::new()),
        })
    }

    fn adapter(&self, platform_id: &str) -> Result<&dyn PlatformAdapter> {
        self.registry
            .get(platform_id)
            .ok_or_else(|| Error::unknown_platform(platform_id))
    }

    /// Start an authorization attempt: fresh state (and PKCE pair where the
    /// platform uses it), pending slot overwritten, browser URL returned.
    pub fn initiate(&self, platform_id: &str) -> Result<AuthorizeTicket> {
        let adapter = self.adapter(platform_id)?;
        let state = generate_state();
        let (verifier, challenge) = if adapter.uses_pkce() {
            let pkce = generate_pkce();
            (Some(pkce.verifier), Some(pkce.challenge))
        } else {
            (None, None)
        };
        let url = adapter.authorize_url(&state, challenge.as_deref());

        let replaced = {
            let mut pending = self.pending.write().unwrap_or_else(|e| e.into_inner());
            pending
                .insert(
                    platform_id.to_string(),
                    PendingAuthorization {
                        state: state.clone(),
                        verifier,
                    },
                )
                .is_some()
        };
        if replaced {
            debug!(platform_id, "superseding an abandoned authorization attempt");
        }
        info!(platform_id, pkce = adapter.uses_pkce(), "authorization initiated");
        Ok(AuthorizeTicket {
            platform_id: platform_id.to_string(),
            url,
            state,
        })
    }

    /// Finish an authorization attempt with the provider's redirect values.
    ///
    /// `state` must match the most recent initiate for this platform; a
    /// mismatch is rejected without consuming the pending attempt, so a
    /// newer in-flight attempt stays completable. On a match the pending is
    /// consumed exactly once, whether or not the exchange then succeeds.
    pub async fn complete(
        &self,
        platform_id: &str,
        code: &str,
        state: &str,
    ) -> Result<ConnectionRecord> {
        let adapter = self.adapter(platform_id)?;

        let pending = {
            let mut pending = self.pending.write().unwrap_or_else(|e| e.into_inner());
            if pending
                .get(platform_id)
                .is_some_and(|p| p.state == state)
            {
                pending.remove(platform_id)
            } else {
                None
            }
        };
        let Some(pending) = pending else {
            warn!(platform_id, "authorization state mismatch, rejecting callback");
            return Err(Error::state_mismatch(platform_id));
        };

        let grant = match adapter.exchange_code(code, pending.verifier.as_deref()).await {
            Ok(grant) => grant,
            Err(e) => return Err(self.remember_failure(platform_id, &e)),
        };
        let user_info = match adapter.fetch_profile(&grant.access_token).await {
            Ok(profile) => profile,
            Err(e) => return Err(self.remember_failure(platform_id, &e)),
        };

        let now = crier_common::now_ms();
        let record = ConnectionRecord {
            platform_id: platform_id.to_string(),
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at_ms: grant.expires_in_secs.map(|secs| now + secs * 1_000),
            user_info,
            connected_at_ms: now,
        };
        self.store.save(&record).await?;

        {
            let mut connections = self.connections.write().unwrap_or_else(|e| e.into_inner());
            connections.insert(platform_id.to_string(), record.clone());
        }
        {
            let mut errors = self.last_errors.write().unwrap_or_else(|e| e.into_inner());
            errors.remove(platform_id);
        }
        info!(platform_id, "platform connected");
        Ok(record)
    }

    fn remember_failure(&self, platform_id: &str, source: &crier_platforms::Error) -> Error {
        let detail = source.to_string();
        warn!(platform_id, error = %detail, "connection attempt failed");
        let mut errors = self.last_errors.write().unwrap_or_else(|e| e.into_inner());
        errors.insert(platform_id.to_string(), detail.clone());
        Error::exchange_failed(platform_id, detail)
    }

    /// Drop the connection. Idempotent; also clears any pending attempt and
    /// remembered failure. Provider-side revocation is not attempted.
    pub async fn disconnect(&self, platform_id: &str) -> Result<()> {
        self.adapter(platform_id)?;
        self.store.delete(platform_id).await?;
        {
            let mut connections = self.connections.write().unwrap_or_else(|e| e.into_inner());
            connections.remove(platform_id);
        }
        {
            let mut pending = self.pending.write().unwrap_or_else(|e| e.into_inner());
            pending.remove(platform_id);
        }
        {
            let mut errors = self.last_errors.write().unwrap_or_else(|e| e.into_inner());
            errors.remove(platform_id);
        }
        info!(platform_id, "platform disconnected");
        Ok(())
    }

    /// Connection view for one platform. Pure read, no network I/O; may lag
    /// an in-flight completion by one transition.
    pub fn status(&self, platform_id: &str) -> Result<ConnectionStatus> {
        self.adapter(platform_id)?;
        Ok(self.status_unchecked(platform_id))
    }

    /// Connection views for every registered platform, sorted by id.
    #[must_use]
    pub fn statuses(&self) -> Vec<ConnectionStatus> {
        self.registry
            .list()
            .into_iter()
            .map(|id| self.status_unchecked(id))
            .collect()
    }

    fn status_unchecked(&self, platform_id: &str) -> ConnectionStatus {
        let now = crier_common::now_ms();
        let (connected, expires_at_ms, user_info) = {
            let connections = self.connections.read().unwrap_or_else(|e| e.into_inner());
            match connections.get(platform_id) {
                Some(r) => (r.is_live(now), r.expires_at_ms, Some(r.user_info.clone())),
                None => (false, None, None),
            }
        };
        let error = {
            let errors = self.last_errors.read().unwrap_or_else(|e| e.into_inner());
            errors.get(platform_id).cloned()
        };
        ConnectionStatus {
            platform_id: platform_id.to_string(),
            connected,
            expires_at_ms,
            user_info,
            error,
        }
    }

    /// Profile JSON captured at connect time, if this platform is connected.
    #[must_use]
    pub fn user_info(&self, platform_id: &str) -> Option<serde_json::Value> {
        let connections = self.connections.read().unwrap_or_else(|e| e.into_inner());
        connections.get(platform_id).map(|r| r.user_info.clone())
    }

    /// A token usable right now, or `None` when the platform needs a fresh
    /// authorization.
    ///
    /// An expired token with a refresh token on a refresh-capable platform
    /// gets exactly one silent renewal; the renewed record is persisted.
    /// There is no other retry behavior in this layer.
    pub async fn access_token(&self, platform_id: &str) -> Result<Option<Secret<String>>> {
        let adapter = self.adapter(platform_id)?;
        let now = crier_common::now_ms();

        let refresh_token = {
            let connections = self.connections.read().unwrap_or_else(|e| e.into_inner());
            match connections.get(platform_id) {
                None => return Ok(None),
                Some(r) if r.is_live(now) => return Ok(Some(r.access_token.clone())),
                Some(r) => r.refresh_token.clone(),
            }
        };

        let Some(refresh_token) = refresh_token else {
            debug!(platform_id, "access token expired with no refresh token");
            return Ok(None);
        };
        let Some(refresher) = adapter.refresher() else {
            debug!(platform_id, "access token expired and platform cannot refresh");
            return Ok(None);
        };

        info!(platform_id, "refreshing expired access token");
        let grant = match refresher.refresh(&refresh_token).await {
            Ok(grant) => grant,
            Err(e) => {
                warn!(platform_id, error = %e, "token refresh failed");
                return Ok(None);
            },
        };

        let renewed = {
            let mut connections = self.connections.write().unwrap_or_else(|e| e.into_inner());
            let Some(record) = connections.get_mut(platform_id) else {
                // Disconnected while the refresh was in flight.
                return Ok(None);
            };
            record.access_token = grant.access_token;
            if let Some(rotated) = grant.refresh_token {
                record.refresh_token = Some(rotated);
            }
            record.expires_at_ms = grant
                .expires_in_secs
                .map(|secs| crier_common::now_ms() + secs * 1_000);
            record.clone()
        };
        self.store.save(&renewed).await?;
        Ok(Some(renewed.access_token))
    }
}
