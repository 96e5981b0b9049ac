//! Concurrent fan-out with independent per-platform outcomes.

use std::sync::Arc;

use {
    crier_connections::ConnectionManager,
    crier_platforms::{PlatformAdapter, PlatformRegistry, PostContent},
    crier_validate::validate,
    futures::future::join_all,
    secrecy::Secret,
    tracing::{debug, info, warn},
};

use crate::{
    Result,
    error::Error,
    report::{DispatchEntry, DispatchOutcome, DispatchReport},
    scheduler::{ScheduledPostRequest, SchedulerBackend},
};

/// Fans one post out to many platforms, immediately or on a schedule.
pub struct Dispatcher {
    registry: Arc<PlatformRegistry>,
    manager: Arc<ConnectionManager>,
    scheduler: Arc<dyn SchedulerBackend>,
}

impl Dispatcher {
    #[must_use]
    pub fn new(
        registry: Arc<PlatformRegistry>,
        manager: Arc<ConnectionManager>,
        scheduler: Arc<dyn SchedulerBackend>,
    ) -> Self {
        Self {
            registry,
            manager,
            scheduler,
        }
    }

    /// Publish `content` to every platform in `platform_ids`, concurrently.
    ///
    /// The report has one entry per requested platform, in request order.
    /// An unknown platform id anywhere in the list rejects the whole call
    /// before any fan-out; everything else is a per-platform outcome.
    pub async fn post(
        &self,
        platform_ids: &[String],
        content: &PostContent,
    ) -> Result<DispatchReport> {
        self.check_known(platform_ids)?;
        info!(platforms = platform_ids.len(), "dispatching post");
        let entries = join_all(
            platform_ids
                .iter()
                .map(|id| self.publish_one(id, content)),
        )
        .await;
        Ok(DispatchReport { entries })
    }

    /// Hand `content` to the scheduler backend for every platform, for
    /// publishing at `at_ms`. Same fan-out contract as [`post`](Self::post).
    pub async fn schedule(
        &self,
        platform_ids: &[String],
        content: &PostContent,
        at_ms: u64,
    ) -> Result<DispatchReport> {
        self.check_known(platform_ids)?;
        info!(platforms = platform_ids.len(), at_ms, "scheduling post");
        let entries = join_all(
            platform_ids
                .iter()
                .map(|id| self.schedule_one(id, content, at_ms)),
        )
        .await;
        Ok(DispatchReport { entries })
    }

    /// Cancel a previously scheduled post backend-side.
    pub async fn cancel(&self, job_id: &str) -> Result<()> {
        self.scheduler.cancel_post(job_id).await
    }

    fn check_known(&self, platform_ids: &[String]) -> Result<()> {
        for id in platform_ids {
            if self.registry.get(id).is_none() {
                return Err(Error::unknown_platform(id));
            }
        }
        Ok(())
    }

    /// The per-platform gates shared by post and schedule: live token first,
    /// then content validation. Fails with the outcome to report.
    async fn prepare(
        &self,
        platform_id: &str,
        content: &PostContent,
    ) -> std::result::Result<(&dyn PlatformAdapter, Secret<String>), DispatchOutcome> {
        let Some(adapter) = self.registry.get(platform_id) else {
            // Ids are checked before fan-out starts.
            return Err(DispatchOutcome::ProviderError {
                detail: format!("unknown platform: {platform_id}"),
            });
        };

        let token = match self.manager.access_token(platform_id).await {
            Ok(Some(token)) => token,
            Ok(None) => return Err(DispatchOutcome::ConnectionMissing),
            Err(e) => {
                return Err(DispatchOutcome::ProviderError {
                    detail: e.to_string(),
                });
            },
        };

        let verdict = validate(adapter.descriptor(), content);
        for warning in &verdict.warnings {
            debug!(platform_id, warning = %warning, "content advisory");
        }
        if !verdict.valid {
            return Err(DispatchOutcome::ValidationFailed {
                errors: verdict.errors,
            });
        }
        Ok((adapter, token))
    }

    async fn publish_one(&self, platform_id: &str, content: &PostContent) -> DispatchEntry {
        let outcome = match self.prepare(platform_id, content).await {
            Ok((adapter, token)) => {
                let profile = self
                    .manager
                    .user_info(platform_id)
                    .unwrap_or(serde_json::Value::Null);
                match adapter.publish(&token, content, &profile).await {
                    Ok(post_id) => {
                        info!(platform_id, post_id = %post_id, "post published");
                        DispatchOutcome::Published { post_id }
                    },
                    Err(e) => {
                        warn!(platform_id, error = %e, "publish failed");
                        DispatchOutcome::ProviderError {
                            detail: e.to_string(),
                        }
                    },
                }
            },
            Err(outcome) => outcome,
        };
        DispatchEntry {
            platform_id: platform_id.to_string(),
            outcome,
        }
    }

    async fn schedule_one(
        &self,
        platform_id: &str,
        content: &PostContent,
        at_ms: u64,
    ) -> DispatchEntry {
        let outcome = match self.prepare(platform_id, content).await {
            Ok(_) => {
                let request =
                    ScheduledPostRequest::new(platform_id, content.media_url.as_deref(), at_ms);
                match self.scheduler.schedule_post(&request).await {
                    Ok(job_id) => {
                        info!(platform_id, job_id = %job_id, "post scheduled");
                        DispatchOutcome::Scheduled { job_id }
                    },
                    Err(e) => {
                        warn!(platform_id, error = %e, "scheduling failed");
                        DispatchOutcome::ProviderError {
                            detail: e.to_string(),
                        }
                    },
                }
            },
            Err(outcome) => outcome,
        };
        DispatchEntry {
            platform_id: platform_id.to_string(),
            outcome,
        }
    }
}
