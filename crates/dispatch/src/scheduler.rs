//! The remote scheduling backend behind a narrow trait.
//!
//! Scheduled publishing itself happens backend-side; this layer only hands
//! the job over and can cancel it later.

use std::{collections::HashMap, sync::Mutex, time::Duration};

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
    tracing::debug,
};

use crate::error::{Error, Result};

/// Wire shape the backend expects for one scheduled post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledPostRequest {
    /// `{platform}_{epoch_millis}`, minted at schedule time.
    pub id: String,
    /// Backend handle for the media to publish; empty for text-only posts.
    pub media_id: String,
    pub platform: String,
    pub scheduled_at: u64,
    pub status: String,
}

impl ScheduledPostRequest {
    #[must_use]
    pub fn new(platform: &str, media_id: Option<&str>, scheduled_at_ms: u64) -> Self {
        Self {
            id: format!("{platform}_{}", crier_common::now_ms()),
            media_id: media_id.unwrap_or_default().to_string(),
            platform: platform.to_string(),
            scheduled_at: scheduled_at_ms,
            status: "scheduled".to_string(),
        }
    }
}

/// Scheduling backend contract.
#[async_trait]
pub trait SchedulerBackend: Send + Sync {
    /// Hand one post over for future publishing. Returns the backend job id.
    async fn schedule_post(&self, request: &ScheduledPostRequest) -> Result<String>;

    /// Cancel a previously scheduled post.
    async fn cancel_post(&self, id: &str) -> Result<()>;
}

// ── HTTP backend ────────────────────────────────────────────────────────────

/// `{ok}` / `{err}` envelope the backend answers with.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    ok: Option<String>,
    #[serde(default)]
    err: Option<String>,
}

impl Envelope {
    fn into_result(self, operation: &str) -> Result<String> {
        match (self.ok, self.err) {
            (Some(value), _) => Ok(value),
            (None, Some(err)) => Err(Error::message(err)),
            (None, None) => Err(Error::message(format!(
                "{operation} response carried neither ok nor err"
            ))),
        }
    }
}

/// JSON-over-HTTP client for the scheduling backend.
pub struct HttpScheduler {
    base_url: String,
    client: reqwest::Client,
}

impl HttpScheduler {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| Error::external("building scheduler HTTP client", source))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl SchedulerBackend for HttpScheduler {
    async fn schedule_post(&self, request: &ScheduledPostRequest) -> Result<String> {
        let url = format!("{}/schedulePost", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|source| Error::external("failed to reach scheduler backend", source))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::message(format!(
                "scheduler backend returned HTTP {status}: {body}"
            )));
        }

        let envelope: Envelope = resp
            .json()
            .await
            .map_err(|source| Error::external("failed to parse scheduler response", source))?;
        let job_id = envelope.into_result("schedulePost")?;
        debug!(job_id = %job_id, platform = %request.platform, "post scheduled");
        Ok(job_id)
    }

    async fn cancel_post(&self, id: &str) -> Result<()> {
        let url = format!("{}/cancelPost", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "id": id }))
            .send()
            .await
            .map_err(|source| Error::external("failed to reach scheduler backend", source))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::message(format!(
                "scheduler backend returned HTTP {status}: {body}"
            )));
        }

        let envelope: Envelope = resp
            .json()
            .await
            .map_err(|source| Error::external("failed to parse scheduler response", source))?;
        envelope.into_result("cancelPost")?;
        debug!(id, "scheduled post cancelled");
        Ok(())
    }
}

// ── In-memory backend ───────────────────────────────────────────────────────

/// In-memory scheduler for tests and offline runs. The request id doubles
/// as the job id.
pub struct MemoryScheduler {
    jobs: Mutex<HashMap<String, ScheduledPostRequest>>,
}

impl MemoryScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Snapshot of everything currently scheduled.
    #[must_use]
    pub fn scheduled(&self) -> Vec<ScheduledPostRequest> {
        let jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        jobs.values().cloned().collect()
    }
}

impl Default for MemoryScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchedulerBackend for MemoryScheduler {
    async fn schedule_post(&self, request: &ScheduledPostRequest) -> Result<String> {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        jobs.insert(request.id.clone(), request.clone());
        Ok(request.id.clone())
    }

    async fn cancel_post(&self, id: &str) -> Result<()> {
        let mut jobs = self.jobs.lock().unwrap_or_else(|e| e.into_inner());
        if jobs.remove(id).is_none() {
            return Err(Error::message(format!("scheduled post not found: {id}")));
        }
        Ok(())
    }
}
