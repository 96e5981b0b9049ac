use serde::Serialize;

/// What happened for one platform in one fan-out call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Live post created provider-side.
    Published { post_id: String },
    /// Accepted by the scheduler backend for future publishing.
    Scheduled { job_id: String },
    /// Content failed this platform's constraints; nothing was sent.
    ValidationFailed { errors: Vec<String> },
    /// No live connection, and the token could not be silently renewed.
    ConnectionMissing,
    /// The provider or scheduler rejected the call.
    ProviderError { detail: String },
}

impl DispatchOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Published { .. } | Self::Scheduled { .. })
    }
}

/// One platform's entry in a dispatch report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchEntry {
    pub platform_id: String,
    pub outcome: DispatchOutcome,
}

/// Ordered outcomes of one fan-out call: exactly one entry per requested
/// platform, in request order, regardless of which finished first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DispatchReport {
    pub entries: Vec<DispatchEntry>,
}

impl DispatchReport {
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.entries.iter().all(|e| e.outcome.is_success())
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| !e.outcome.is_success())
            .count()
    }
}
