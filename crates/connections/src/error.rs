use std::error::Error as StdError;

/// Crate-wide result type for connection operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed connection errors.
///
/// Everything here is scoped to one platform or one attempt; nothing is
/// fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    /// A requested platform id is not registered.
    #[error("unknown platform: {platform_id}")]
    UnknownPlatform { platform_id: String },

    /// Callback state does not match the most recent initiate (or none is
    /// pending). Fatal to that completion attempt, never retried.
    #[error("authorization state mismatch for {platform_id}")]
    StateMismatch { platform_id: String },

    /// Code exchange or profile fetch failed provider-side.
    #[error("connecting {platform_id} failed: {detail}")]
    ProviderExchangeFailed { platform_id: String, detail: String },

    /// The persistence backend failed.
    #[error("connection store: {context}: {source}")]
    Store {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    #[must_use]
    pub fn unknown_platform(platform_id: impl std::fmt::Display) -> Self {
        Self::UnknownPlatform {
            platform_id: platform_id.to_string(),
        }
    }

    #[must_use]
    pub fn state_mismatch(platform_id: impl std::fmt::Display) -> Self {
        Self::StateMismatch {
            platform_id: platform_id.to_string(),
        }
    }

    #[must_use]
    pub fn exchange_failed(
        platform_id: impl std::fmt::Display,
        detail: impl std::fmt::Display,
    ) -> Self {
        Self::ProviderExchangeFailed {
            platform_id: platform_id.to_string(),
            detail: detail.to_string(),
        }
    }

    #[must_use]
    pub fn store(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Store {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

impl crier_common::FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

crier_common::impl_context!();
