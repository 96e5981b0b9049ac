use std::error::Error as StdError;

/// Crate-wide result type for dispatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Dispatch errors. Per-platform publish failures are not errors; they are
/// [`DispatchOutcome`](crate::report::DispatchOutcome) entries. Only invalid
/// input and scheduler transport problems surface here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    /// A requested platform id is not registered. Rejects the whole call,
    /// before any fan-out.
    #[error("unknown platform: {platform_id}")]
    UnknownPlatform { platform_id: String },

    #[error("{context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    #[must_use]
    pub fn unknown_platform(platform_id: impl std::fmt::Display) -> Self {
        Self::UnknownPlatform {
            platform_id: platform_id.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
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
