use std::error::Error as StdError;

/// Crate-wide result type for adapter operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed adapter errors shared across the adapter traits.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    /// A requested platform id is not registered.
    #[error("unknown platform: {platform_id}")]
    UnknownPlatform { platform_id: String },

    /// The operation is not supported by this platform.
    #[error("unsupported on this platform: {message}")]
    Unsupported { message: String },

    /// Wrapped source error from a provider call.
    #[error("{context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// The provider answered, but not in the documented shape.
    #[error("unexpected provider response: {message}")]
    UnexpectedResponse { message: String },

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
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
    pub fn unsupported(message: impl std::fmt::Display) -> Self {
        Self::Unsupported {
            message: message.to_string(),
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

    #[must_use]
    pub fn unexpected(message: impl std::fmt::Display) -> Self {
        Self::UnexpectedResponse {
            message: message.to_string(),
        }
    }
}

impl crier_common::FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message(message)
    }
}

crier_common::impl_context!();
