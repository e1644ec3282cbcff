//! Error types for postloom-generator

use crate::provider::ProviderKind;
use thiserror::Error;

/// Result type for postloom-generator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for postloom-generator
#[derive(Error, Debug)]
pub enum Error {
    /// Topic discovery returned nothing for the keyword/region filter
    #[error("No topics found for the current keyword/region filter.")]
    NoTopicsFound,

    /// Text generation failed
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Publishing was requested but no client could be obtained
    #[error("{0}")]
    PublishAuthFailure(String),

    /// Publishing error outside of the per-topic loop
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] postloom_core::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the caller can fix this by changing input or settings
    pub fn is_user_error(&self) -> bool {
        match self {
            Error::NoTopicsFound | Error::PublishAuthFailure(_) => true,
            Error::Provider(e) => e.is_configuration(),
            Error::Publish(PublishError::Auth(_)) => true,
            Error::Core(postloom_core::Error::Config(_))
            | Error::Core(postloom_core::Error::UnsupportedOutputFormat(_)) => true,
            _ => false,
        }
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

/// What went wrong inside a provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// API key absent or blank; no request was sent
    CredentialMissing,
    /// Non-success status or transport failure, with the upstream detail
    Upstream(String),
    /// Response body did not have the expected shape
    MalformedResponse(String),
    /// No provider registered for the routed kind
    Unavailable,
}

/// Failure of a text-generation provider
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", self.message())]
pub struct ProviderError {
    pub provider: ProviderKind,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn credential_missing(provider: ProviderKind) -> Self {
        Self {
            provider,
            kind: ProviderErrorKind::CredentialMissing,
        }
    }

    pub fn upstream(provider: ProviderKind, detail: impl Into<String>) -> Self {
        Self {
            provider,
            kind: ProviderErrorKind::Upstream(detail.into()),
        }
    }

    pub fn malformed(provider: ProviderKind, detail: impl Into<String>) -> Self {
        Self {
            provider,
            kind: ProviderErrorKind::MalformedResponse(detail.into()),
        }
    }

    pub fn unavailable(provider: ProviderKind) -> Self {
        Self {
            provider,
            kind: ProviderErrorKind::Unavailable,
        }
    }

    /// True when the failure is caused by local configuration, not the upstream service
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.kind,
            ProviderErrorKind::CredentialMissing | ProviderErrorKind::Unavailable
        )
    }

    fn message(&self) -> String {
        let (key_label, request_label) = match self.provider {
            ProviderKind::Groq => ("GROQ", "Groq"),
            ProviderKind::Google => ("Google", "Google API"),
            ProviderKind::OpenAI => ("OpenAI", "OpenAI API"),
        };
        match &self.kind {
            ProviderErrorKind::CredentialMissing => {
                format!("{} API key is missing. Add it via Settings.", key_label)
            }
            ProviderErrorKind::Upstream(detail) => {
                format!("{} request failed: {}", request_label, detail)
            }
            ProviderErrorKind::MalformedResponse(detail) => {
                format!("Unexpected {} response format: {}", request_label, detail)
            }
            ProviderErrorKind::Unavailable => {
                format!("No {} provider is registered.", self.provider)
            }
        }
    }
}


/// Failure of the publishing client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// Credentials were rejected
    #[error("Reddit authentication failed: {0}")]
    Auth(String),

    /// Submission or lookup failed
    #[error("{0}")]
    Request(String),

    /// Response body did not have the expected shape
    #[error("Unexpected Reddit response format: {0}")]
    MalformedResponse(String),
}
