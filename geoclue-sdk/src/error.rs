use geoclue_api::ApiError;
use geoclue_providers::DescriptorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Provider descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to open location session: {0}")]
    Session(#[source] ApiError),

    #[error("Failed to start event pump: {0}")]
    EventPump(#[source] std::io::Error),

    #[error("API error: {0}")]
    ApiError(#[from] ApiError),

    #[error("No provider named '{name}' with {capability} support")]
    ProviderNotFound {
        name: String,
        capability: &'static str,
    },

    #[error("Provider '{0}' requires an address")]
    AddressRequired(String),

    #[error("Location session not initialized")]
    NotInitialized,

    #[error("Location session already initialized")]
    AlreadyInitialized,

    #[error("Location session closed")]
    Closed,
}

/// Broad category of an [`SdkError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The session could not be opened
    Session,
    /// No provider matched the requested name and capability
    Lookup,
    /// Caller-supplied input was rejected before any remote call
    Validation,
    /// A remote call failed or timed out
    RemoteCall,
    /// Descriptor directory or settings are unusable
    Config,
    /// The operation is not valid in the session's current state
    State,
}

impl SdkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SdkError::Descriptor(_) | SdkError::InvalidConfig(_) => ErrorKind::Config,
            SdkError::Session(_) | SdkError::EventPump(_) => ErrorKind::Session,
            SdkError::ApiError(_) => ErrorKind::RemoteCall,
            SdkError::ProviderNotFound { .. } => ErrorKind::Lookup,
            SdkError::AddressRequired(_) => ErrorKind::Validation,
            SdkError::NotInitialized | SdkError::AlreadyInitialized | SdkError::Closed => {
                ErrorKind::State
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SdkError>;
