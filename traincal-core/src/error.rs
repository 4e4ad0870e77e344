//! Error types for traincal.

use thiserror::Error;

/// Errors that can occur in traincal operations.
///
/// `Config` is fatal and aborts a run. `Service`, `NotFound` and `Parse`
/// are item-scoped: the reconciliation drivers catch them, log them and
/// count them without aborting the rest of the batch.
#[derive(Error, Debug)]
pub enum TraincalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Service error: {0}")]
    Service(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse failure: {0}")]
    Parse(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("{0}")]
    ProviderNotInstalled(String),

    #[error("Provider request timed out after {0}s")]
    ProviderTimeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for traincal operations.
pub type TraincalResult<T> = Result<T, TraincalError>;
