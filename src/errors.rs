// errors.rs
use crate::store::StoreError;
use std::fmt;

/// Errors originating from the ingestion run itself
/// (configuration, source discovery) or downstream layers (blob store, JSON).
#[derive(Debug)]
pub enum IngestError {
    Config(String),
    NoSource(String),
    Store(StoreError),
    Json(String),
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestError::Config(msg) => write!(f, "Configuration error: {msg}"),
            IngestError::NoSource(msg) => write!(f, "No source found: {msg}"),
            IngestError::Store(e) => write!(f, "Store error: {e}"),
            IngestError::Json(msg) => write!(f, "JSON error: {msg}"),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<StoreError> for IngestError {
    fn from(e: StoreError) -> Self {
        IngestError::Store(e)
    }
}

impl From<serde_json::Error> for IngestError {
    fn from(e: serde_json::Error) -> Self {
        IngestError::Json(e.to_string())
    }
}
