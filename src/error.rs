use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("DOM not available")]
    DomUnavailable,
    #[error("Element not found: {0}")]
    ElementNotFound(String),
    #[error("Canvas context unavailable")]
    NoContext2d,
    #[error("Operation failed: {0}")]
    OpFailed(String),
    #[error("Invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Image encoding failed: {0}")]
    Encode(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Storage unavailable: {0}")]
    Storage(String),
    #[error("Signature is missing")]
    MissingSignature,
    #[error("Submission rejected: {0}")]
    Rejected(String),
    #[error("Network error: {0}")]
    Network(String)
}
