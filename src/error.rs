// ─── Error ──────────────────────────────────────────────────────────────────
use crate::types::ValueKind;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JsonError>;

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("property not found: {name:?}")]
    NotFound { name: String },
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: ValueKind, actual: ValueKind },
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// An arena would outgrow the 32-bit offsets stored in records.
    #[error("{arena} capacity exceeded: {requested} bytes requested")]
    CapacityExceeded { arena: &'static str, requested: usize },
    /// A record offset points outside the occupied table. Never produced by
    /// a document that passed `verify`.
    #[error("corrupt record at offset {offset}")]
    Corrupt { offset: u32 },
    #[error("invalid property name: {0}")]
    InvalidName(String),
    #[error("unknown instance id {0}")]
    UnknownInstance(u32),
    #[error("unsupported value: {0}")]
    Unsupported(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CBOR error: {0}")]
    Cbor(String),
}

impl JsonError {
    pub(crate) fn not_found(name: &str) -> Self {
        JsonError::NotFound {
            name: name.to_string(),
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        JsonError::MalformedInput(msg.into())
    }
}
