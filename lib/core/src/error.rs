use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Reasons a set of raw answers could not be turned into a feature vector.
///
/// Every variant carries the offending field name so callers can point the
/// user at the exact answer that needs fixing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Field '{field}' is not a finite number: {value:?}")]
    InvalidNumber { field: String, value: String },

    #[error("Field '{field}' has unrecognized category {value:?}")]
    UnrecognizedCategory { field: String, value: String },

    #[error("Field '{field}' must be a number or text, got {value}")]
    UnsupportedValue { field: String, value: String },
}

impl EncodeError {
    /// Name of the answer field that caused the failure
    pub fn field(&self) -> &str {
        match self {
            EncodeError::MissingField { field }
            | EncodeError::InvalidNumber { field, .. }
            | EncodeError::UnrecognizedCategory { field, .. }
            | EncodeError::UnsupportedValue { field, .. } => field,
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodeError),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Schema mismatch: expected {expected}, got {actual}")]
    SchemaMismatch { expected: String, actual: String },

    #[error("Artifact error: {0}")]
    Artifact(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
