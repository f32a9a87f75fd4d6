//! Error types for HL7 message ingestion

use thiserror::Error;

/// Result type alias for fr7-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while lexing a raw HL7 message
///
/// Only header-level problems are fatal; every other shape irregularity is
/// absorbed by the model (missing fields read back as empty values).
#[derive(Error, Debug)]
pub enum Error {
    /// The first segment is not MSH
    #[error("message does not start with an MSH segment")]
    MissingMsh,

    /// MSH is present but does not declare a usable delimiter set
    #[error("malformed MSH header: {0}")]
    MalformedHeader(String),

    /// The input trims to nothing
    #[error("empty message")]
    EmptyMessage,

    /// Delimiter set declared by MSH-1/MSH-2 is unusable
    #[error("invalid delimiter configuration: {0}")]
    InvalidDelimiters(String),
}

impl Error {
    /// Create a malformed-header error
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Error::MalformedHeader(msg.into())
    }
}
