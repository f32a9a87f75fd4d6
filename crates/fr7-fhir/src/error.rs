//! Error types for the conversion pipeline
//!
//! Policy: extract defensively, compose strictly. Shape irregularities are
//! absorbed inside the extractors (the offending field is dropped and a
//! warning traced); only header-level parse failures and programmer errors
//! escalate to the caller.

use thiserror::Error;

/// Result type for conversion operations
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Fatal errors of one conversion
#[derive(Debug, Error)]
pub enum ConversionError {
    /// The message could not be lexed at all
    #[error(transparent)]
    Parse(#[from] fr7_core::Error),

    /// A bug inside one extractor; the bundle composes without the resource
    #[error("extraction failed in {extractor}: {detail}")]
    InternalExtraction { extractor: &'static str, detail: String },
}

/// Recoverable problems inside one extractor
///
/// These never cross the engine boundary; the extractor drops the field (or
/// emits a best-effort partial resource) and the engine records a warning.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Identifier authority resolves to no known OID or URL
    #[error("unknown identifier authority: {0}")]
    UnknownIdentifierAuthority(String),

    /// Date or time failed format validation
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Normalized phone number too short
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),

    /// Field layout defies the dialect expectation
    #[error("unexpected shape in {segment}-{field}")]
    UnexpectedShape { segment: &'static str, field: usize },
}
