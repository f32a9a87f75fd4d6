//! Core data structures for French HL7 v2.5 ADT processing
//!
//! This crate provides the foundational types used throughout fr7:
//! - The message hierarchy (Message, Segment, FieldValue)
//! - The delimiter set declared by MSH-1/MSH-2
//! - Ingestion error types
//!
//! Fields are modeled as a single [`FieldValue`] sum type because the French
//! dialect feeds this library consumes deliver the same field position as a
//! plain string, a repetition list, or a nested component tree depending on
//! the emitting system; consumers pattern-match once instead of guessing.

pub mod delimiters;
pub mod error;
pub mod field;
pub mod message;
pub mod segment;

pub use delimiters::Delimiters;
pub use error::{Error, Result};
pub use field::FieldValue;
pub use message::Message;
pub use segment::Segment;
