//! Segment extractors
//!
//! One converter per concern. Each consumes the parsed message, tolerates
//! missing segments and fields, and returns typed outputs the engine hands
//! to the composer; none touches the bundle directly.

pub mod coverage;
pub mod encounter;
pub mod movement;
pub mod name;
pub mod organization;
pub mod patient;
pub mod practitioner;
pub mod related_person;
