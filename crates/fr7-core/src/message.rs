//! Parsed HL7 message

use crate::delimiters::Delimiters;
use crate::field::FieldValue;
use crate::segment::Segment;

/// A parsed message: ordered segments plus the delimiter set they were read
/// with
///
/// The model is read-only after construction; extractors only ever borrow
/// from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub segments: Vec<Segment>,
    pub delimiters: Delimiters,
}

impl Message {
    /// Create an empty message with the given delimiters
    pub fn with_delimiters(delimiters: Delimiters) -> Self {
        Self {
            segments: Vec::new(),
            delimiters,
        }
    }

    /// Append a segment
    pub fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// All occurrences of a segment type, in message order
    pub fn segments_of(&self, id: &str) -> Vec<&Segment> {
        self.segments.iter().filter(|s| s.id == id).collect()
    }

    /// First occurrence of a segment type
    pub fn first(&self, id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id == id)
    }

    /// The MSH segment (always the first segment of a lexed message)
    pub fn msh(&self) -> Option<&Segment> {
        self.segments.first().filter(|s| s.id == "MSH")
    }

    fn msh_field(&self, index: usize) -> &FieldValue {
        self.msh()
            .map(|msh| msh.field(index))
            .unwrap_or(FieldValue::empty())
    }

    /// Message type and trigger event from MSH-9 (e.g. `("ADT", "A01")`)
    pub fn message_type(&self) -> Option<(String, String)> {
        let field = self.msh_field(9);
        let msg_type = field.component_str(1)?;
        let trigger = field.component_str(2).unwrap_or_default();
        Some((msg_type.to_string(), trigger.to_string()))
    }

    /// Message control id from MSH-10
    pub fn control_id(&self) -> Option<&str> {
        self.msh_field(10).text()
    }

    /// Processing id from MSH-11
    pub fn processing_id(&self) -> Option<&str> {
        self.msh_field(11).text()
    }

    /// Version id from MSH-12
    pub fn version_id(&self) -> Option<&str> {
        self.msh_field(12).text()
    }

    /// Sending application from MSH-3
    pub fn sending_application(&self) -> Option<&str> {
        self.msh_field(3).text()
    }

    /// Sending facility from MSH-4
    pub fn sending_facility(&self) -> &FieldValue {
        self.msh_field(4)
    }

    /// Receiving application from MSH-5
    pub fn receiving_application(&self) -> Option<&str> {
        self.msh_field(5).text()
    }

    /// Receiving facility from MSH-6
    pub fn receiving_facility(&self) -> &FieldValue {
        self.msh_field(6)
    }

    /// Message date/time from MSH-7
    pub fn message_datetime(&self) -> Option<&str> {
        self.msh_field(7).text()
    }

    /// Number of segments
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Encode back to wire form with `\r` segment terminators
    pub fn encode(&self) -> String {
        self.encode_with_separator("\r")
    }

    /// Encode with a custom segment terminator
    pub fn encode_with_separator(&self, separator: &str) -> String {
        self.segments
            .iter()
            .map(|s| s.encode(&self.delimiters))
            .collect::<Vec<_>>()
            .join(separator)
    }
}
