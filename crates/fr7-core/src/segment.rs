//! HL7 segment structure

use crate::delimiters::Delimiters;
use crate::field::FieldValue;

/// One segment: a three-letter type and its ordered fields
///
/// Fields are addressed 1-based, as written in interface specifications.
/// For MSH the numbering is offset by one relative to other segments:
/// `MSH-1` is the field separator itself and `MSH-2` the encoding
/// characters, so the lexer stores both as ordinary leading fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Segment type ("MSH", "PID", "ZBE", ...)
    pub id: String,
    /// Fields in order; index 0 holds field 1
    pub fields: Vec<FieldValue>,
}

impl Segment {
    /// Create an empty segment of the given type
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field
    pub fn push_field(&mut self, field: FieldValue) {
        self.fields.push(field);
    }

    /// 1-based field access; missing positions read back as `Empty`
    pub fn field(&self, index: usize) -> &FieldValue {
        index
            .checked_sub(1)
            .and_then(|i| self.fields.get(i))
            .unwrap_or(FieldValue::empty())
    }

    /// Non-empty primary text of a field
    pub fn field_str(&self, index: usize) -> Option<&str> {
        self.field(index).text()
    }

    /// Number of fields present
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Encode back to wire form
    ///
    /// MSH re-emits its separator and encoding characters from the delimiter
    /// set rather than from the stored fields, matching how it was read.
    pub fn encode(&self, delimiters: &Delimiters) -> String {
        let sep = delimiters.field;
        let mut out = self.id.clone();
        if self.id == "MSH" {
            out.push(sep);
            out.push_str(&delimiters.encoding_characters());
            for field in self.fields.iter().skip(2) {
                out.push(sep);
                out.push_str(&field.encode(delimiters));
            }
        } else {
            for field in &self.fields {
                out.push(sep);
                out.push_str(&field.encode(delimiters));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_access_is_one_based() {
        let mut seg = Segment::new("PID");
        seg.push_field(FieldValue::atom("1"));
        seg.push_field(FieldValue::atom("2"));

        assert_eq!(seg.field_str(1), Some("1"));
        assert_eq!(seg.field_str(2), Some("2"));
        assert!(seg.field(3).is_empty());
        assert!(seg.field(0).is_empty());
    }

    #[test]
    fn test_encode_plain_segment() {
        let delims = Delimiters::default();
        let mut seg = Segment::new("EVN");
        seg.push_field(FieldValue::atom("A01"));
        seg.push_field(FieldValue::atom("20230815131519"));
        assert_eq!(seg.encode(&delims), "EVN|A01|20230815131519");
    }

    #[test]
    fn test_encode_msh_reemits_delimiters() {
        let delims = Delimiters::default();
        let mut msh = Segment::new("MSH");
        msh.push_field(FieldValue::atom("|"));
        msh.push_field(FieldValue::atom("^~\\&"));
        msh.push_field(FieldValue::atom("APP"));
        assert_eq!(msh.encode(&delims), "MSH|^~\\&|APP");
    }
}
