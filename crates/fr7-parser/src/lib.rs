//! Lenient lexer for HL7 v2.x messages
//!
//! The lexer takes the delimiter set from the first segment (which must be
//! MSH), splits on segment terminators (`\r`, `\n`, or `\r\n`, normalized on
//! ingress), and builds the [`FieldValue`] tree for every field. Escape
//! sequences (`\F\`, `\S\`, `\T\`, `\R\`, `\E\`, `\X..\`) are preserved
//! byte-for-byte; the extractors downstream operate on raw component text.
//!
//! Only two situations are fatal: an input that trims to nothing, and a
//! first segment that is not an MSH declaring at least five delimiter
//! characters. Everything else is tolerated; missing fields read back as
//! empty values.

use fr7_core::{Delimiters, Error, FieldValue, Message, Result, Segment};

/// Parse a complete HL7 message
pub fn parse_message(input: &str) -> Result<Message> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::EmptyMessage);
    }

    let delimiters = extract_delimiters(input)?;

    let segment_strings: Vec<&str> = input
        .split('\r')
        .flat_map(|s| s.split('\n'))
        .filter(|s| !s.trim().is_empty())
        .collect();

    let mut message = Message::with_delimiters(delimiters);
    for (idx, seg_str) in segment_strings.iter().enumerate() {
        let segment = if idx == 0 {
            parse_msh_segment(seg_str, &delimiters)
        } else {
            parse_segment(seg_str, &delimiters)
        };
        if let Some(segment) = segment {
            message.push_segment(segment);
        }
    }

    Ok(message)
}

/// Read the delimiter set from the head of the message
///
/// `MSH-1` is the single character immediately after `MSH`; the four MSH-2
/// encoding characters follow up to the next occurrence of that character.
fn extract_delimiters(input: &str) -> Result<Delimiters> {
    if !input.starts_with("MSH") {
        return Err(Error::MissingMsh);
    }

    let mut chars = input.chars().skip(3);
    let field = chars
        .next()
        .ok_or_else(|| Error::malformed("no field separator after MSH"))?;
    let encoding: String = chars.take_while(|&c| c != field).take(4).collect();
    if encoding.chars().count() < 4 {
        return Err(Error::malformed(format!(
            "expected 4 encoding characters after the field separator, got {}",
            encoding.chars().count()
        )));
    }

    Delimiters::from_encoding_characters(field, &encoding)
}

/// Parse the MSH segment with its shifted field numbering
///
/// The separator itself is stored as MSH-1 and the encoding characters as
/// MSH-2, so MSH-3 onwards line up with interface specifications.
fn parse_msh_segment(input: &str, delimiters: &Delimiters) -> Option<Segment> {
    let mut segment = Segment::new("MSH");
    segment.push_field(FieldValue::atom(delimiters.field.to_string()));
    segment.push_field(FieldValue::atom(delimiters.encoding_characters()));

    // MSH-3 starts after "MSH", the separator, the 4 encoding characters
    // and the separator closing MSH-2
    let header_len = "MSH".len()
        + delimiters.field.len_utf8()
        + delimiters.encoding_characters().len()
        + delimiters.field.len_utf8();
    if let Some(rest) = input.get(header_len..) {
        for field_str in rest.split(delimiters.field) {
            segment.push_field(parse_field(field_str, delimiters));
        }
    }

    Some(segment)
}

/// Parse a non-MSH segment; anything shorter than a type token is skipped
fn parse_segment(input: &str, delimiters: &Delimiters) -> Option<Segment> {
    let id = input.get(0..3)?;
    let mut segment = Segment::new(id);

    let rest = &input[3..];
    if let Some(body) = rest.strip_prefix(delimiters.field) {
        for field_str in body.split(delimiters.field) {
            segment.push_field(parse_field(field_str, delimiters));
        }
    }
    Some(segment)
}

/// Split a field into its repetition list, or fall through to components
fn parse_field(input: &str, delimiters: &Delimiters) -> FieldValue {
    if input.contains(delimiters.repetition) {
        FieldValue::Rep(
            input
                .split(delimiters.repetition)
                .map(|rep| parse_repetition(rep, delimiters))
                .collect(),
        )
    } else {
        parse_repetition(input, delimiters)
    }
}

/// Split a repetition into components, or fall through to subcomponents
fn parse_repetition(input: &str, delimiters: &Delimiters) -> FieldValue {
    if input.contains(delimiters.component) {
        FieldValue::Comp(
            input
                .split(delimiters.component)
                .map(|comp| parse_component(comp, delimiters))
                .collect(),
        )
    } else {
        match parse_component(input, delimiters) {
            // a bare subcomponent list is still component 1 of its field
            subs @ FieldValue::Comp(_) => FieldValue::Comp(vec![subs]),
            value => value,
        }
    }
}

/// Split a component into subcomponents, or keep the raw atom
fn parse_component(input: &str, delimiters: &Delimiters) -> FieldValue {
    if input.contains(delimiters.subcomponent) {
        FieldValue::Comp(
            input
                .split(delimiters.subcomponent)
                .map(FieldValue::atom)
                .collect(),
        )
    } else {
        FieldValue::atom(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "MSH|^~\\&|SEND|FAC|REC|FAC|20230815131519||ADT^A01|1|P|2.5\rPID|1||123^^^HOSP^PI||DUPONT^JEAN||19800101|M";

    #[test]
    fn test_parse_minimal_adt() {
        let msg = parse_message(MINIMAL).unwrap();
        assert_eq!(msg.segment_count(), 2);
        assert_eq!(msg.message_type(), Some(("ADT".into(), "A01".into())));

        let pid = msg.first("PID").unwrap();
        assert_eq!(pid.field_str(1), Some("1"));
        assert_eq!(pid.field(3).component_str(1), Some("123"));
        assert_eq!(pid.field(3).component_str(5), Some("PI"));
        assert_eq!(pid.field(5).component_str(1), Some("DUPONT"));
        assert_eq!(pid.field_str(8), Some("M"));
    }

    #[test]
    fn test_msh_numbering_is_shifted() {
        let msg = parse_message(MINIMAL).unwrap();
        let msh = msg.msh().unwrap();
        assert_eq!(msh.field_str(1), Some("|"));
        assert_eq!(msh.field_str(2), Some("^~\\&"));
        assert_eq!(msh.field_str(3), Some("SEND"));
        assert_eq!(msh.field_str(4), Some("FAC"));
        assert_eq!(msh.field_str(9), Some("ADT"));
    }

    #[test]
    fn test_line_terminators_normalized() {
        for sep in ["\r", "\n", "\r\n"] {
            let raw = MINIMAL.replace('\r', sep);
            let msg = parse_message(&raw).unwrap();
            assert_eq!(msg.segment_count(), 2, "separator {:?}", sep);
        }
    }

    #[test]
    fn test_trailing_empty_segments_dropped() {
        let msg = parse_message(&format!("{}\r\r\r", MINIMAL)).unwrap();
        assert_eq!(msg.segment_count(), 2);
    }

    #[test]
    fn test_repetitions_and_subcomponents() {
        let raw = "MSH|^~\\&|A|B|C|D|20230101||ADT^A08|1|P|2.5\rPID|||1^^^H^PI~2^^^ASIP-SANTE-INS-NIR&1.2.250.1.213.1.4.8&ISO^INS";
        let msg = parse_message(raw).unwrap();
        let pid3 = msg.first("PID").unwrap().field(3);
        let reps = pid3.repetitions();
        assert_eq!(reps.len(), 2);
        assert_eq!(reps[1].component(4).subcomponent(2).as_str(), Some("1.2.250.1.213.1.4.8"));
        assert_eq!(reps[1].component_str(5), Some("INS"));
    }

    #[test]
    fn test_escape_sequences_kept_verbatim() {
        let raw = "MSH|^~\\&|A|B|C|D|20230101||ADT^A01|1|P|2.5\rPID|||X||DU\\S\\PONT^J";
        let msg = parse_message(raw).unwrap();
        assert_eq!(
            msg.first("PID").unwrap().field(5).component_str(1),
            Some("DU\\S\\PONT")
        );
    }

    #[test]
    fn test_missing_msh_is_fatal() {
        assert!(matches!(
            parse_message("PID|1||123"),
            Err(Error::MissingMsh)
        ));
    }

    #[test]
    fn test_truncated_header_is_fatal() {
        assert!(matches!(
            parse_message("MSH|^~\\"),
            Err(Error::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_empty_message_is_fatal() {
        assert!(matches!(parse_message("   \r\n "), Err(Error::EmptyMessage)));
    }

    #[test]
    fn test_custom_delimiters() {
        let raw = "MSH#*%!+#SEND#FAC#REC#FAC#20230101##ADT*A01#1#P#2.5\rPID###123*ID";
        let msg = parse_message(raw).unwrap();
        assert_eq!(msg.delimiters.field, '#');
        assert_eq!(msg.first("PID").unwrap().field(3).component_str(2), Some("ID"));
    }

    #[test]
    fn test_roundtrip_reproduces_bytes() {
        let msg = parse_message(MINIMAL).unwrap();
        assert_eq!(msg.encode(), MINIMAL);
    }
}
