//! HL7 delimiter set, declared by MSH-1/MSH-2

use crate::error::{Error, Result};

pub const DEFAULT_FIELD_SEPARATOR: char = '|';
pub const DEFAULT_COMPONENT_SEPARATOR: char = '^';
pub const DEFAULT_REPETITION_SEPARATOR: char = '~';
pub const DEFAULT_ESCAPE_CHARACTER: char = '\\';
pub const DEFAULT_SUBCOMPONENT_SEPARATOR: char = '&';

/// The five separator characters of one message
///
/// The field separator is the single character immediately after `MSH`; the
/// other four follow in MSH-2, in this order: component, repetition, escape,
/// subcomponent. Every message carries its own set and the lexer takes it
/// verbatim, so a message encoded with exotic separators round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub field: char,
    pub component: char,
    pub repetition: char,
    pub escape: char,
    pub subcomponent: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            field: DEFAULT_FIELD_SEPARATOR,
            component: DEFAULT_COMPONENT_SEPARATOR,
            repetition: DEFAULT_REPETITION_SEPARATOR,
            escape: DEFAULT_ESCAPE_CHARACTER,
            subcomponent: DEFAULT_SUBCOMPONENT_SEPARATOR,
        }
    }
}

impl Delimiters {
    /// Build a delimiter set from MSH-1 and the four MSH-2 encoding characters
    pub fn from_encoding_characters(field: char, encoding_chars: &str) -> Result<Self> {
        let chars: Vec<char> = encoding_chars.chars().collect();
        if chars.len() != 4 {
            return Err(Error::InvalidDelimiters(format!(
                "expected 4 encoding characters, got {}",
                chars.len()
            )));
        }

        let delims = Self {
            field,
            component: chars[0],
            repetition: chars[1],
            escape: chars[2],
            subcomponent: chars[3],
        };
        delims.validate()?;
        Ok(delims)
    }

    /// The four MSH-2 encoding characters as a string
    pub fn encoding_characters(&self) -> String {
        format!(
            "{}{}{}{}",
            self.component, self.repetition, self.escape, self.subcomponent
        )
    }

    /// All five separators must be pairwise distinct
    pub fn validate(&self) -> Result<()> {
        let chars = [
            self.field,
            self.component,
            self.repetition,
            self.escape,
            self.subcomponent,
        ];
        for (i, &a) in chars.iter().enumerate() {
            if chars[i + 1..].contains(&a) {
                return Err(Error::InvalidDelimiters(format!(
                    "duplicate delimiter character '{}'",
                    a
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delimiters() {
        let delims = Delimiters::default();
        assert_eq!(delims.field, '|');
        assert_eq!(delims.component, '^');
        assert_eq!(delims.repetition, '~');
        assert_eq!(delims.escape, '\\');
        assert_eq!(delims.subcomponent, '&');
    }

    #[test]
    fn test_from_encoding_characters() {
        let delims = Delimiters::from_encoding_characters('|', "^~\\&").unwrap();
        assert_eq!(delims, Delimiters::default());
        assert_eq!(delims.encoding_characters(), "^~\\&");
    }

    #[test]
    fn test_exotic_separators() {
        let delims = Delimiters::from_encoding_characters('#', "*%!+").unwrap();
        assert_eq!(delims.field, '#');
        assert_eq!(delims.component, '*');
        assert_eq!(delims.subcomponent, '+');
    }

    #[test]
    fn test_too_few_encoding_characters() {
        assert!(Delimiters::from_encoding_characters('|', "^~\\").is_err());
    }

    #[test]
    fn test_duplicate_delimiters_rejected() {
        assert!(Delimiters::from_encoding_characters('|', "^^\\&").is_err());
        assert!(Delimiters::from_encoding_characters('^', "^~\\&").is_err());
    }
}
