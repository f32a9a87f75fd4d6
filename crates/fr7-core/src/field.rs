//! Field value tree
//!
//! An HL7 field reaches the consumer in one of four shapes: nothing at all,
//! a plain string, a repetition list, or a component list whose components
//! may nest subcomponents. French ADT feeds mix these shapes freely for the
//! same field position, so the model is a single tagged union and every
//! accessor tolerates every shape.

use crate::delimiters::Delimiters;

/// A field value in any of its wire shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// No content
    Empty,
    /// Plain string without embedded separators
    Atom(String),
    /// Repetition list (`a~b~c`)
    Rep(Vec<FieldValue>),
    /// Component list (`a^b^c`); one level deeper the same variant models a
    /// subcomponent list (`a&b`), the encoding depth decides the separator
    Comp(Vec<FieldValue>),
}

static EMPTY: FieldValue = FieldValue::Empty;

/// Nesting depth during encoding; decides which separator joins `Comp` lists
#[derive(Debug, Clone, Copy)]
enum Depth {
    Field,
    Component,
}

impl FieldValue {
    /// Build an atom, collapsing the empty string to `Empty`
    pub fn atom<S: Into<String>>(value: S) -> Self {
        let value = value.into();
        if value.is_empty() {
            FieldValue::Empty
        } else {
            FieldValue::Atom(value)
        }
    }

    /// An `Empty` value with a `'static` lifetime, for overflow returns
    pub fn empty() -> &'static FieldValue {
        &EMPTY
    }

    /// True when no shape holds any text
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Empty => true,
            FieldValue::Atom(s) => s.is_empty(),
            FieldValue::Rep(items) | FieldValue::Comp(items) => {
                items.iter().all(|v| v.is_empty())
            }
        }
    }

    /// The primary string of the value: the atom itself, or the first
    /// repetition's / first component's primary string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Empty => None,
            FieldValue::Atom(s) => Some(s.as_str()),
            FieldValue::Rep(items) | FieldValue::Comp(items) => {
                items.first().and_then(|v| v.as_str())
            }
        }
    }

    /// Like [`as_str`](Self::as_str) but suppressing empty strings
    pub fn text(&self) -> Option<&str> {
        self.as_str().filter(|s| !s.is_empty())
    }

    /// View the value as a repetition list
    ///
    /// A non-repeating value yields itself as a single-element list, so a
    /// single repetition is indistinguishable from an atomic field.
    pub fn repetitions(&self) -> Vec<&FieldValue> {
        match self {
            FieldValue::Empty => Vec::new(),
            FieldValue::Rep(items) => items.iter().collect(),
            _ => vec![self],
        }
    }

    /// 1-based component access; overflow reads back as `Empty`
    ///
    /// An atom is its own component 1. On a repetition list the first
    /// repetition is addressed.
    pub fn component(&self, index: usize) -> &FieldValue {
        match self {
            FieldValue::Empty => &EMPTY,
            FieldValue::Atom(_) => {
                if index == 1 {
                    self
                } else {
                    &EMPTY
                }
            }
            FieldValue::Comp(items) => {
                index
                    .checked_sub(1)
                    .and_then(|i| items.get(i))
                    .unwrap_or(&EMPTY)
            }
            FieldValue::Rep(items) => items
                .first()
                .map(|r| r.component(index))
                .unwrap_or(&EMPTY),
        }
    }

    /// Non-empty text of the 1-based component
    pub fn component_str(&self, index: usize) -> Option<&str> {
        self.component(index).text()
    }

    /// 1-based subcomponent access on a component value
    pub fn subcomponent(&self, index: usize) -> &FieldValue {
        // one level below components the same variant holds subcomponents
        self.component(index)
    }

    /// Every atom in the tree, depth-first
    pub fn atoms(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_atoms(&mut out);
        out
    }

    fn collect_atoms<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            FieldValue::Empty => {}
            FieldValue::Atom(s) => {
                if !s.is_empty() {
                    out.push(s.as_str());
                }
            }
            FieldValue::Rep(items) | FieldValue::Comp(items) => {
                for item in items {
                    item.collect_atoms(out);
                }
            }
        }
    }

    /// First non-empty atom, depth-first
    pub fn first_atom(&self) -> Option<&str> {
        match self {
            FieldValue::Empty => None,
            FieldValue::Atom(s) => (!s.is_empty()).then_some(s.as_str()),
            FieldValue::Rep(items) | FieldValue::Comp(items) => {
                items.iter().find_map(|v| v.first_atom())
            }
        }
    }

    /// Encode back to wire form with the message's delimiters
    pub fn encode(&self, delimiters: &Delimiters) -> String {
        self.encode_at(delimiters, Depth::Field)
    }

    fn encode_at(&self, delimiters: &Delimiters, depth: Depth) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Atom(s) => s.clone(),
            FieldValue::Rep(items) => items
                .iter()
                .map(|v| v.encode_at(delimiters, Depth::Field))
                .collect::<Vec<_>>()
                .join(&delimiters.repetition.to_string()),
            FieldValue::Comp(items) => {
                let (child_depth, sep) = match depth {
                    Depth::Field => (Depth::Component, delimiters.component),
                    Depth::Component => (Depth::Component, delimiters.subcomponent),
                };
                items
                    .iter()
                    .map(|v| v.encode_at(delimiters, child_depth))
                    .collect::<Vec<_>>()
                    .join(&sep.to_string())
            }
        }
    }
}
