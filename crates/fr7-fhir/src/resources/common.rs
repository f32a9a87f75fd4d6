//! Shared FHIR R4 datatypes
//!
//! Only the surface the converter emits is modeled. Serialization follows
//! FHIR JSON conventions: camelCase names, absent optionals omitted.

use serde::{Deserialize, Serialize};

/// FHIR HumanName
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct HumanName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>, // usual | official | temp | nickname | anonymous | old | maiden

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub given: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<Vec<String>>,
}

/// FHIR Address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>, // home | work | temp | old | billing

    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>, // postal | physical | both

    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    /// ANS profile extensions (INSEE commune code)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,
}

/// FHIR ContactPoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>, // phone | fax | email | pager | url | sms | other

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>, // home | work | temp | old | mobile

    /// ANS profile extensions (mobility marker)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,
}

/// FHIR Identifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>, // usual | official | temp | secondary | old

    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigner: Option<Box<Reference>>,

    /// ANS profile extensions (INSi status on INS identifiers)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,
}

impl Identifier {
    /// Identifier with a system and value only
    pub fn with_system<S: Into<String>, V: Into<String>>(system: S, value: V) -> Self {
        Self {
            system: Some(system.into()),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// Attach a v2-0203 type coding
    pub fn typed(mut self, code: &str, display: Option<&str>) -> Self {
        self.type_ = Some(CodeableConcept::coding(
            "http://terminology.hl7.org/CodeSystem/v2-0203",
            code,
            display,
        ));
        self
    }
}

/// FHIR CodeableConcept
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CodeableConcept {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coding: Option<Vec<Coding>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    /// Concept with a single coding
    pub fn coding(system: &str, code: &str, display: Option<&str>) -> Self {
        Self {
            coding: Some(vec![Coding::new(system, code, display)]),
            text: None,
        }
    }

    /// Code of the first coding
    pub fn first_code(&self) -> Option<&str> {
        self.coding
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.code.as_deref())
    }
}

/// FHIR Coding
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Coding {
    pub fn new(system: &str, code: &str, display: Option<&str>) -> Self {
        Self {
            system: Some(system.to_string()),
            code: Some(code.to_string()),
            display: display.map(str::to_string),
        }
    }
}

/// FHIR Reference, always by `urn:uuid` value inside one bundle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl Reference {
    /// Reference to a bundle entry by its fullUrl
    pub fn to_full_url<S: Into<String>>(full_url: S) -> Self {
        Self {
            reference: Some(full_url.into()),
            display: None,
        }
    }

    /// Display-only reference (no resolvable target)
    pub fn display_only<S: Into<String>>(display: S) -> Self {
        Self {
            reference: None,
            display: Some(display.into()),
        }
    }
}

/// FHIR Period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

/// FHIR Extension with the value choice surface the ANS profiles use
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    pub url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_boolean: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_date_time: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_coding: Option<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_codeable_concept: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_identifier: Option<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_reference: Option<Reference>,
}

impl Extension {
    fn empty(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Default::default()
        }
    }

    pub fn string(url: &str, value: &str) -> Self {
        Self {
            value_string: Some(value.to_string()),
            ..Self::empty(url)
        }
    }

    pub fn boolean(url: &str, value: bool) -> Self {
        Self {
            value_boolean: Some(value),
            ..Self::empty(url)
        }
    }

    pub fn code(url: &str, value: &str) -> Self {
        Self {
            value_code: Some(value.to_string()),
            ..Self::empty(url)
        }
    }

    pub fn date_time(url: &str, value: &str) -> Self {
        Self {
            value_date_time: Some(value.to_string()),
            ..Self::empty(url)
        }
    }

    pub fn coding(url: &str, value: Coding) -> Self {
        Self {
            value_coding: Some(value),
            ..Self::empty(url)
        }
    }

    pub fn codeable_concept(url: &str, value: CodeableConcept) -> Self {
        Self {
            value_codeable_concept: Some(value),
            ..Self::empty(url)
        }
    }

    pub fn identifier(url: &str, value: Identifier) -> Self {
        Self {
            value_identifier: Some(value),
            ..Self::empty(url)
        }
    }
}

/// Push an extension unless one with the same URL is already present
pub fn push_extension_once(list: &mut Option<Vec<Extension>>, ext: Extension) {
    let list = list.get_or_insert_with(Vec::new);
    if !list.iter().any(|e| e.url == ext.url) {
        list.push(ext);
    }
}
