//! FHIR Practitioner and PractitionerRole resources

use super::common::*;
use serde::{Deserialize, Serialize};

/// FHIR R4 Practitioner with French registry identifiers (RPPS/ADELI)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Practitioner {
    /// Resource type (always "Practitioner")
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<HumanName>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualification: Option<Vec<PractitionerQualification>>,

    /// Profession and nationality extensions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,
}

/// Practitioner.qualification entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PractitionerQualification {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    pub code: CodeableConcept,
}

impl Practitioner {
    pub fn new() -> Self {
        Self {
            resource_type: "Practitioner".to_string(),
            id: None,
            identifier: None,
            name: None,
            qualification: None,
            extension: None,
        }
    }
}

impl Default for Practitioner {
    fn default() -> Self {
        Self::new()
    }
}

/// FHIR R4 PractitionerRole tying a practitioner to the encounter it was
/// declared on (French interoperability profile surface)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PractitionerRole {
    /// Resource type (always "PractitionerRole")
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub practitioner: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub encounter: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,
}

impl PractitionerRole {
    pub fn new() -> Self {
        Self {
            resource_type: "PractitionerRole".to_string(),
            id: None,
            practitioner: None,
            encounter: None,
            code: None,
            extension: None,
        }
    }
}

impl Default for PractitionerRole {
    fn default() -> Self {
        Self::new()
    }
}
