//! FHIR RelatedPerson resource

use super::common::*;
use serde::{Deserialize, Serialize};

/// FHIR R4 RelatedPerson (NK1 next of kin)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RelatedPerson {
    /// Resource type (always "RelatedPerson")
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The patient this person is related to
    pub patient: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<HumanName>>,
}

impl RelatedPerson {
    pub fn new(patient: Reference) -> Self {
        Self {
            resource_type: "RelatedPerson".to_string(),
            id: None,
            patient,
            relationship: None,
            name: None,
        }
    }
}
