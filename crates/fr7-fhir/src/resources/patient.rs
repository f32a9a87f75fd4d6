//! FHIR Patient resource

use super::common::*;
use serde::{Deserialize, Serialize};

/// FHIR R4 Patient, profiled for French national identifiers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    /// Resource type (always "Patient")
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// INS, IPP and pass-through identifiers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Vec<HumanName>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telecom: Option<Vec<ContactPoint>>,

    /// male | female | other | unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Vec<Address>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,
}

impl Patient {
    pub fn new() -> Self {
        Self {
            resource_type: "Patient".to_string(),
            id: None,
            identifier: None,
            name: None,
            telecom: None,
            gender: None,
            birth_date: None,
            address: None,
            marital_status: None,
            extension: None,
        }
    }
}

impl Default for Patient {
    fn default() -> Self {
        Self::new()
    }
}
