//! FHIR Coverage resource

use super::common::*;
use serde::{Deserialize, Serialize};

/// FHIR R4 Coverage for French AMO/AMC/ALD/ATMP coverage lines
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    /// Resource type (always "Coverage")
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// active | cancelled | draft | entered-in-error
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_id: Option<String>,

    /// The covered patient
    pub beneficiary: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payor: Option<Vec<Reference>>,

    /// Insured-person identifier extension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,
}

impl Coverage {
    pub fn new(beneficiary: Reference) -> Self {
        Self {
            resource_type: "Coverage".to_string(),
            id: None,
            status: "active".to_string(),
            type_: None,
            subscriber_id: None,
            beneficiary,
            period: None,
            payor: None,
            extension: None,
        }
    }
}
