//! FHIR Encounter resource

use super::common::*;
use serde::{Deserialize, Serialize};

/// FHIR R4 Encounter, enriched with French visit extensions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    /// Resource type (always "Encounter")
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Visit number (VN) identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    /// in-progress | finished
    pub status: String,

    /// v3-ActCode class (IMP, AMB, EMER, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Vec<EncounterLocation>>,

    /// Functional unit in charge (from ZBE)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_provider: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospitalization: Option<EncounterHospitalization>,

    /// Mode de prise en charge, expected exit, health event (ZBE)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Extension>>,
}

/// Encounter.location entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EncounterLocation {
    pub location: Reference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>, // planned | active | reserved | completed
}

/// Encounter.hospitalization block
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct EncounterHospitalization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_admission_identifier: Option<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub admit_source: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub discharge_disposition: Option<CodeableConcept>,

    /// French profile mirror of the expected-exit extension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_discharge_date: Option<String>,
}

impl Encounter {
    /// Create an Encounter with the mandatory status
    pub fn new<S: Into<String>>(status: S) -> Self {
        Self {
            resource_type: "Encounter".to_string(),
            id: None,
            identifier: None,
            status: status.into(),
            class: None,
            priority: None,
            subject: None,
            period: None,
            location: None,
            service_provider: None,
            hospitalization: None,
            extension: None,
        }
    }

    /// Hospitalization block, created on first use
    pub fn hospitalization_mut(&mut self) -> &mut EncounterHospitalization {
        self.hospitalization.get_or_insert_with(Default::default)
    }
}
