//! FHIR Organization resource

use super::common::*;
use serde::{Deserialize, Serialize};

/// FHIR R4 Organization (facilities, payors, functional units)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    /// Resource type (always "Organization")
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_: Option<Vec<CodeableConcept>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Organization {
    pub fn new() -> Self {
        Self {
            resource_type: "Organization".to_string(),
            id: None,
            identifier: None,
            type_: None,
            name: None,
        }
    }
}

impl Default for Organization {
    fn default() -> Self {
        Self::new()
    }
}
