//! FHIR Location resource

use super::common::*;
use serde::{Deserialize, Serialize};

/// FHIR R4 Location (facility discovered in PV1-3)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Resource type (always "Location")
    pub resource_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<Identifier>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// instance | kind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

impl Location {
    pub fn new() -> Self {
        Self {
            resource_type: "Location".to_string(),
            id: None,
            identifier: None,
            name: None,
            mode: None,
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new()
    }
}
