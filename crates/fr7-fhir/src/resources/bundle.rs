//! FHIR transaction Bundle

use super::coverage::Coverage;
use super::encounter::Encounter;
use super::location::Location;
use super::organization::Organization;
use super::patient::Patient;
use super::practitioner::{Practitioner, PractitionerRole};
use super::related_person::RelatedPerson;
use serde::{Deserialize, Serialize};

/// Any resource the converter emits
///
/// Serialization is untagged: each variant already carries its
/// `resourceType` discriminator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Resource {
    Patient(Patient),
    Encounter(Encounter),
    Organization(Organization),
    Practitioner(Practitioner),
    PractitionerRole(PractitionerRole),
    RelatedPerson(RelatedPerson),
    Coverage(Coverage),
    Location(Location),
}

impl Resource {
    /// FHIR resource type name
    pub fn resource_type(&self) -> &'static str {
        match self {
            Resource::Patient(_) => "Patient",
            Resource::Encounter(_) => "Encounter",
            Resource::Organization(_) => "Organization",
            Resource::Practitioner(_) => "Practitioner",
            Resource::PractitionerRole(_) => "PractitionerRole",
            Resource::RelatedPerson(_) => "RelatedPerson",
            Resource::Coverage(_) => "Coverage",
            Resource::Location(_) => "Location",
        }
    }

    /// Logical id of the resource, if assigned
    pub fn id(&self) -> Option<&str> {
        match self {
            Resource::Patient(r) => r.id.as_deref(),
            Resource::Encounter(r) => r.id.as_deref(),
            Resource::Organization(r) => r.id.as_deref(),
            Resource::Practitioner(r) => r.id.as_deref(),
            Resource::PractitionerRole(r) => r.id.as_deref(),
            Resource::RelatedPerson(r) => r.id.as_deref(),
            Resource::Coverage(r) => r.id.as_deref(),
            Resource::Location(r) => r.id.as_deref(),
        }
    }
}

macro_rules! impl_from_resource {
    ($($variant:ident),+) => {
        $(impl From<$variant> for Resource {
            fn from(value: $variant) -> Self {
                Resource::$variant(value)
            }
        })+
    };
}

impl_from_resource!(
    Patient,
    Encounter,
    Organization,
    Practitioner,
    PractitionerRole,
    RelatedPerson,
    Coverage,
    Location
);

/// Request line of a transaction entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleRequest {
    /// Always POST for this converter
    pub method: String,
    /// Target resource type
    pub url: String,
}

/// One transaction entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    pub full_url: String,
    pub resource: Resource,
    pub request: BundleRequest,
}

/// FHIR R4 transaction Bundle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// Resource type (always "Bundle")
    pub resource_type: String,

    pub id: String,

    /// Always "transaction"
    pub type_: String,

    /// ISO-8601 instant of the conversion
    pub timestamp: String,

    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    pub fn new<I: Into<String>, T: Into<String>>(id: I, timestamp: T) -> Self {
        Self {
            resource_type: "Bundle".to_string(),
            id: id.into(),
            type_: "transaction".to_string(),
            timestamp: timestamp.into(),
            entry: Vec::new(),
        }
    }

    /// Iterate over entries
    pub fn entries(&self) -> impl Iterator<Item = &BundleEntry> {
        self.entry.iter()
    }

    /// First resource of a given type
    pub fn first_of_type(&self, resource_type: &str) -> Option<&BundleEntry> {
        self.entry
            .iter()
            .find(|e| e.resource.resource_type() == resource_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_serializes_with_type_key() {
        let bundle = Bundle::new("bundle-1", "2023-08-15T13:15:19Z");
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["resourceType"], "Bundle");
        assert_eq!(json["type"], "transaction");
        assert_eq!(json["timestamp"], "2023-08-15T13:15:19Z");
    }

    #[test]
    fn test_resource_serializes_untagged() {
        let entry = BundleEntry {
            full_url: "urn:uuid:patient-1".to_string(),
            resource: Resource::Patient(Patient::new()),
            request: BundleRequest {
                method: "POST".to_string(),
                url: "Patient".to_string(),
            },
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["resource"]["resourceType"], "Patient");
        assert_eq!(json["request"]["method"], "POST");
    }
}
