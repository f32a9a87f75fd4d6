//! FHIR R4 resource definitions emitted by the converter

pub mod bundle;
pub mod common;
pub mod coverage;
pub mod encounter;
pub mod location;
pub mod organization;
pub mod patient;
pub mod practitioner;
pub mod related_person;

pub use bundle::{Bundle, BundleEntry, BundleRequest, Resource};
pub use common::{
    push_extension_once, Address, CodeableConcept, Coding, ContactPoint, Extension, HumanName,
    Identifier, Period, Reference,
};
pub use coverage::Coverage;
pub use encounter::{Encounter, EncounterHospitalization, EncounterLocation};
pub use location::Location;
pub use organization::Organization;
pub use patient::Patient;
pub use practitioner::{Practitioner, PractitionerQualification, PractitionerRole};
pub use related_person::RelatedPerson;
