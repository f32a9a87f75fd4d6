//! RelatedPerson extraction from NK1

use crate::error::ConversionResult;
use crate::resources::{CodeableConcept, Coding, HumanName, Reference, RelatedPerson};
use fr7_core::Message;
use fr7_terminology::catalogue;

const ROLE_CODE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-RoleCode";

/// Relationship codes accepted from NK1-3
const RELATIONSHIPS: [&str; 12] = [
    "SPO", "DOM", "CHD", "NCH", "PAR", "FTH", "MTH", "GRPRN", "SIB", "GRD", "SIGOTHR", "EMC",
];

/// Converter for NK1 segments
pub struct RelatedPersonConverter;

impl RelatedPersonConverter {
    /// Extract every NK1 into a RelatedPerson bound to the patient
    pub fn convert(
        message: &Message,
        patient_full_url: &str,
    ) -> ConversionResult<Vec<RelatedPerson>> {
        let mut related = Vec::new();

        for (index, nk1) in message.segments_of("NK1").into_iter().enumerate() {
            let mut person = RelatedPerson::new(Reference::to_full_url(patient_full_url));
            person.id = Some(format!("relatedperson-{}", index + 1));

            // NK1-2: family ^ given, given names split on spaces
            let name_field = nk1.field(2);
            let family = name_field.component_str(1);
            let given: Vec<String> = name_field
                .component_str(2)
                .map(|g| g.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default();
            if family.is_some() || !given.is_empty() {
                person.name = Some(vec![HumanName {
                    family: family.map(str::to_string),
                    given: (!given.is_empty()).then_some(given),
                    ..Default::default()
                }]);
            }

            // NK1-3: first component in the closed relationship set
            let relationship = nk1
                .field(3)
                .atoms()
                .into_iter()
                .find(|code| RELATIONSHIPS.contains(code));
            if let Some(code) = relationship {
                person.relationship = Some(vec![CodeableConcept {
                    coding: Some(vec![Coding::new(
                        ROLE_CODE_SYSTEM,
                        code,
                        Some(&catalogue().code_display("relationship", code)),
                    )]),
                    text: None,
                }]);
            }

            related.push(person);
        }

        Ok(related)
    }
}
