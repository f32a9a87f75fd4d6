//! Practitioner extraction from ROL
//!
//! ROL-4 carries the person block (XCN). French feeds identify the
//! professional through RPPS (11-digit national registry) or ADELI; the
//! profession code rides in a trailing component of the same block.

use crate::converters::organization::slug;
use crate::error::ConversionResult;
use crate::identifier::OID_RPPS;
use crate::resources::{
    CodeableConcept, Coding, Extension, HumanName, Identifier, Practitioner,
    PractitionerQualification, PractitionerRole, Reference,
};
use fr7_core::{FieldValue, Message};
use fr7_terminology::{
    catalogue, urn_oid, FR_EXT_NATIONALITY, FR_EXT_PRACTITIONER_PROFESSION, FR_SYS_PAYS,
    FR_SYS_PROFESSION,
};

/// OID of the ADELI registry
const OID_ADELI: &str = "1.2.250.1.71.4.2.2";

/// One ROL segment's output: the Practitioner plus, when an Encounter is on
/// board, the role binding it to the visit
#[derive(Debug, Clone)]
pub struct PractitionerExtraction {
    pub practitioner: Practitioner,
    pub role: Option<PractitionerRole>,
}

/// Converter for ROL segments
pub struct PractitionerConverter;

impl PractitionerConverter {
    /// Extract every ROL into a Practitioner (and PractitionerRole when the
    /// encounter reference is known)
    pub fn convert(
        message: &Message,
        encounter_full_url: Option<&str>,
    ) -> ConversionResult<Vec<PractitionerExtraction>> {
        let mut extractions = Vec::new();

        for (index, rol) in message.segments_of("ROL").into_iter().enumerate() {
            let person = rol.field(4);
            let practitioner = Self::convert_person(person, index);

            let role = encounter_full_url.map(|encounter| {
                Self::convert_role(rol.field(3), &practitioner, encounter, index)
            });

            extractions.push(PractitionerExtraction { practitioner, role });
        }

        Ok(extractions)
    }

    fn convert_person(person: &FieldValue, index: usize) -> Practitioner {
        let id_value = person.component_str(1).unwrap_or("");
        let family = person.component_str(2);
        let given = person.component_str(3);
        let authority = person.component(9);
        let authority_name = authority.subcomponent(1).text().unwrap_or("");
        let authority_oid = authority.subcomponent(2).text().unwrap_or("");
        let profession_code = person.component_str(13);

        let mut practitioner = Practitioner::new();
        practitioner.id = Some(if id_value.is_empty() {
            format!("practitioner-{}", index + 1)
        } else {
            format!("practitioner-{}", slug(id_value))
        });

        // registry identifier: RPPS when the value, authority or OID says so
        let mut identifiers = Vec::new();
        if !id_value.is_empty() {
            let is_rpps = id_value.len() == 11
                || authority_name.contains("RPPS")
                || authority_oid == OID_RPPS;
            let (oid, type_code, display) = if is_rpps {
                (OID_RPPS, "RPPS", "N° RPPS")
            } else {
                (OID_ADELI, "ADELI", "N° ADELI")
            };
            identifiers.push(
                Identifier::with_system(urn_oid(oid), id_value).typed(type_code, Some(display)),
            );
            identifiers.push(Identifier {
                value: Some(id_value.to_string()),
                use_: Some("secondary".to_string()),
                ..Default::default()
            });
        }
        if !identifiers.is_empty() {
            practitioner.identifier = Some(identifiers.clone());
        }

        // single official name; anonymous practitioners fall back to a
        // generic family
        practitioner.name = Some(vec![HumanName {
            use_: Some("official".to_string()),
            family: Some(family.unwrap_or("Praticien").to_string()),
            given: given.map(|g| vec![g.to_string()]),
            ..Default::default()
        }]);

        let mut extensions = Vec::new();
        if let Some(code) = profession_code {
            let info = catalogue().profession_info(code);
            extensions.push(Extension::codeable_concept(
                FR_EXT_PRACTITIONER_PROFESSION,
                CodeableConcept::coding(&info.system, &info.code, Some(&info.display)),
            ));
        }
        extensions.push(Extension::codeable_concept(
            FR_EXT_NATIONALITY,
            CodeableConcept::coding(FR_SYS_PAYS, "FRA", Some("France")),
        ));
        practitioner.extension = Some(extensions);

        if !id_value.is_empty() {
            let code = match profession_code {
                Some(code) => {
                    let info = catalogue().profession_info(code);
                    CodeableConcept::coding(&info.system, &info.code, Some(&info.display))
                }
                None => CodeableConcept {
                    coding: None,
                    text: Some("Praticien".to_string()),
                },
            };
            practitioner.qualification = Some(vec![PractitionerQualification {
                identifier: Some(vec![identifiers[0].clone()]),
                code,
            }]);
        }

        practitioner
    }

    fn convert_role(
        role_code: &FieldValue,
        practitioner: &Practitioner,
        encounter_full_url: &str,
        index: usize,
    ) -> PractitionerRole {
        let mut role = PractitionerRole::new();
        role.id = Some(format!("practitionerrole-{}", index + 1));
        role.practitioner = Some(Reference::to_full_url(format!(
            "urn:uuid:{}",
            practitioner.id.as_deref().unwrap_or_default()
        )));
        role.encounter = Some(Reference::to_full_url(encounter_full_url));

        if let Some(code) = role_code.first_atom() {
            role.code = Some(vec![CodeableConcept {
                coding: Some(vec![Coding::new(FR_SYS_PROFESSION, code, None)]),
                text: None,
            }]);
        }
        role.extension = practitioner
            .extension
            .as_ref()
            .map(|exts| {
                exts.iter()
                    .filter(|e| e.url == FR_EXT_PRACTITIONER_PROFESSION)
                    .cloned()
                    .collect::<Vec<_>>()
            })
            .filter(|exts| !exts.is_empty());

        role
    }
}
