//! Encounter extraction from PV1 (and PV2)

use crate::converters::organization::slug;
use crate::error::ConversionResult;
use crate::identifier::OID_IPP;
use crate::normalize::{leading_eight_digits, parse_hl7_date, parse_hl7_datetime};
use crate::resources::{
    push_extension_once, CodeableConcept, Coding, Encounter, EncounterLocation, Extension,
    Identifier, Location, Period, Reference,
};
use fr7_core::{Message, Segment};
use fr7_terminology::{
    catalogue, urn_oid, FR_EXT_ENCOUNTER_EXPECTED_EXIT, FR_EXT_MODE_PRISE_EN_CHARGE,
    FR_SYS_MODE_PRISE_EN_CHARGE,
};
use tracing::warn;

const ACT_CODE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-ActCode";

/// What the PV1/PV2 pair produced: the Encounter itself plus any Location
/// side-resources discovered on the way
#[derive(Debug, Clone)]
pub struct EncounterExtraction {
    pub main: Encounter,
    pub side_locations: Vec<Location>,
}

/// Converter for the PV1 (+PV2) segment pair
pub struct EncounterConverter;

impl EncounterConverter {
    /// Extract the Encounter and its side Locations
    pub fn convert(
        message: &Message,
        patient_full_url: Option<&str>,
        stamp: &str,
    ) -> ConversionResult<Option<EncounterExtraction>> {
        let Some(pv1) = message.first("PV1") else {
            return Ok(None);
        };
        let pv2 = message.first("PV2");

        // PV1-36 in 01..09 marks a closed stay
        let status = match pv1.field_str(36) {
            Some(code) if code.len() == 2 && ("01"..="09").contains(&code) => "finished",
            _ => "in-progress",
        };
        let mut encounter = Encounter::new(status);

        // PV1-2: class + mode de prise en charge
        if let Some(class_code) = pv1.field_str(2) {
            encounter.class = Some(Self::convert_class(class_code));
            let mode = Self::convert_mode_prise_en_charge(class_code);
            push_extension_once(
                &mut encounter.extension,
                Extension::codeable_concept(
                    FR_EXT_MODE_PRISE_EN_CHARGE,
                    CodeableConcept::coding(
                        FR_SYS_MODE_PRISE_EN_CHARGE,
                        mode,
                        Some(&catalogue().code_display("modePriseEnCharge", mode)),
                    ),
                ),
            );
        }

        // PV1-19: visit number
        let visit_number = pv1.field(19).component_str(1);
        if let Some(vn) = visit_number {
            encounter.identifier = Some(vec![Identifier::with_system(urn_oid(OID_IPP), vn)
                .typed("VN", Some("Numéro de venue"))]);
        }
        encounter.id = Some(format!(
            "encounter-{}",
            visit_number.map(slug).unwrap_or_else(|| stamp.to_string())
        ));

        // PV1-44: admission date
        if let Some(admit) = pv1.field_str(44) {
            match parse_hl7_datetime(admit) {
                Ok(start) => {
                    encounter.period = Some(Period {
                        start: Some(start),
                        end: None,
                    });
                }
                Err(err) => warn!(%err, "dropping unparseable PV1-44"),
            }
        }

        // expected exit date: PV2 ladder, then PV1-44
        if let Some(exit) = Self::expected_exit_date(pv1, pv2) {
            push_extension_once(
                &mut encounter.extension,
                Extension::date_time(FR_EXT_ENCOUNTER_EXPECTED_EXIT, &exit),
            );
            encounter.hospitalization_mut().expected_discharge_date = Some(exit);
        }

        if let Some(patient) = patient_full_url {
            encounter.subject = Some(Reference::to_full_url(patient));
        }

        // PV1-3: assigned location; the dialect hides the facility in the
        // 4th component as NAME&ID&M
        let mut side_locations = Vec::new();
        if let Some(location) = Self::convert_location(pv1) {
            encounter.location = Some(vec![EncounterLocation {
                location: Reference::to_full_url(format!(
                    "urn:uuid:{}",
                    location.id.as_deref().unwrap_or_default()
                )),
                status: Some("active".to_string()),
            }]);
            side_locations.push(location);
        }

        Ok(Some(EncounterExtraction {
            main: encounter,
            side_locations,
        }))
    }

    /// PV1-2 → v3-ActCode class
    fn convert_class(code: &str) -> Coding {
        let (act_code, display) = match code {
            "I" => ("IMP", "inpatient encounter"),
            "O" | "P" | "B" => ("AMB", "ambulatory"),
            "E" => ("EMER", "emergency"),
            "R" => ("ACUTE", "inpatient acute"),
            "N" => ("NONAC", "inpatient non-acute"),
            _ => ("AMB", "ambulatory"),
        };
        Coding::new(ACT_CODE_SYSTEM, act_code, Some(display))
    }

    /// PV1-2 → mode de prise en charge code
    fn convert_mode_prise_en_charge(code: &str) -> &'static str {
        match code {
            "O" | "P" | "B" => "CONSULT",
            "E" => "URMG",
            _ => "HOSPITALT",
        }
    }

    /// Expected exit recovery ladder: PV2-9, PV2-30, PV2-40, any 8-digit
    /// token in PV2, finally PV1-44
    fn expected_exit_date(pv1: &Segment, pv2: Option<&Segment>) -> Option<String> {
        if let Some(pv2) = pv2 {
            for position in [9, 30, 40] {
                if let Some(date) = Self::eight_digit_date(pv2, position) {
                    return Some(date);
                }
            }
            // whole-segment scan for the first token starting with 8 digits
            for field in &pv2.fields {
                for atom in field.atoms() {
                    if let Some(date) = leading_eight_digits(atom)
                        .and_then(|digits| parse_hl7_date(digits).ok())
                    {
                        return Some(date);
                    }
                }
            }
        }

        pv1.field_str(44)
            .and_then(|admit| parse_hl7_datetime(admit).ok())
    }

    fn eight_digit_date(pv2: &Segment, position: usize) -> Option<String> {
        pv2.field(position)
            .atoms()
            .into_iter()
            .find_map(leading_eight_digits)
            .and_then(|digits| parse_hl7_date(digits).ok())
    }

    fn convert_location(pv1: &Segment) -> Option<Location> {
        let facility = pv1.field(3).component(4);
        let name = facility.subcomponent(1).text()?;

        let mut location = Location::new();
        location.id = Some(format!("location-{}", slug(name)));
        location.name = Some(name.to_string());
        location.mode = Some("instance".to_string());
        if let Some(id_value) = facility.subcomponent(2).text() {
            location.identifier = Some(vec![Identifier {
                value: Some(id_value.to_string()),
                ..Default::default()
            }]);
        }
        Some(location)
    }
}
