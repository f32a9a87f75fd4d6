//! Patient extraction from PID (and PD1)

use crate::converters::name::extract_names;
use crate::error::{ConversionResult, ExtractError};
use crate::identifier::{
    classify, passthrough_system, IdentifierCandidate, IdentifierKind, OID_INS_NIR, OID_IPP,
    SYSTEM_UNKNOWN,
};
use crate::normalize::{normalize_phone, parse_hl7_date};
use crate::resources::{
    push_extension_once, Address, CodeableConcept, ContactPoint, Extension, Identifier, Patient,
    Reference,
};
use fr7_core::{FieldValue, Message, Segment};
use fr7_terminology::{
    catalogue, urn_oid, FR_EXT_COMMUNE_COG_INSEE, FR_EXT_INSI_STATUS, FR_EXT_TELECOM_MOBILITE,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

static CITY_WITH_INSEE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*\((\d{5})\)\s*$").expect("valid regex"));

const MARITAL_CODES: [&str; 12] = ["A", "D", "M", "S", "W", "P", "I", "B", "C", "G", "O", "U"];

/// Converter for the PID (+PD1) segment pair
pub struct PatientConverter;

impl PatientConverter {
    /// Extract the Patient resource
    ///
    /// `stamp` seeds the synthesized IPP value and the patient id when PID-3
    /// carried no usable permanent id; `generate_test_ins` derives a test
    /// NIR when no INS was present (explicit opt-in only).
    pub fn convert(
        message: &Message,
        stamp: &str,
        generate_test_ins: bool,
    ) -> ConversionResult<Option<Patient>> {
        let Some(pid) = message.first("PID") else {
            debug!("no PID segment, skipping Patient");
            return Ok(None);
        };

        let mut patient = Patient::new();

        // PID-3: identifier list
        let (identifiers, ipp_value) =
            Self::convert_identifiers(pid.field(3), stamp, generate_test_ins, &Self::test_ins_seed(pid));
        patient.identifier = Some(identifiers);

        // PID-5: names, via the French re-parser
        let names = extract_names(pid.field(5));
        if !names.is_empty() {
            patient.name = Some(names);
        }

        // PID-7: birth date
        if let Some(dob) = pid.field_str(7) {
            match parse_hl7_date(dob) {
                Ok(date) => patient.birth_date = Some(date),
                Err(err) => warn!(%err, "dropping unparseable PID-7"),
            }
        }

        // PID-8: administrative gender
        if let Some(sex) = pid.field_str(8) {
            patient.gender = Some(Self::convert_gender(sex).to_string());
        }

        // PID-11: addresses
        let addresses = Self::convert_addresses(pid.field(11));
        if !addresses.is_empty() {
            patient.address = Some(addresses);
        }

        // PID-13 home, PID-14 work: telecoms
        let telecoms = Self::convert_telecoms(pid.field(13), pid.field(14));
        if !telecoms.is_empty() {
            patient.telecom = Some(telecoms);
        }

        // PID-16: marital status
        if let Some(marital) = pid.field_str(16) {
            if MARITAL_CODES.contains(&marital) {
                patient.marital_status = Some(CodeableConcept::coding(
                    "http://terminology.hl7.org/CodeSystem/v3-MaritalStatus",
                    marital,
                    Some(&catalogue().code_display("maritalStatus", marital)),
                ));
            }
        }

        // PD1 present and an INS on board: surface the INSi status on the
        // patient itself as well
        let has_ins = Self::has_ins(&patient);
        if message.first("PD1").is_some() && has_ins {
            push_extension_once(
                &mut patient.extension,
                Extension::code(FR_EXT_INSI_STATUS, "VALI"),
            );
        }

        let id_seed = ipp_value.unwrap_or_else(|| stamp.to_string());
        patient.id = Some(format!("patient-{}", id_seed));

        Ok(Some(patient))
    }

    fn has_ins(patient: &Patient) -> bool {
        let ins_system = urn_oid(OID_INS_NIR);
        patient
            .identifier
            .iter()
            .flatten()
            .any(|id| id.system.as_deref() == Some(ins_system.as_str()))
    }

    /// PID-3 → classified identifier list plus the retained IPP value
    fn convert_identifiers(
        pid3: &FieldValue,
        stamp: &str,
        generate_test_ins: bool,
        test_seed: &TestInsSeed,
    ) -> (Vec<Identifier>, Option<String>) {
        let mut ins: Option<(IdentifierKind, String)> = None;
        let mut ipp: Option<String> = None;
        let mut others: Vec<Identifier> = Vec::new();

        for rep in pid3.repetitions() {
            let Some(value) = rep.component_str(1) else {
                continue;
            };
            let authority = rep.component(4);
            let candidate = IdentifierCandidate {
                value: value.to_string(),
                authority_name: authority.subcomponent(1).text().unwrap_or("").to_string(),
                authority_oid: authority.subcomponent(2).text().unwrap_or("").to_string(),
                type_code: rep.component_str(5).unwrap_or("").to_string(),
            };

            match classify(&candidate) {
                kind @ (IdentifierKind::InsNir | IdentifierKind::InsC) => {
                    // keep exactly one INS, NIR wins over C
                    let replace = match &ins {
                        None => true,
                        Some((IdentifierKind::InsC, _)) => kind == IdentifierKind::InsNir,
                        Some(_) => false,
                    };
                    if replace {
                        ins = Some((kind, candidate.value));
                    }
                }
                IdentifierKind::Ipp => {
                    if ipp.is_none() {
                        ipp = Some(candidate.value);
                    }
                }
                IdentifierKind::Passport => {
                    others.push(
                        Identifier::with_system(
                            passthrough_system(&candidate.authority_oid),
                            candidate.value,
                        )
                        .typed("PPN", None),
                    );
                }
                IdentifierKind::Other => {
                    let system = passthrough_system(&candidate.authority_oid);
                    if system == SYSTEM_UNKNOWN {
                        let err =
                            ExtractError::UnknownIdentifierAuthority(candidate.authority_name.clone());
                        debug!(%err, "passing identifier through without a system");
                    }
                    let mut identifier = Identifier::with_system(system, candidate.value);
                    if !candidate.type_code.is_empty() {
                        identifier = identifier.typed(&candidate.type_code, None);
                    }
                    others.push(identifier);
                }
            }
        }

        if ins.is_none() && generate_test_ins {
            ins = Some((IdentifierKind::InsNir, test_seed.derive()));
        }

        let mut identifiers = Vec::new();
        if let Some((_, value)) = ins {
            identifiers.push(Self::ins_identifier(&value));
        }
        // at most one IPP, synthesized from the stamp when absent
        identifiers.push(Self::ipp_identifier(ipp.as_deref().unwrap_or(stamp)));
        identifiers.extend(others);

        // unique by (system, value)
        let mut seen: Vec<(Option<String>, Option<String>)> = Vec::new();
        identifiers.retain(|id| {
            let key = (id.system.clone(), id.value.clone());
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });

        (identifiers, ipp)
    }

    /// The canonical INS identifier of I-ID-1
    fn ins_identifier(value: &str) -> Identifier {
        let mut identifier = Identifier::with_system(urn_oid(OID_INS_NIR), value)
            .typed("NI", Some("Identifiant national de santé"));
        identifier.use_ = Some("official".to_string());
        identifier.assigner = Some(Box::new(Reference::display_only("INSEE")));
        identifier.extension = Some(vec![Extension::code(FR_EXT_INSI_STATUS, "VALI")]);
        identifier
    }

    fn ipp_identifier(value: &str) -> Identifier {
        let mut identifier = Identifier::with_system(urn_oid(OID_IPP), value)
            .typed("PI", Some("Identifiant permanent du patient"));
        identifier.use_ = Some("usual".to_string());
        identifier
    }

    fn test_ins_seed(pid: &Segment) -> TestInsSeed {
        TestInsSeed {
            gender: pid.field_str(8).unwrap_or("").to_string(),
            birth: pid.field_str(7).unwrap_or("").to_string(),
        }
    }

    /// PID-8 → FHIR administrative gender
    fn convert_gender(sex: &str) -> &'static str {
        match sex {
            "M" => "male",
            "F" => "female",
            "O" | "A" => "other",
            _ => "unknown",
        }
    }

    /// PID-11 repetitions → addresses, with the INSEE commune suffix split
    /// out of the city
    fn convert_addresses(pid11: &FieldValue) -> Vec<Address> {
        let mut addresses = Vec::new();

        for rep in pid11.repetitions() {
            if rep.is_empty() {
                continue;
            }
            let mut address = Address::default();

            let lines: Vec<String> = [rep.component_str(1), rep.component_str(2)]
                .into_iter()
                .flatten()
                .map(str::to_string)
                .collect();
            if !lines.is_empty() {
                address.line = Some(lines);
            }

            if let Some(city) = rep.component_str(3) {
                match CITY_WITH_INSEE.captures(city) {
                    Some(caps) => {
                        address.city = Some(caps[1].to_string());
                        address.extension = Some(vec![Extension::string(
                            FR_EXT_COMMUNE_COG_INSEE,
                            &caps[2],
                        )]);
                    }
                    None => address.city = Some(city.to_string()),
                }
            }
            address.state = rep.component_str(4).map(str::to_string);
            address.postal_code = rep.component_str(5).map(str::to_string);
            address.country = rep.component_str(6).map(str::to_string);

            if let Some(addr_type) = rep.component_str(7) {
                let (use_, type_) = Self::convert_address_type(addr_type);
                address.use_ = use_.map(str::to_string);
                address.type_ = type_.map(str::to_string);
            }

            addresses.push(address);
        }

        addresses
    }

    fn convert_address_type(code: &str) -> (Option<&'static str>, Option<&'static str>) {
        match code {
            "H" => (Some("home"), Some("physical")),
            "B" => (Some("work"), Some("both")),
            "C" => (Some("temp"), Some("postal")),
            "BA" => (Some("old"), Some("postal")),
            "M" => (Some("both"), Some("postal")),
            "P" => (Some("both"), Some("physical")),
            _ => (None, None),
        }
    }

    /// PID-13/PID-14 repetitions → telecoms
    ///
    /// The dialect puts the number in component 1 or 12; emails surface from
    /// any `@`-carrying atom in the tree. French mobiles flip the use on
    /// personal numbers and mark business numbers with the mobility
    /// extension.
    fn convert_telecoms(pid13: &FieldValue, pid14: &FieldValue) -> Vec<ContactPoint> {
        let mut telecoms: Vec<ContactPoint> = Vec::new();

        for (field, is_home) in [(pid13, true), (pid14, false)] {
            for rep in field.repetitions() {
                if rep.is_empty() {
                    continue;
                }

                let use_code = rep.component_str(2).unwrap_or("");
                let equipment = rep.component_str(3).unwrap_or("");
                let default_use = if is_home { "home" } else { "work" };
                let use_ = Self::convert_telecom_use(use_code).unwrap_or(default_use);

                // every @-carrying atom is an email address
                for atom in rep.atoms() {
                    if atom.contains('@') {
                        telecoms.push(ContactPoint {
                            system: Some("email".to_string()),
                            value: Some(atom.to_string()),
                            use_: Some(use_.to_string()),
                            extension: None,
                        });
                    }
                }

                let number = rep
                    .component_str(1)
                    .or_else(|| rep.component_str(12))
                    .filter(|n| !n.contains('@'));
                let Some(number) = number else { continue };

                let system = Self::convert_telecom_equipment(equipment);
                if system == "email" || system == "url" {
                    // the address already surfaced through the atom scan
                    continue;
                }

                let phone = match normalize_phone(number) {
                    Ok(phone) => phone,
                    Err(err) => {
                        warn!(%err, "dropping telecom");
                        continue;
                    }
                };

                let mut contact = ContactPoint {
                    system: Some(system.to_string()),
                    value: Some(phone.value),
                    use_: Some(use_.to_string()),
                    extension: None,
                };
                if phone.is_mobile {
                    if is_home {
                        contact.use_ = Some("mobile".to_string());
                    } else {
                        contact.extension =
                            Some(vec![Extension::boolean(FR_EXT_TELECOM_MOBILITE, true)]);
                    }
                }
                telecoms.push(contact);
            }
        }

        // unique by (system, use, value)
        let mut seen: Vec<(Option<String>, Option<String>, Option<String>)> = Vec::new();
        telecoms.retain(|t| {
            let key = (t.system.clone(), t.use_.clone(), t.value.clone());
            if seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });

        telecoms
    }

    fn convert_telecom_use(code: &str) -> Option<&'static str> {
        match code {
            "PRN" | "NET" | "VHN" => Some("home"),
            "WPN" | "ORN" | "BPN" => Some("work"),
            "EMR" => Some("mobile"),
            "ASN" => Some("temp"),
            _ => None,
        }
    }

    fn convert_telecom_equipment(code: &str) -> &'static str {
        match code {
            "PH" | "CP" => "phone",
            "FX" => "fax",
            "BP" => "pager",
            "Internet" | "NET" | "X.400" => "email",
            "URI" => "url",
            _ => "phone",
        }
    }
}

/// Seed for the deterministic test NIR
struct TestInsSeed {
    gender: String,
    birth: String,
}

impl TestInsSeed {
    /// Derive a syntactically-shaped 15-digit test NIR: sex digit, birth
    /// year and month, a fixed test area, and the standard mod-97 key
    fn derive(&self) -> String {
        let sex = match self.gender.as_str() {
            "M" => "1",
            "F" => "2",
            _ => "2",
        };
        let yy = self.birth.get(2..4).unwrap_or("00");
        let mm = self.birth.get(4..6).unwrap_or("01");
        let body = format!("{}{}{}63220030", sex, yy, mm);
        let key = 97 - body.parse::<u64>().unwrap_or(0) % 97;
        format!("{}{:02}", body, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fr7_parser::parse_message;

    fn pid_message(pid: &str) -> Message {
        parse_message(&format!(
            "MSH|^~\\&|S|F|R|F|20230815131519||ADT^A01|1|P|2.5\r{}",
            pid
        ))
        .unwrap()
    }

    fn convert(pid: &str) -> Patient {
        PatientConverter::convert(&pid_message(pid), "stamp42", false)
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_minimal_patient() {
        let patient = convert("PID|1||123^^^HOSP^PI||DUPONT^JEAN||19800101|M");
        assert_eq!(patient.id.as_deref(), Some("patient-123"));
        assert_eq!(patient.gender.as_deref(), Some("male"));
        assert_eq!(patient.birth_date.as_deref(), Some("1980-01-01"));

        let ids = patient.identifier.as_ref().unwrap();
        assert_eq!(ids.len(), 1);
        assert_eq!(ids[0].system.as_deref(), Some("urn:oid:1.2.250.1.71.4.2.7"));
        assert_eq!(ids[0].value.as_deref(), Some("123"));
        assert_eq!(ids[0].type_.as_ref().unwrap().first_code(), Some("PI"));
    }

    #[test]
    fn test_ins_nir_identifier() {
        let patient = convert(
            "PID|1||248098060602525^^^ASIP-SANTE-INS-NIR&1.2.250.1.213.1.4.8&ISO^INS~123^^^HOSP^PI||SECLET^MARYSE||19480806|F",
        );
        let ids = patient.identifier.as_ref().unwrap();

        let ins: Vec<_> = ids
            .iter()
            .filter(|id| id.system.as_deref() == Some("urn:oid:1.2.250.1.213.1.4.8"))
            .collect();
        assert_eq!(ins.len(), 1);
        assert_eq!(ins[0].type_.as_ref().unwrap().first_code(), Some("NI"));
        assert_eq!(
            ins[0].assigner.as_ref().unwrap().display.as_deref(),
            Some("INSEE")
        );
        let ext = ins[0].extension.as_ref().unwrap();
        assert_eq!(ext[0].url, FR_EXT_INSI_STATUS);
        assert_eq!(ext[0].value_code.as_deref(), Some("VALI"));
    }

    #[test]
    fn test_nir_preferred_over_ins_c() {
        let patient = convert(
            "PID|1||1^^^ASIP-SANTE-INS-C&1.2.250.1.213.1.4.2&ISO^INS~2^^^ASIP-SANTE-INS-NIR&1.2.250.1.213.1.4.8&ISO^INS",
        );
        let ids = patient.identifier.as_ref().unwrap();
        let ins: Vec<_> = ids
            .iter()
            .filter(|id| id.system.as_deref() == Some("urn:oid:1.2.250.1.213.1.4.8"))
            .collect();
        assert_eq!(ins.len(), 1);
        assert_eq!(ins[0].value.as_deref(), Some("2"));
    }

    #[test]
    fn test_ipp_synthesized_when_missing() {
        let patient = convert(
            "PID|1||248098060602525^^^ASIP-SANTE-INS-NIR&1.2.250.1.213.1.4.8&ISO^INS||SECLET^MARYSE",
        );
        let ids = patient.identifier.as_ref().unwrap();
        let ipp: Vec<_> = ids
            .iter()
            .filter(|id| id.type_.as_ref().and_then(|t| t.first_code()) == Some("PI"))
            .collect();
        assert_eq!(ipp.len(), 1);
        assert_eq!(ipp[0].value.as_deref(), Some("stamp42"));
        assert_eq!(patient.id.as_deref(), Some("patient-stamp42"));
    }

    #[test]
    fn test_gender_table() {
        for (code, expected) in [("M", "male"), ("F", "female"), ("O", "other"), ("A", "other"), ("U", "unknown"), ("X", "unknown")] {
            assert_eq!(PatientConverter::convert_gender(code), expected);
        }
    }

    #[test]
    fn test_invalid_birth_date_dropped() {
        let patient = convert("PID|1||1^^^H^PI||X||20230230|M");
        assert!(patient.birth_date.is_none());
    }

    #[test]
    fn test_marital_status_with_french_display() {
        let patient = convert("PID|1||1^^^H^PI||X||19800101|M||||||||M");
        let marital = patient.marital_status.unwrap();
        let coding = &marital.coding.unwrap()[0];
        assert_eq!(coding.code.as_deref(), Some("M"));
        assert_eq!(coding.display.as_deref(), Some("Marié(e)"));
    }

    #[test]
    fn test_mobile_and_email_telecoms() {
        let patient = convert(
            "PID|1||1^^^H^PI||X||19800101|F|||||^PRN^PH^^^^^^^^^0608987212~^NET^Internet^MARYSE.SECLET@WANADOO.FR",
        );
        let telecom = patient.telecom.as_ref().unwrap();

        let phone = telecom.iter().find(|t| t.system.as_deref() == Some("phone")).unwrap();
        assert_eq!(phone.value.as_deref(), Some("0608987212"));
        assert_eq!(phone.use_.as_deref(), Some("mobile"));

        let email = telecom.iter().find(|t| t.system.as_deref() == Some("email")).unwrap();
        assert_eq!(email.value.as_deref(), Some("MARYSE.SECLET@WANADOO.FR"));
        assert_eq!(email.use_.as_deref(), Some("home"));
    }

    #[test]
    fn test_work_mobile_gets_mobility_extension() {
        let patient = convert("PID|1||1^^^H^PI||X||19800101|F||||||0708112233^WPN^PH");
        let telecom = patient.telecom.as_ref().unwrap();
        assert_eq!(telecom[0].use_.as_deref(), Some("work"));
        let ext = telecom[0].extension.as_ref().unwrap();
        assert_eq!(ext[0].url, FR_EXT_TELECOM_MOBILITE);
        assert_eq!(ext[0].value_boolean, Some(true));
    }

    #[test]
    fn test_telecom_dedup() {
        let patient = convert("PID|1||1^^^H^PI||X||19800101|F|||||0388112233^PRN^PH~0388112233^PRN^PH");
        assert_eq!(patient.telecom.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_address_with_insee_commune() {
        let patient = convert(
            "PID|1||1^^^H^PI||X||19800101|F|||12 RUE DE LA PAIX^BAT A^PARIS (75101)^^75001^FRA^H",
        );
        let address = &patient.address.as_ref().unwrap()[0];
        assert_eq!(address.city.as_deref(), Some("PARIS"));
        assert_eq!(address.use_.as_deref(), Some("home"));
        assert_eq!(address.type_.as_deref(), Some("physical"));
        assert_eq!(
            address.line.as_ref().unwrap(),
            &["12 RUE DE LA PAIX", "BAT A"]
        );
        let ext = address.extension.as_ref().unwrap();
        assert_eq!(ext[0].url, FR_EXT_COMMUNE_COG_INSEE);
        assert_eq!(ext[0].value_string.as_deref(), Some("75101"));
    }

    #[test]
    fn test_pd1_adds_insi_status_on_patient() {
        let message = parse_message(
            "MSH|^~\\&|S|F|R|F|20230815131519||ADT^A01|1|P|2.5\rPID|1||248098060602525^^^ASIP-SANTE-INS-NIR&1.2.250.1.213.1.4.8&ISO^INS||SECLET^MARYSE\rPD1|||ETAB",
        )
        .unwrap();
        let patient = PatientConverter::convert(&message, "s", false).unwrap().unwrap();
        let ext = patient.extension.as_ref().unwrap();
        assert_eq!(ext.len(), 1);
        assert_eq!(ext[0].url, FR_EXT_INSI_STATUS);
    }

    #[test]
    fn test_generate_test_ins_opt_in() {
        let message = pid_message("PID|1||123^^^HOSP^PI||DUPONT^JEAN||19800101|M");
        let patient = PatientConverter::convert(&message, "s", true).unwrap().unwrap();
        let ids = patient.identifier.as_ref().unwrap();
        let ins = ids
            .iter()
            .find(|id| id.system.as_deref() == Some("urn:oid:1.2.250.1.213.1.4.8"))
            .unwrap();
        let value = ins.value.as_ref().unwrap();
        assert_eq!(value.len(), 15);
        assert!(value.starts_with("180"));
        assert!(value.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_no_pid_yields_none() {
        let message = parse_message("MSH|^~\\&|S|F|R|F|20230815131519||ADT^A01|1|P|2.5").unwrap();
        assert!(PatientConverter::convert(&message, "s", false).unwrap().is_none());
    }
}
