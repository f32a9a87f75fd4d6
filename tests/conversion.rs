//! End-to-end conversion scenarios
//!
//! Each scenario feeds one raw ADT message through the full pipeline and
//! checks the emitted transaction Bundle, plus the cross-cutting invariants
//! every bundle must satisfy (distinct fullUrls, resolvable references,
//! single NI identifier, telecom uniqueness).

use chrono::{DateTime, TimeZone, Utc};
use fr7::{Clock, ConversionEngine, ConvertOptions, Resource};
use serde_json::Value;

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn engine() -> ConversionEngine {
    let instant = Utc.with_ymd_and_hms(2023, 8, 15, 13, 15, 19).unwrap();
    ConversionEngine::with_clock(Box::new(FixedClock(instant)))
}

fn convert(raw: &str) -> fr7::Bundle {
    engine().convert(raw, ConvertOptions::default()).unwrap()
}

/// Build a segment with values at exact 1-based positions
fn segment(id: &str, values: &[(usize, &str)]) -> String {
    let max = values.iter().map(|(i, _)| *i).max().unwrap_or(1);
    let mut fields = vec![String::new(); max];
    for (index, value) in values {
        fields[index - 1] = value.to_string();
    }
    format!("{}|{}", id, fields.join("|"))
}

const MSH: &str = "MSH|^~\\&|S|F|R|F|20230815131519||ADT^A01|1|P|2.5";

#[test]
fn s1_minimal_adt_a01() {
    let bundle = convert(
        "MSH|^~\\&|S|F|R|F|20230815131519||ADT^A01|1|P|2.5\rPID|1||123^^^HOSP^PI||DUPONT^JEAN||19800101|M\r",
    );

    assert_eq!(bundle.entry.len(), 2);

    let Resource::Patient(patient) = &bundle.entry[0].resource else {
        panic!("first entry must be the Patient");
    };
    let identifier = &patient.identifier.as_ref().unwrap()[0];
    assert_eq!(identifier.system.as_deref(), Some("urn:oid:1.2.250.1.71.4.2.7"));
    assert_eq!(identifier.value.as_deref(), Some("123"));
    assert_eq!(identifier.type_.as_ref().unwrap().first_code(), Some("PI"));

    let name = &patient.name.as_ref().unwrap()[0];
    assert_eq!(name.family.as_deref(), Some("DUPONT"));
    assert_eq!(name.given.as_ref().unwrap(), &["JEAN"]);
    assert_eq!(name.use_.as_deref(), Some("official"));

    assert_eq!(patient.gender.as_deref(), Some("male"));
    assert_eq!(patient.birth_date.as_deref(), Some("1980-01-01"));

    let Resource::Organization(organization) = &bundle.entry[1].resource else {
        panic!("second entry must be the Organization");
    };
    assert_eq!(organization.name.as_deref(), Some("F"));
}

#[test]
fn s2_ins_and_composed_given_names() {
    let bundle = convert(&format!(
        "{}\rPID|1||248098060602525^^^ASIP-SANTE-INS-NIR&1.2.250.1.213.1.4.8&ISO^INS||SECLET^^^^MME^^D~SECLET^MARYSE^MARYSE BERTHE ALICE^^^^L||19480806|F",
        MSH
    ));

    let Resource::Patient(patient) = &bundle.entry[0].resource else {
        panic!("expected patient");
    };

    let ins: Vec<_> = patient
        .identifier
        .as_ref()
        .unwrap()
        .iter()
        .filter(|id| id.system.as_deref() == Some("urn:oid:1.2.250.1.213.1.4.8"))
        .collect();
    assert_eq!(ins.len(), 1);
    assert_eq!(ins[0].type_.as_ref().unwrap().first_code(), Some("NI"));
    let status = &ins[0].extension.as_ref().unwrap()[0];
    assert_eq!(status.value_code.as_deref(), Some("VALI"));

    let officials: Vec<_> = patient
        .name
        .as_ref()
        .unwrap()
        .iter()
        .filter(|n| n.use_.as_deref() == Some("official"))
        .collect();
    assert_eq!(officials.len(), 1);
    assert_eq!(officials[0].family.as_deref(), Some("SECLET"));
    assert_eq!(
        officials[0].given.as_ref().unwrap(),
        &["MARYSE", "BERTHE", "ALICE"]
    );
}

#[test]
fn s3_french_mobile_and_email() {
    let bundle = convert(&format!(
        "{}\rPID|1||1^^^H^PI||SECLET^MARYSE||19480806|F|||||^PRN^PH^^^^^^^^^0608987212~~~^NET^Internet^MARYSE.SECLET@WANADOO.FR",
        MSH
    ));

    let Resource::Patient(patient) = &bundle.entry[0].resource else {
        panic!("expected patient");
    };
    let telecom = patient.telecom.as_ref().unwrap();

    let phone = telecom
        .iter()
        .find(|t| t.system.as_deref() == Some("phone"))
        .unwrap();
    assert_eq!(phone.value.as_deref(), Some("0608987212"));
    assert_eq!(phone.use_.as_deref(), Some("mobile"));

    let email = telecom
        .iter()
        .find(|t| t.system.as_deref() == Some("email"))
        .unwrap();
    assert_eq!(email.value.as_deref(), Some("MARYSE.SECLET@WANADOO.FR"));
    assert_eq!(email.use_.as_deref(), Some("home"));
}

#[test]
fn s4_pv1_admission() {
    let pv1 = segment(
        "PV1",
        &[
            (1, "1"),
            (2, "I"),
            (3, "MED^1001^01"),
            (19, "V100"),
            (44, "20230815131519"),
        ],
    );
    let bundle = convert(&format!("{}\rPID|1||1^^^H^PI||X\r{}", MSH, pv1));

    let entry = bundle.first_of_type("Encounter").unwrap();
    let Resource::Encounter(encounter) = &entry.resource else {
        panic!("expected encounter");
    };

    assert_eq!(encounter.class.as_ref().unwrap().code.as_deref(), Some("IMP"));
    assert_eq!(encounter.status, "in-progress");

    let identifier = &encounter.identifier.as_ref().unwrap()[0];
    assert_eq!(identifier.value.as_deref(), Some("V100"));
    assert_eq!(identifier.type_.as_ref().unwrap().first_code(), Some("VN"));

    assert_eq!(
        encounter.period.as_ref().unwrap().start.as_deref(),
        Some("2023-08-15T13:15:19")
    );
}

#[test]
fn s5_zbe_merge() {
    let bundle = convert(&format!(
        "{}\rPID|1||1^^^H^PI||X\rPV1|1|I\rZBE|MVT001|20230815131519||INSERT|||UF-MED^^^^^^^^4001",
        MSH
    ));

    let entry = bundle.first_of_type("Encounter").unwrap();
    let Resource::Encounter(encounter) = &entry.resource else {
        panic!("expected encounter");
    };

    let extensions = encounter.extension.as_ref().unwrap();
    assert!(extensions
        .iter()
        .any(|e| e.url.ends_with("healthevent-type")));
    let movement_id = extensions
        .iter()
        .find(|e| e.url.ends_with("healthevent-identifier"))
        .unwrap();
    assert_eq!(
        movement_id.value_identifier.as_ref().unwrap().value.as_deref(),
        Some("MVT001")
    );

    assert_eq!(
        encounter.service_provider.as_ref().unwrap().display.as_deref(),
        Some("4001")
    );
    assert_eq!(
        encounter
            .hospitalization
            .as_ref()
            .unwrap()
            .pre_admission_identifier
            .as_ref()
            .unwrap()
            .value
            .as_deref(),
        Some("MVT001")
    );
}

#[test]
fn s6_coverage_end_date_recovery() {
    let in1 = segment("IN1", &[(1, "1"), (2, "CPAM"), (19, "20301231")]);
    let raw = format!("{}\rPID|1||1^^^H^PI||X\r{}", MSH, in1);

    // the wide scan is opt-in
    let options = ConvertOptions {
        broad_coverage_period_scan: true,
        ..Default::default()
    };
    let bundle = engine().convert(&raw, options).unwrap();

    let entry = bundle.first_of_type("Coverage").unwrap();
    let Resource::Coverage(coverage) = &entry.resource else {
        panic!("expected coverage");
    };
    assert_eq!(
        coverage.period.as_ref().unwrap().end.as_deref(),
        Some("2030-12-31")
    );

    // without the opt-in the hazardous position-19 value is ignored
    let constrained = convert(&raw);
    let entry = constrained.first_of_type("Coverage").unwrap();
    let Resource::Coverage(coverage) = &entry.resource else {
        panic!("expected coverage");
    };
    assert!(coverage.period.is_none());
}

/// A message exercising every extractor at once
fn full_message() -> String {
    let pv1 = segment(
        "PV1",
        &[
            (1, "1"),
            (2, "I"),
            (3, "UNIT^2001^01^CHU NORD&750712184&M"),
            (19, "V100"),
            (44, "20230815131519"),
        ],
    );
    let in1_amo = segment("IN1", &[(1, "1"), (2, "CPAM"), (4, "CPAM DE PARIS"), (13, "20301231")]);
    let in1_amc = segment("IN1", &[(1, "2"), (2, "MUTUELLE X"), (4, "MUTUELLE X")]);
    [
        MSH.to_string(),
        "PID|1||248098060602525^^^ASIP-SANTE-INS-NIR&1.2.250.1.213.1.4.8&ISO^INS~123^^^HOSP^PI||SECLET^MARYSE^MARYSE BERTHE ALICE^^^^L||19480806|F|||12 RUE DE LA PAIX^^PARIS (75101)^^75001^FRA^H||^PRN^PH^^^^^^^^^0608987212~^NET^Internet^M.S@WANADOO.FR".to_string(),
        "PD1|||ETAB".to_string(),
        pv1,
        "PV2|||||||||20230820".to_string(),
        "ROL|1|AD|ODRP|10101589354^MARTIN^PAUL^^^^^^RPPS&1.2.250.1.71.4.2.1&ISO^^^^10".to_string(),
        "NK1|1|SECLET^JEAN|SPO".to_string(),
        in1_amo,
        in1_amc,
        "ZBE|MVT001|20230815131519||INSERT|||UF-MED^^^^^^^^4001".to_string(),
        "ZFM|1|6|7".to_string(),
    ]
    .join("\r")
}

#[test]
fn full_bundle_entry_order() {
    let bundle = convert(&full_message());
    let types: Vec<&str> = bundle
        .entries()
        .map(|e| e.resource.resource_type())
        .collect();

    let position = |t: &str| types.iter().position(|x| *x == t).unwrap();
    assert_eq!(position("Patient"), 0);
    assert!(position("Location") < position("Encounter"));
    assert!(position("Encounter") < position("Practitioner"));
    assert!(position("Practitioner") < position("PractitionerRole"));
    assert!(position("PractitionerRole") < position("RelatedPerson"));
    assert!(position("RelatedPerson") < position("Coverage"));

    // payors precede the Coverage lines that reference them
    for (index, entry) in bundle.entry.iter().enumerate() {
        if let Resource::Coverage(coverage) = &entry.resource {
            let payor_url = coverage.payor.as_ref().unwrap()[0]
                .reference
                .as_ref()
                .unwrap();
            let payor_position = bundle
                .entry
                .iter()
                .position(|e| &e.full_url == payor_url)
                .unwrap();
            assert!(payor_position < index);
        }
    }
}

#[test]
fn full_bundle_full_urls_are_pairwise_distinct() {
    let bundle = convert(&full_message());
    let mut urls: Vec<&str> = bundle.entries().map(|e| e.full_url.as_str()).collect();
    let total = urls.len();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), total);
    assert!(total >= 9);
}

#[test]
fn full_bundle_has_exactly_one_ni_identifier() {
    let bundle = convert(&full_message());
    let Resource::Patient(patient) = &bundle.entry[0].resource else {
        panic!("expected patient");
    };
    let ni_count = patient
        .identifier
        .as_ref()
        .unwrap()
        .iter()
        .filter(|id| {
            id.type_
                .as_ref()
                .and_then(|t| t.first_code())
                == Some("NI")
        })
        .count();
    assert_eq!(ni_count, 1);
}

#[test]
fn full_bundle_references_all_resolve() {
    let bundle = convert(&full_message());
    let json = serde_json::to_value(&bundle).unwrap();

    let full_urls: Vec<String> = bundle.entries().map(|e| e.full_url.clone()).collect();
    let mut references = Vec::new();
    collect_references(&json, &mut references);

    assert!(!references.is_empty());
    for reference in references {
        assert!(
            full_urls.contains(&reference),
            "dangling reference {}",
            reference
        );
    }
}

fn collect_references(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if key == "reference" {
                    if let Value::String(reference) = child {
                        out.push(reference.clone());
                    }
                } else {
                    collect_references(child, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        _ => {}
    }
}

#[test]
fn full_bundle_telecoms_are_unique() {
    let bundle = convert(&full_message());
    let Resource::Patient(patient) = &bundle.entry[0].resource else {
        panic!("expected patient");
    };
    let telecom = patient.telecom.as_ref().unwrap();
    let mut keys: Vec<_> = telecom
        .iter()
        .map(|t| (t.system.clone(), t.use_.clone(), t.value.clone()))
        .collect();
    let total = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), total);
}

#[test]
fn expected_exit_extension_mirrors_hospitalization() {
    let bundle = convert(&full_message());
    let entry = bundle.first_of_type("Encounter").unwrap();
    let Resource::Encounter(encounter) = &entry.resource else {
        panic!("expected encounter");
    };

    let extension_value = encounter
        .extension
        .as_ref()
        .unwrap()
        .iter()
        .find(|e| e.url.ends_with("estimated-discharge-date"))
        .and_then(|e| e.value_date_time.clone())
        .unwrap();
    assert_eq!(extension_value, "2023-08-20");
    assert_eq!(
        encounter
            .hospitalization
            .as_ref()
            .unwrap()
            .expected_discharge_date
            .as_deref(),
        Some(extension_value.as_str())
    );
}

#[test]
fn bundle_metadata_and_requests() {
    let bundle = convert(&full_message());
    let json = serde_json::to_value(&bundle).unwrap();

    assert_eq!(json["resourceType"], "Bundle");
    assert_eq!(json["type"], "transaction");
    assert_eq!(json["timestamp"], "2023-08-15T13:15:19Z");
    assert!(json["id"].as_str().unwrap().starts_with("bundle-"));

    for entry in json["entry"].as_array().unwrap() {
        assert_eq!(entry["request"]["method"], "POST");
        assert_eq!(
            entry["request"]["url"],
            entry["resource"]["resourceType"]
        );
        assert!(entry["fullUrl"].as_str().unwrap().starts_with("urn:uuid:"));
    }
}

#[test]
fn datetime_roundtrip_on_the_dtm_domain() {
    use fr7::fhir::normalize::{format_hl7_datetime, parse_hl7_datetime};

    for dtm in ["19800101", "20230815131519"] {
        let iso = parse_hl7_datetime(dtm).unwrap();
        assert_eq!(format_hl7_datetime(&iso), dtm);
    }
}
