//! Coverage extraction from IN1 (and IN2)
//!
//! French coverage lines distinguish the mandatory scheme (AMO), the
//! complementary insurer (AMC), long-duration conditions (ALD) and
//! work-accident coverage (ATMP). The plan label in IN1-2 is free text, so
//! classification is pattern-based.

use crate::converters::organization::slug;
use crate::error::ConversionResult;
use crate::identifier::OID_INS_NIR;
use crate::normalize::parse_hl7_date;
use crate::resources::{
    CodeableConcept, Coverage, Extension, Identifier, Organization, Period, Reference,
};
use fr7_core::{Message, Segment};
use fr7_terminology::{urn_oid, FR_EXT_COVERAGE_INSURED_ID, FR_SYS_TYPE_COUVERTURE};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

static AMC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"MUTUEL|COMPLEMENT").expect("valid regex"));
static ALD_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"ALD|100%").expect("valid regex"));
static ATMP_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^AT|MP").expect("valid regex"));

/// One IN1 segment's output: the Coverage plus its payor side-resource
#[derive(Debug, Clone)]
pub struct CoverageExtraction {
    pub coverage: Coverage,
    pub payor: Option<Organization>,
}

/// Converter for IN1 (+IN2) segments
pub struct CoverageConverter;

impl CoverageConverter {
    /// Extract every IN1 into a Coverage
    ///
    /// `broad_period_scan` widens the period-end recovery from IN1 positions
    /// {13, 12, 14} to the first `20…` 8-digit value in the first 20 fields;
    /// the wide scan is a known hazard and stays opt-in.
    pub fn convert(
        message: &Message,
        patient_full_url: &str,
        broad_period_scan: bool,
    ) -> ConversionResult<Vec<CoverageExtraction>> {
        let mut extractions = Vec::new();

        for in1 in message.segments_of("IN1") {
            let mut coverage = Coverage::new(Reference::to_full_url(patient_full_url));
            coverage.id = Some(format!("coverage-{}", Uuid::new_v4()));

            // IN1-2: plan label → coverage type
            let label = in1.field(2).atoms().join(" ").to_uppercase();
            let (code, display) = Self::classify_type(&label);
            coverage.type_ = Some(CodeableConcept::coding(
                FR_SYS_TYPE_COUVERTURE,
                code,
                Some(display),
            ));

            // IN1-4: payor organization
            let payor = Self::convert_payor(in1);
            if let Some(payor) = &payor {
                coverage.payor = Some(vec![Reference::to_full_url(format!(
                    "urn:uuid:{}",
                    payor.id.as_deref().unwrap_or_default()
                ))]);
            }

            // period end: IN1-13, then IN1-12 and IN1-14, then the optional
            // wide scan
            if let Some(end) = Self::period_end(in1, broad_period_scan) {
                coverage.period = Some(Period {
                    start: None,
                    end: Some(end),
                });
            }

            // IN1-16: subscriber id
            coverage.subscriber_id = in1.field(16).component_str(1).map(str::to_string);

            // IN1-36 (or the trailing field): 15-digit insured id
            if let Some(insured_id) = Self::insured_id(in1) {
                coverage.extension = Some(vec![Extension::identifier(
                    FR_EXT_COVERAGE_INSURED_ID,
                    Identifier::with_system(urn_oid(OID_INS_NIR), insured_id),
                )]);
            }

            extractions.push(CoverageExtraction { coverage, payor });
        }

        Ok(extractions)
    }

    /// IN1-2 label → French coverage type
    fn classify_type(label: &str) -> (&'static str, &'static str) {
        if AMC_PATTERN.is_match(label) {
            ("AMC", "Assurance maladie complémentaire")
        } else if ALD_PATTERN.is_match(label) {
            ("ALD", "Affection longue durée")
        } else if ATMP_PATTERN.is_match(label) {
            ("ATMP", "Accident du travail / Maladie professionnelle")
        } else {
            ("AMO", "Assurance maladie obligatoire")
        }
    }

    /// IN1-4 → payor Organization with the `ins` type code
    fn convert_payor(in1: &Segment) -> Option<Organization> {
        let field = in1.field(4);
        let name = field.component_str(1)?;

        let mut organization = Organization::new();
        organization.type_ = Some(vec![CodeableConcept::coding(
            "http://terminology.hl7.org/CodeSystem/organization-type",
            "ins",
            Some("Insurance Company"),
        )]);

        if name.chars().all(|c| c.is_ascii_digit()) {
            organization.id = Some(format!("organization-payor-{}", name));
            organization.name = Some("Organisme payeur".to_string());
            organization.identifier = Some(vec![Identifier {
                value: Some(name.to_string()),
                ..Default::default()
            }]);
        } else {
            organization.id = Some(format!("organization-{}", slug(name)));
            organization.name = Some(name.to_string());
            if let Some(id_value) = field.component_str(2) {
                organization.identifier = Some(vec![Identifier {
                    value: Some(id_value.to_string()),
                    ..Default::default()
                }]);
            }
        }

        Some(organization)
    }

    fn period_end(in1: &Segment, broad_scan: bool) -> Option<String> {
        for position in [13, 12, 14] {
            if let Some(date) = in1
                .field_str(position)
                .and_then(|value| parse_hl7_date(value).ok())
            {
                return Some(date);
            }
        }

        if broad_scan {
            for position in 1..=20 {
                let candidate = in1.field(position).atoms().into_iter().find(|atom| {
                    atom.len() == 8
                        && atom.starts_with("20")
                        && atom.chars().all(|c| c.is_ascii_digit())
                });
                if let Some(date) = candidate.and_then(|value| parse_hl7_date(value).ok()) {
                    return Some(date);
                }
            }
        }

        None
    }

    /// A 15-digit value in IN1-36, or in the last populated field
    fn insured_id(in1: &Segment) -> Option<String> {
        let fifteen_digits =
            |value: &str| value.len() == 15 && value.chars().all(|c| c.is_ascii_digit());

        if let Some(value) = in1.field_str(36).filter(|v| fifteen_digits(v)) {
            return Some(value.to_string());
        }
        in1.fields
            .iter()
            .rev()
            .find_map(|field| field.text())
            .filter(|v| fifteen_digits(v))
            .map(str::to_string)
    }
}
