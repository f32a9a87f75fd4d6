//! Conversion engine: HL7 text in, transaction Bundle out
//!
//! One conversion is pure CPU and runs to completion in caller order:
//! parse, extract segment by segment, compose. Extractor failures are
//! recovered (the bundle composes without the resource, a warning is
//! traced); only an unparseable header aborts. The clock is injectable so
//! tests produce byte-stable bundles.

use crate::composer::{BundleComposer, ComposerInput};
use crate::converters::coverage::CoverageConverter;
use crate::converters::encounter::EncounterConverter;
use crate::converters::movement::MovementConverter;
use crate::converters::organization::OrganizationConverter;
use crate::converters::patient::PatientConverter;
use crate::converters::practitioner::PractitionerConverter;
use crate::converters::related_person::RelatedPersonConverter;
use crate::error::ConversionResult;
use crate::resources::Bundle;
use chrono::{DateTime, SecondsFormat, Utc};
use fr7_parser::parse_message;
use tracing::{debug, info, warn};

/// Wall-clock source; the engine's only non-determinism
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Caller-selectable conversion behavior
///
/// Both flags default to off; neither is ever read from the environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Derive a test INS when PID-3 carried none
    pub generate_test_ins: bool,
    /// Widen the Coverage period-end recovery beyond IN1 {13, 12, 14}
    pub broad_coverage_period_scan: bool,
}

/// The conversion façade
pub struct ConversionEngine {
    clock: Box<dyn Clock>,
}

impl ConversionEngine {
    /// Engine on the system clock
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// Engine on a caller-provided clock
    pub fn with_clock(clock: Box<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Convert one message
    pub fn convert(&self, raw: &str, options: ConvertOptions) -> ConversionResult<Bundle> {
        let message = parse_message(raw)?;
        if let Some((msg_type, trigger)) = message.message_type() {
            info!(%msg_type, %trigger, control_id = ?message.control_id(), "converting message");
        }

        let now = self.clock.now();
        let stamp = now.timestamp_millis().to_string();
        let timestamp = now.to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut input = ComposerInput::default();

        // fixed extraction order; each failure is recovered and traced
        input.patient =
            match PatientConverter::convert(&message, &stamp, options.generate_test_ins) {
                Ok(patient) => patient,
                Err(err) => {
                    warn!(%err, "patient extraction failed, composing without Patient");
                    None
                }
            };
        let patient_full_url = input
            .patient
            .as_ref()
            .and_then(|p| p.id.as_deref())
            .map(|id| format!("urn:uuid:{}", id));

        input.organizations = OrganizationConverter::convert(&message);

        input.encounter =
            match EncounterConverter::convert(&message, patient_full_url.as_deref(), &stamp) {
                Ok(extraction) => extraction,
                Err(err) => {
                    warn!(%err, "encounter extraction failed, composing without Encounter");
                    None
                }
            };
        let encounter_full_url = input
            .encounter
            .as_ref()
            .and_then(|e| e.main.id.as_deref())
            .map(|id| format!("urn:uuid:{}", id));

        input.practitioners =
            match PractitionerConverter::convert(&message, encounter_full_url.as_deref()) {
                Ok(extractions) => extractions,
                Err(err) => {
                    warn!(%err, "practitioner extraction failed");
                    Vec::new()
                }
            };

        if let Some(patient_url) = patient_full_url.as_deref() {
            input.related_persons = match RelatedPersonConverter::convert(&message, patient_url) {
                Ok(persons) => persons,
                Err(err) => {
                    warn!(%err, "related person extraction failed");
                    Vec::new()
                }
            };
            input.coverages = match CoverageConverter::convert(
                &message,
                patient_url,
                options.broad_coverage_period_scan,
            ) {
                Ok(extractions) => extractions,
                Err(err) => {
                    warn!(%err, "coverage extraction failed");
                    Vec::new()
                }
            };
        } else if message.first("NK1").is_some() || message.first("IN1").is_some() {
            debug!("no patient on board, skipping NK1/IN1 extraction");
        }

        input.plans = MovementConverter::convert(&message);

        let bundle = BundleComposer::compose(input, &format!("bundle-{}", stamp), &timestamp);
        info!(bundle_id = %bundle.id, entries = bundle.entry.len(), "conversion finished");
        Ok(bundle)
    }
}

impl Default for ConversionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// One-call conversion with default options and the system clock
pub fn convert(raw: &str) -> ConversionResult<Bundle> {
    ConversionEngine::new().convert(raw, ConvertOptions::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    /// Frozen clock for byte-stable bundles
    pub struct FixedClock(pub DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn fixed_engine() -> ConversionEngine {
        let instant = Utc.with_ymd_and_hms(2023, 8, 15, 13, 15, 19).unwrap();
        ConversionEngine::with_clock(Box::new(FixedClock(instant)))
    }

    const MINIMAL: &str =
        "MSH|^~\\&|S|F|R|F|20230815131519||ADT^A01|1|P|2.5\rPID|1||123^^^HOSP^PI||DUPONT^JEAN||19800101|M";

    #[test]
    fn test_bundle_metadata_comes_from_the_clock() {
        let bundle = fixed_engine()
            .convert(MINIMAL, ConvertOptions::default())
            .unwrap();
        assert_eq!(bundle.timestamp, "2023-08-15T13:15:19Z");
        assert!(bundle.id.starts_with("bundle-1692105319"));
    }

    #[test]
    fn test_conversion_is_reproducible_under_a_fixed_clock() {
        let options = ConvertOptions::default();
        let a = fixed_engine().convert(MINIMAL, options).unwrap();
        let b = fixed_engine().convert(MINIMAL, options).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_header_errors_are_fatal() {
        assert!(convert("PID|1").is_err());
        assert!(convert("").is_err());
    }

    #[test]
    fn test_message_without_pid_still_composes() {
        let bundle = fixed_engine()
            .convert(
                "MSH|^~\\&|S|F|R|F|20230815131519||ADT^A01|1|P|2.5\rPV1|1|I",
                ConvertOptions::default(),
            )
            .unwrap();
        // Encounter plus the MSH organization; no Patient, no subject
        assert!(bundle.first_of_type("Patient").is_none());
        assert!(bundle.first_of_type("Encounter").is_some());
    }
}
