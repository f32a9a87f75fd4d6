//! Bundle composition
//!
//! Extractors never touch the entry list; they hand their outputs to the
//! composer, which owns ordering, fullUrl assignment, Z-plan merging into
//! the Encounter, deduplication, and referential integrity. Ordering rules:
//! Patient first, Locations before the Encounter they serve, payors before
//! the Coverage that references them, MSH organizations last.

use crate::converters::coverage::CoverageExtraction;
use crate::converters::encounter::EncounterExtraction;
use crate::converters::movement::ZSegmentPlans;
use crate::converters::practitioner::PractitionerExtraction;
use crate::resources::{
    push_extension_once, Bundle, BundleEntry, BundleRequest, CodeableConcept, Encounter,
    Extension, Identifier, Organization, Patient, Reference, RelatedPerson, Resource,
};
use fr7_terminology::{
    catalogue, FR_EXT_HEALTHEVENT_IDENTIFIER, FR_EXT_HEALTHEVENT_TYPE,
    FR_EXT_MODE_PRISE_EN_CHARGE, FR_SYS_MODE_PRISE_EN_CHARGE,
};
use tracing::{debug, warn};
use uuid::Uuid;

const ACT_CODE_SYSTEM: &str = "http://terminology.hl7.org/CodeSystem/v3-ActCode";

/// Everything one conversion extracted
#[derive(Debug, Clone, Default)]
pub struct ComposerInput {
    pub patient: Option<Patient>,
    pub encounter: Option<EncounterExtraction>,
    pub practitioners: Vec<PractitionerExtraction>,
    pub related_persons: Vec<RelatedPerson>,
    pub coverages: Vec<CoverageExtraction>,
    pub organizations: Vec<Organization>,
    pub plans: ZSegmentPlans,
}

/// Assembles the transaction Bundle from extractor outputs
pub struct BundleComposer;

impl BundleComposer {
    /// Compose the final Bundle
    pub fn compose(mut input: ComposerInput, bundle_id: &str, timestamp: &str) -> Bundle {
        let mut bundle = Bundle::new(bundle_id, timestamp);

        if let Some(patient) = input.patient.as_mut() {
            Self::dedup_patient(patient);
        }

        if let Some(extraction) = input.encounter.as_mut() {
            Self::merge_plans(&mut extraction.main, &input.plans);
        }

        if let Some(patient) = input.patient {
            bundle.entry.push(Self::entry(patient.into()));
        }

        if let Some(extraction) = input.encounter {
            // locations first so the Encounter reference lands on an
            // already-present fullUrl
            for location in extraction.side_locations {
                bundle.entry.push(Self::entry(location.into()));
            }
            bundle.entry.push(Self::entry(extraction.main.into()));
        }

        for extraction in input.practitioners {
            bundle.entry.push(Self::entry(extraction.practitioner.into()));
            if let Some(role) = extraction.role {
                bundle.entry.push(Self::entry(role.into()));
            }
        }

        for person in input.related_persons {
            bundle.entry.push(Self::entry(person.into()));
        }

        for extraction in input.coverages {
            if let Some(payor) = extraction.payor {
                // two coverage lines can share one payor
                let exists = bundle
                    .entry
                    .iter()
                    .any(|e| e.resource.id() == payor.id.as_deref());
                if !exists {
                    bundle.entry.push(Self::entry(payor.into()));
                }
            }
            bundle.entry.push(Self::entry(extraction.coverage.into()));
        }

        for organization in input.organizations {
            let exists = bundle
                .entry
                .iter()
                .any(|e| e.resource.id() == organization.id.as_deref());
            if !exists {
                bundle.entry.push(Self::entry(organization.into()));
            }
        }

        Self::prune_dangling_references(&mut bundle);
        debug!(entries = bundle.entry.len(), "bundle composed");
        bundle
    }

    /// One transaction entry; resources without an id get a fresh uuid
    fn entry(mut resource: Resource) -> BundleEntry {
        let id = match resource.id() {
            Some(id) => id.to_string(),
            None => {
                let generated = format!(
                    "{}-{}",
                    resource.resource_type().to_lowercase(),
                    Uuid::new_v4()
                );
                Self::assign_id(&mut resource, &generated);
                generated
            }
        };
        BundleEntry {
            full_url: format!("urn:uuid:{}", id),
            request: BundleRequest {
                method: "POST".to_string(),
                url: resource.resource_type().to_string(),
            },
            resource,
        }
    }

    fn assign_id(resource: &mut Resource, id: &str) {
        let id = Some(id.to_string());
        match resource {
            Resource::Patient(r) => r.id = id,
            Resource::Encounter(r) => r.id = id,
            Resource::Organization(r) => r.id = id,
            Resource::Practitioner(r) => r.id = id,
            Resource::PractitionerRole(r) => r.id = id,
            Resource::RelatedPerson(r) => r.id = id,
            Resource::Coverage(r) => r.id = id,
            Resource::Location(r) => r.id = id,
        }
    }

    /// Merge the Z-segment plans into the Encounter, in place
    fn merge_plans(encounter: &mut Encounter, plans: &ZSegmentPlans) {
        if let Some(movement) = &plans.movement {
            if let Some(movement_type) = &movement.movement_type {
                let info = catalogue().movement_type_info(movement_type);
                push_extension_once(
                    &mut encounter.extension,
                    Extension::codeable_concept(
                        FR_EXT_HEALTHEVENT_TYPE,
                        CodeableConcept::coding(&info.system, &info.code, Some(&info.display)),
                    ),
                );
            }
            if let Some(movement_id) = &movement.movement_id {
                push_extension_once(
                    &mut encounter.extension,
                    Extension::identifier(
                        FR_EXT_HEALTHEVENT_IDENTIFIER,
                        Identifier {
                            value: Some(movement_id.clone()),
                            ..Default::default()
                        },
                    ),
                );
            }
            if let Some(unit) = &movement.functional_unit {
                encounter.service_provider = Some(Reference::display_only(unit));
            }
            if movement.is_admission() {
                let hospitalization = encounter.hospitalization_mut();
                if let Some(movement_id) = &movement.movement_id {
                    hospitalization.pre_admission_identifier = Some(Identifier {
                        value: Some(movement_id.clone()),
                        ..Default::default()
                    });
                }
                if let Some(unit) = &movement.functional_unit {
                    hospitalization.destination = Some(Reference::display_only(unit));
                }
                if let Some(origin) = &movement.origin_unit {
                    hospitalization.origin = Some(Reference::display_only(origin));
                }
            }
        }

        if let Some(visit) = &plans.visit {
            if let Some(mode) = visit.visit_mode.as_deref() {
                Self::override_class(encounter, mode);
            }
            if let Some(priority) = visit.priority.as_deref() {
                encounter.priority = Some(CodeableConcept::coding(
                    FR_SYS_MODE_PRISE_EN_CHARGE,
                    priority,
                    None,
                ));
            }
        }

        if let Some(stay) = &plans.stay {
            if stay.admission_mode.is_some() || stay.discharge_mode.is_some() {
                let hospitalization = encounter.hospitalization_mut();
                if let Some(mode) = stay.admission_mode.as_deref() {
                    if let Some(system) = catalogue().system_url("modeEntree") {
                        hospitalization.admit_source =
                            Some(CodeableConcept::coding(system, mode, None));
                    }
                }
                if let Some(mode) = stay.discharge_mode.as_deref() {
                    if let Some(system) = catalogue().system_url("modeSortie") {
                        hospitalization.discharge_disposition =
                            Some(CodeableConcept::coding(system, mode, None));
                    }
                }
            }
        }
    }

    /// ZFV visit mode overrides the PV1-2 class and the mode de prise en
    /// charge extension
    fn override_class(encounter: &mut Encounter, mode: &str) {
        let mapped = match mode {
            "H" => Some(("IMP", "inpatient encounter", "HOSPITALT")),
            "U" => Some(("EMER", "emergency", "URMG")),
            "C" | "E" => Some(("AMB", "ambulatory", "CONSULT")),
            _ => None,
        };
        let Some((class_code, class_display, mode_code)) = mapped else {
            warn!(mode, "unknown ZFV visit mode, class kept");
            return;
        };

        encounter.class = Some(crate::resources::Coding::new(
            ACT_CODE_SYSTEM,
            class_code,
            Some(class_display),
        ));

        if let Some(extensions) = encounter.extension.as_mut() {
            extensions.retain(|e| e.url != FR_EXT_MODE_PRISE_EN_CHARGE);
        }
        push_extension_once(
            &mut encounter.extension,
            Extension::codeable_concept(
                FR_EXT_MODE_PRISE_EN_CHARGE,
                CodeableConcept::coding(
                    FR_SYS_MODE_PRISE_EN_CHARGE,
                    mode_code,
                    Some(&catalogue().code_display("modePriseEnCharge", mode_code)),
                ),
            ),
        );
    }

    /// Enforce patient-level uniqueness: identifiers by (system, value),
    /// telecoms by (system, use, value), names by (use, family, given set)
    fn dedup_patient(patient: &mut Patient) {
        if let Some(identifiers) = patient.identifier.as_mut() {
            let mut seen = Vec::new();
            identifiers.retain(|id| {
                let key = (id.system.clone(), id.value.clone());
                if seen.contains(&key) {
                    false
                } else {
                    seen.push(key);
                    true
                }
            });
        }
        if let Some(telecoms) = patient.telecom.as_mut() {
            let mut seen = Vec::new();
            telecoms.retain(|t| {
                let key = (t.system.clone(), t.use_.clone(), t.value.clone());
                if seen.contains(&key) {
                    false
                } else {
                    seen.push(key);
                    true
                }
            });
        }
        if let Some(names) = patient.name.as_mut() {
            let mut seen: Vec<(Option<String>, Option<String>, Vec<String>)> = Vec::new();
            names.retain(|n| {
                let mut given = n.given.clone().unwrap_or_default();
                given.sort();
                let key = (n.use_.clone(), n.family.clone(), given);
                if seen.contains(&key) {
                    false
                } else {
                    seen.push(key);
                    true
                }
            });
        }
    }

    /// Referential integrity: every resolvable reference must land on an
    /// entry fullUrl; anything else is removed rather than emitted dangling
    fn prune_dangling_references(bundle: &mut Bundle) {
        let known: Vec<String> = bundle.entry.iter().map(|e| e.full_url.clone()).collect();
        let resolves = |reference: &Reference| {
            reference
                .reference
                .as_ref()
                .map(|r| known.contains(r))
                .unwrap_or(true)
        };

        for entry in &mut bundle.entry {
            if let Resource::Encounter(encounter) = &mut entry.resource {
                if let Some(locations) = encounter.location.as_mut() {
                    locations.retain(|l| {
                        let ok = resolves(&l.location);
                        if !ok {
                            warn!("dropping dangling Encounter.location reference");
                        }
                        ok
                    });
                    if locations.is_empty() {
                        encounter.location = None;
                    }
                }
            }
            if let Resource::Coverage(coverage) = &mut entry.resource {
                if let Some(payors) = coverage.payor.as_mut() {
                    payors.retain(|p| {
                        let ok = resolves(p);
                        if !ok {
                            warn!("dropping dangling Coverage.payor reference");
                        }
                        ok
                    });
                    if payors.is_empty() {
                        coverage.payor = None;
                    }
                }
            }
        }
    }
}
