//! French patient name extraction from PID-5
//!
//! French feeds split one civil name over several PID-5 repetitions: the
//! birth name may arrive alone, the given names alone, and composed given
//! names ("MARYSE BERTHE ALICE") ride in the additional-given component.
//! The pipeline is three pure steps, split → merge → dedup, each of which is
//! testable on its own; merging is idempotent.

use crate::resources::HumanName;
use fr7_core::FieldValue;

/// One PID-5 repetition, decomposed
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawName {
    use_: String,
    family: Option<String>,
    given: Vec<String>,
    prefix: Option<String>,
    suffix: Option<String>,
}

impl RawName {
    fn is_blank(&self) -> bool {
        self.family.is_none()
            && self.given.is_empty()
            && self.prefix.is_none()
            && self.suffix.is_none()
    }
}

/// Map an HL7 name-type code to a FHIR name use
fn map_use(code: &str) -> &'static str {
    match code {
        "L" => "official",
        "D" => "usual",
        "M" => "maiden",
        "N" => "nickname",
        "S" | "A" => "anonymous",
        "I" => "old",
        _ => "official",
    }
}

/// Extract every name carried by PID-5
pub fn extract_names(pid5: &FieldValue) -> Vec<HumanName> {
    let raw: Vec<RawName> = pid5.repetitions().into_iter().filter_map(split).collect();
    let merged = merge(raw);
    dedup(merged).into_iter().map(into_human_name).collect()
}

/// Step 1: split one repetition into its seven components
///
/// Order: family, given, additional-given, suffix, prefix, degree, use-code.
/// The single-letter family "L" is a dialect artefact (a shifted use code)
/// and is treated as absent.
fn split(rep: &FieldValue) -> Option<RawName> {
    let family = rep
        .component_str(1)
        .filter(|f| *f != "L")
        .map(str::to_string);
    let use_ = map_use(rep.component_str(7).unwrap_or("")).to_string();

    let mut given: Vec<String> = Vec::new();
    if let Some(first) = rep.component_str(2) {
        given.push(first.to_string());
    }
    if let Some(additional) = rep.component_str(3) {
        for part in additional.split_whitespace() {
            if !given.iter().any(|g| g == part) {
                given.push(part.to_string());
            }
        }
    }

    let name = RawName {
        use_,
        family,
        given,
        prefix: rep.component_str(5).map(str::to_string),
        suffix: rep.component_str(4).map(str::to_string),
    };
    (!name.is_blank()).then_some(name)
}

/// Step 2: merge repetitions that share a use
///
/// A family-only repetition completes an earlier one that had given names
/// but no family; a given-only repetition completes an earlier one that had
/// a family but no given names. Already-complete repetitions are left alone,
/// which makes the merge idempotent.
fn merge(names: Vec<RawName>) -> Vec<RawName> {
    let mut out: Vec<RawName> = Vec::new();

    for name in names {
        let completed = out.iter_mut().find(|earlier| {
            earlier.use_ == name.use_
                && ((name.family.is_some()
                    && name.given.is_empty()
                    && earlier.family.is_none()
                    && !earlier.given.is_empty())
                    || (name.family.is_none()
                        && !name.given.is_empty()
                        && earlier.family.is_some()
                        && earlier.given.is_empty()))
        });

        match completed {
            Some(earlier) => {
                if earlier.family.is_none() {
                    earlier.family = name.family;
                } else {
                    earlier.given = name.given;
                }
                if earlier.prefix.is_none() {
                    earlier.prefix = name.prefix;
                }
                if earlier.suffix.is_none() {
                    earlier.suffix = name.suffix;
                }
            }
            None => out.push(name),
        }
    }

    out
}

/// Step 3: drop repetitions identical by (use, family, given multiset)
fn dedup(names: Vec<RawName>) -> Vec<RawName> {
    let mut out: Vec<RawName> = Vec::new();
    for name in names {
        let duplicate = out.iter().any(|seen| {
            seen.use_ == name.use_
                && seen.family == name.family
                && given_multiset(&seen.given) == given_multiset(&name.given)
        });
        if !duplicate {
            out.push(name);
        }
    }
    out
}

fn given_multiset(given: &[String]) -> Vec<&String> {
    let mut sorted: Vec<&String> = given.iter().collect();
    sorted.sort();
    sorted
}

fn into_human_name(raw: RawName) -> HumanName {
    HumanName {
        use_: Some(raw.use_),
        family: raw.family,
        given: (!raw.given.is_empty()).then_some(raw.given),
        prefix: raw.prefix.map(|p| vec![p]),
        suffix: raw.suffix.map(|s| vec![s]),
    }
}
