//! Patient identifier classification
//!
//! PID-3 repetitions arrive with wildly different authority spellings
//! depending on the emitting system. Classification is one decision function
//! over the four signals that matter (authority name, authority OID, type
//! code, value pattern) so the precedence stays readable and testable.

use fr7_terminology::{catalogue, urn_oid};

/// OID of the INS-NIR identifier space
pub const OID_INS_NIR: &str = "1.2.250.1.213.1.4.8";
/// OID of the INS-C identifier space
pub const OID_INS_C: &str = "1.2.250.1.213.1.4.2";
/// OID of the hospital IPP identifier space
pub const OID_IPP: &str = "1.2.250.1.71.4.2.7";
/// OID of the RPPS practitioner registry
pub const OID_RPPS: &str = "1.2.250.1.71.4.2.1";

/// System fallback when nothing resolves
pub const SYSTEM_UNKNOWN: &str = "urn:system:unknown";

/// What a PID-3 repetition turned out to be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    /// National health identifier, NIR flavor
    InsNir,
    /// National health identifier, C flavor
    InsC,
    /// Hospital-local permanent patient id
    Ipp,
    /// Passport number
    Passport,
    /// Anything else, passed through
    Other,
}

/// The raw signals of one PID-3 repetition
#[derive(Debug, Clone, Default)]
pub struct IdentifierCandidate {
    pub value: String,
    pub authority_name: String,
    pub authority_oid: String,
    pub type_code: String,
}

/// Authority spellings that mean "this is an INS"
const INS_AUTHORITIES: [&str; 4] = [
    "ASIP-SANTE-INS-NIR",
    "ASIP-SANTE-INS-C",
    "ASIP-SANTE-INS-A",
    "INSEE-NIR",
];

fn ins_authority(name: &str) -> bool {
    INS_AUTHORITIES.iter().any(|a| name.contains(a))
}

/// Classify one candidate
///
/// Precedence: INS beats IPP beats pass-through. The 15-digit value pattern
/// only promotes a candidate whose authority OID is already an INS space
/// (covers feeds that mislabel the type code).
pub fn classify(candidate: &IdentifierCandidate) -> IdentifierKind {
    let IdentifierCandidate {
        value,
        authority_name,
        authority_oid,
        type_code,
    } = candidate;

    let ins_oid = authority_oid == OID_INS_NIR || authority_oid == OID_INS_C;
    let fifteen_digits = value.len() == 15 && value.chars().all(|c| c.is_ascii_digit());

    if (type_code == "NI" && ins_oid) || ins_authority(authority_name) || (fifteen_digits && ins_oid)
    {
        let c_flavor = authority_oid == OID_INS_C
            || authority_name.contains("ASIP-SANTE-INS-C")
            || authority_name.contains("ASIP-SANTE-INS-A");
        return if c_flavor {
            IdentifierKind::InsC
        } else {
            IdentifierKind::InsNir
        };
    }

    if type_code == "PI" || type_code == "NH" || type_code.is_empty() {
        return IdentifierKind::Ipp;
    }

    if type_code == "PPN" {
        return IdentifierKind::Passport;
    }

    IdentifierKind::Other
}

/// System URI for a pass-through identifier: known OID, verbatim OID, or the
/// unknown marker
pub fn passthrough_system(authority_oid: &str) -> String {
    if authority_oid.is_empty() {
        return SYSTEM_UNKNOWN.to_string();
    }
    match catalogue().system_by_oid(authority_oid) {
        Some(url) => url.to_string(),
        None => urn_oid(authority_oid),
    }
}
