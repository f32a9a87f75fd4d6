//! Offline ANS/MOS terminology catalogue
//!
//! French national profiles qualify identifiers by OID, code resources
//! against MOS/NOS code systems, and decorate resources with ANS extension
//! URLs. This crate embeds the whole catalogue at compile time (no service
//! lookup, ever) and exposes read-only queries over it. The catalogue is
//! parsed once behind a [`Lazy`] and shared freely across threads.
//!
//! Fallback policy: an unknown code keeps itself as display; an unknown OID
//! is emitted verbatim as `urn:oid:<oid>`.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;

/// Profession code system (MOS TRE_G15)
pub const FR_SYS_PROFESSION: &str =
    "https://mos.esante.gouv.fr/NOS/TRE_G15-ProfessionSante/FHIR/TRE-G15-ProfessionSante";

/// Mode de prise en charge code system (MOS TRE_R213)
pub const FR_SYS_MODE_PRISE_EN_CHARGE: &str =
    "https://mos.esante.gouv.fr/NOS/TRE_R213-ModePriseEnCharge/FHIR/TRE-R213-ModePriseEnCharge";

/// Coverage type code system (MOS TRE_R28)
pub const FR_SYS_TYPE_COUVERTURE: &str =
    "https://mos.esante.gouv.fr/NOS/TRE_R28-TypeCouverture/FHIR/TRE-R28-TypeCouverture";

/// Country code system (MOS TRE_R20)
pub const FR_SYS_PAYS: &str = "https://mos.esante.gouv.fr/NOS/TRE_R20-Pays/FHIR/TRE-R20-Pays";

/// Practitioner profession extension
pub const FR_EXT_PRACTITIONER_PROFESSION: &str =
    "https://hl7.fr/ig/fhir/core/StructureDefinition/fr-core-practitioner-profession";

/// Practitioner nationality extension
pub const FR_EXT_NATIONALITY: &str =
    "https://hl7.fr/ig/fhir/core/StructureDefinition/fr-core-practitioner-nationality";

/// INSi teleservice status extension carried by INS identifiers
pub const FR_EXT_INSI_STATUS: &str =
    "https://apifhir.annuaire.sante.fr/ws-sync/exposed/structuredefinition/INSi-Status";

/// Mode de prise en charge extension on Encounter
pub const FR_EXT_MODE_PRISE_EN_CHARGE: &str =
    "https://hl7.fr/ig/fhir/core/StructureDefinition/fr-core-encounter-mode-prise-en-charge";

/// Expected exit date extension on Encounter
pub const FR_EXT_ENCOUNTER_EXPECTED_EXIT: &str =
    "https://hl7.fr/ig/fhir/core/StructureDefinition/fr-core-encounter-estimated-discharge-date";

/// Health event type extension on Encounter (ZBE movement type)
pub const FR_EXT_HEALTHEVENT_TYPE: &str =
    "https://hl7.fr/ig/fhir/core/StructureDefinition/fr-core-encounter-healthevent-type";

/// Health event identifier extension on Encounter (ZBE movement id)
pub const FR_EXT_HEALTHEVENT_IDENTIFIER: &str =
    "https://hl7.fr/ig/fhir/core/StructureDefinition/fr-core-encounter-healthevent-identifier";

/// INSEE commune code extension on Address
pub const FR_EXT_COMMUNE_COG_INSEE: &str =
    "https://hl7.fr/ig/fhir/core/StructureDefinition/fr-core-address-insee-code";

/// Mobility marker extension on ContactPoint
pub const FR_EXT_TELECOM_MOBILITE: &str =
    "https://hl7.fr/ig/fhir/core/StructureDefinition/fr-core-contact-point-mobility";

/// Insured-person identifier extension on Coverage
pub const FR_EXT_COVERAGE_INSURED_ID: &str =
    "https://hl7.fr/ig/fhir/core/StructureDefinition/fr-core-coverage-insured-id";

/// One code system: its OID and canonical URL
#[derive(Debug, Clone, Deserialize)]
pub struct SystemEntry {
    pub oid: String,
    pub url: String,
}

/// One code: display label and optional definition
#[derive(Debug, Clone, Deserialize)]
pub struct CodeEntry {
    pub display: String,
    #[serde(default)]
    pub definition: Option<String>,
}

/// One extension: its canonical URI
#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionEntry {
    pub uri: String,
}

/// The embedded catalogue, deserialized once at first use
#[derive(Debug, Clone, Deserialize)]
pub struct Catalogue {
    pub systems: HashMap<String, SystemEntry>,
    pub codes: HashMap<String, HashMap<String, CodeEntry>>,
    pub identifier_systems: HashMap<String, SystemEntry>,
    pub extension_systems: HashMap<String, ExtensionEntry>,
}

/// A resolved code with its display and system, ready to drop into a Coding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeInfo {
    pub code: String,
    pub display: String,
    pub system: String,
}

static CATALOGUE: Lazy<Catalogue> = Lazy::new(|| {
    serde_json::from_str(include_str!("../data/catalogue.json"))
        .expect("embedded terminology catalogue is valid JSON")
});

/// Access the process-wide catalogue
pub fn catalogue() -> &'static Catalogue {
    &CATALOGUE
}

/// Format an OID as a `urn:oid:` URI
pub fn urn_oid(oid: &str) -> String {
    format!("urn:oid:{}", oid)
}

impl Catalogue {
    /// Canonical URL of the system registered under an OID, if any
    pub fn system_by_oid(&self, oid: &str) -> Option<&str> {
        self.systems
            .values()
            .chain(self.identifier_systems.values())
            .find(|entry| entry.oid == oid)
            .map(|entry| entry.url.as_str())
    }

    /// Identifier system registered under a type key (`INS-NIR`, `IPP`, ...)
    pub fn identifier_system(&self, type_code: &str) -> Option<&SystemEntry> {
        self.identifier_systems.get(type_code)
    }

    /// Display label of a code in a code table; unknown codes display as
    /// themselves
    pub fn code_display(&self, table: &str, code: &str) -> String {
        self.codes
            .get(table)
            .and_then(|table| table.get(code))
            .map(|entry| entry.display.clone())
            .unwrap_or_else(|| code.to_string())
    }

    /// Resolve a profession code against TRE_G15
    pub fn profession_info(&self, code: &str) -> CodeInfo {
        CodeInfo {
            code: code.to_string(),
            display: self.code_display("profession", code),
            system: FR_SYS_PROFESSION.to_string(),
        }
    }

    /// Resolve a ZBE movement type code
    pub fn movement_type_info(&self, code: &str) -> CodeInfo {
        CodeInfo {
            code: code.to_string(),
            display: self.code_display("movementType", code),
            system: self
                .systems
                .get("movementType")
                .map(|s| s.url.clone())
                .unwrap_or_else(|| urn_oid("1.2.250.1.213.1.1.4.331")),
        }
    }

    /// Canonical URL of a registered code system
    pub fn system_url(&self, id: &str) -> Option<&str> {
        self.systems.get(id).map(|s| s.url.as_str())
    }
}
