//! # fr7 - HL7 v2.5 ADT to FHIR R4 for French health interoperability
//!
//! fr7 transcodes ADT-family HL7 v2.5 messages as emitted by French
//! hospital systems into FHIR R4 transaction Bundles conforming to the ANS
//! national profiles: INS national identifiers, MOS/NOS terminologies, and
//! the PAM Z-segments (ZBE, ZFP, ZFV, ZFM).
//!
//! ## Pipeline
//!
//! - **Lexing**: a lenient parser splits the raw text on the delimiters the
//!   MSH header declares; only a broken header is fatal
//! - **Extraction**: one converter per concern (PID, PV1/PV2, MSH, ROL,
//!   NK1, IN1, Z-segments) produces partial resources
//! - **Composition**: the bundle composer orders entries, assigns
//!   `urn:uuid` fullUrls, wires references and merges the Z-segment plans
//!   into the Encounter
//!
//! ## Quick start
//!
//! ```rust
//! let hl7 = "MSH|^~\\&|APP|FAC|REC|FAC|20230815131519||ADT^A01|1|P|2.5\r\
//!            PID|1||123^^^HOSP^PI||DUPONT^JEAN||19800101|M";
//!
//! let bundle = fr7::convert(hl7).unwrap();
//! assert_eq!(bundle.entry[0].resource.resource_type(), "Patient");
//! ```

pub use fr7_core as core;
pub use fr7_fhir as fhir;
pub use fr7_parser as parser;
pub use fr7_terminology as terminology;

// Re-export the conversion surface
pub use fr7_fhir::resources::{Bundle, BundleEntry, Resource};
pub use fr7_fhir::{
    convert, Clock, ConversionEngine, ConversionError, ConversionResult, ConvertOptions,
    SystemClock,
};

// Re-export the message model for callers that pre-parse
pub use fr7_core::{Delimiters, FieldValue, Message, Segment};
pub use fr7_parser::parse_message;
