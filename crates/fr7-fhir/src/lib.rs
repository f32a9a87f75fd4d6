//! HL7 v2.5 ADT to FHIR R4 conversion for French health interoperability
//!
//! This crate turns an ADT-family HL7 v2.5 message (French dialects: INS
//! identifiers, ZBE/ZFP/ZFV/ZFM Z-segments) into a FHIR R4 transaction
//! Bundle whose resources follow the ANS/MOS national profiles.
//!
//! # Example
//!
//! ```rust,ignore
//! use fr7_fhir::engine::convert;
//!
//! let hl7 = "MSH|^~\\&|APP|FAC|REC|FAC|20230815131519||ADT^A01|1|P|2.5\r\
//!            PID|1||123^^^HOSP^PI||DUPONT^JEAN||19800101|M";
//! let bundle = convert(hl7)?;
//! let json = serde_json::to_string_pretty(&bundle)?;
//! ```

pub mod composer;
pub mod converters;
pub mod engine;
pub mod error;
pub mod identifier;
pub mod normalize;
pub mod resources;

pub use engine::{convert, Clock, ConversionEngine, ConvertOptions, SystemClock};
pub use error::{ConversionError, ConversionResult, ExtractError};

/// Re-export of commonly used types
pub mod prelude {
    pub use crate::engine::{convert, ConversionEngine, ConvertOptions};
    pub use crate::error::{ConversionError, ConversionResult};
    pub use crate::resources::{Bundle, BundleEntry, Resource};
}
