//! Z-segment capture: ZBE, ZFP, ZFV, ZFM
//!
//! The French PAM profile moves hospital-movement data in Z-segments. None
//! of them produces a resource of its own; each yields a plan the composer
//! merges into the Encounter already in the bundle. Z fields are flattened
//! to their first non-empty string because emitters disagree on whether they
//! repeat.

use fr7_core::{Message, Segment};
use tracing::debug;

/// ZBE hospital movement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovementPlan {
    pub movement_id: Option<String>,
    pub effective_date: Option<String>,
    pub movement_type: Option<String>,
    /// Responsible functional unit (ZBE-7, component 9)
    pub functional_unit: Option<String>,
    /// Care unit the patient came from (ZBE-8)
    pub origin_unit: Option<String>,
}

impl MovementPlan {
    /// INSERT/ADMISSION movements enrich the hospitalization block
    pub fn is_admission(&self) -> bool {
        matches!(self.movement_type.as_deref(), Some("INSERT") | Some("ADMISSION"))
    }
}

/// ZFV visit enrichment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitPlan {
    /// H | U | C | E, overrides the PV1-2 class
    pub visit_mode: Option<String>,
    /// Priority code under the mode-de-prise-en-charge system
    pub priority: Option<String>,
}

/// ZFM PMSI movement codes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StayPlan {
    pub hospitalization_type: Option<String>,
    pub admission_mode: Option<String>,
    pub discharge_mode: Option<String>,
}

/// Everything the Z-segments of one message contributed
#[derive(Debug, Clone, Default)]
pub struct ZSegmentPlans {
    pub movement: Option<MovementPlan>,
    pub visit: Option<VisitPlan>,
    pub stay: Option<StayPlan>,
}

/// Converter for the Z-segment family
pub struct MovementConverter;

impl MovementConverter {
    /// Capture the Z-segments of a message into plans
    pub fn convert(message: &Message) -> ZSegmentPlans {
        let plans = ZSegmentPlans {
            movement: message.first("ZBE").map(Self::convert_zbe),
            visit: message.first("ZFV").map(Self::convert_zfv),
            stay: message.first("ZFM").map(Self::convert_zfm),
        };

        // ZFP is patient employment data; captured for the trace, pending a
        // consumer
        if message.first("ZFP").is_some() {
            debug!("ZFP present, no patient enrichment configured");
        }

        plans
    }

    fn convert_zbe(zbe: &Segment) -> MovementPlan {
        MovementPlan {
            movement_id: flatten(zbe, 1),
            effective_date: flatten(zbe, 2),
            movement_type: flatten(zbe, 4),
            functional_unit: zbe.field(7).component_str(9).map(str::to_string),
            origin_unit: flatten(zbe, 8),
        }
    }

    fn convert_zfv(zfv: &Segment) -> VisitPlan {
        VisitPlan {
            visit_mode: flatten(zfv, 1),
            priority: flatten(zfv, 2),
        }
    }

    fn convert_zfm(zfm: &Segment) -> StayPlan {
        StayPlan {
            hospitalization_type: flatten(zfm, 1),
            admission_mode: flatten(zfm, 2),
            discharge_mode: flatten(zfm, 3),
        }
    }
}

/// First non-empty string of a Z field, whatever its shape
fn flatten(segment: &Segment, index: usize) -> Option<String> {
    segment
        .field(index)
        .first_atom()
        .filter(|s| *s != "\"\"")
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fr7_parser::parse_message;

    fn plans(z: &str) -> ZSegmentPlans {
        let msg = parse_message(&format!(
            "MSH|^~\\&|S|F|R|F|20230815131519||ADT^A01|1|P|2.5\rPID|1||1^^^H^PI\rPV1|1|I\r{}",
            z
        ))
        .unwrap();
        MovementConverter::convert(&msg)
    }

    #[test]
    fn test_zbe_capture() {
        let plans = plans("ZBE|MVT001|20230815131519||INSERT|||UF-MED^^^^^^^^4001");
        let movement = plans.movement.unwrap();
        assert_eq!(movement.movement_id.as_deref(), Some("MVT001"));
        assert_eq!(movement.movement_type.as_deref(), Some("INSERT"));
        assert_eq!(movement.functional_unit.as_deref(), Some("4001"));
        assert!(movement.is_admission());
    }

    #[test]
    fn test_zbe_repetition_flattened_to_first_value() {
        let plans = plans("ZBE|MVT001~MVT002|20230815||UPDATE");
        let movement = plans.movement.unwrap();
        assert_eq!(movement.movement_id.as_deref(), Some("MVT001"));
        assert!(!movement.is_admission());
    }

    #[test]
    fn test_zbe_quoted_null_ignored() {
        let plans = plans("ZBE|\"\"|20230815||INSERT");
        assert!(plans.movement.unwrap().movement_id.is_none());
    }

    #[test]
    fn test_zfv_capture() {
        let plans = plans("ZFV|H|URGENT");
        let visit = plans.visit.unwrap();
        assert_eq!(visit.visit_mode.as_deref(), Some("H"));
        assert_eq!(visit.priority.as_deref(), Some("URGENT"));
    }

    #[test]
    fn test_zfm_capture() {
        let plans = plans("ZFM|1|6|7");
        let stay = plans.stay.unwrap();
        assert_eq!(stay.hospitalization_type.as_deref(), Some("1"));
        assert_eq!(stay.admission_mode.as_deref(), Some("6"));
        assert_eq!(stay.discharge_mode.as_deref(), Some("7"));
    }

    #[test]
    fn test_absent_z_segments() {
        let plans = plans("ZFP|EMPLOYED");
        assert!(plans.movement.is_none());
        assert!(plans.visit.is_none());
        assert!(plans.stay.is_none());
    }
}
