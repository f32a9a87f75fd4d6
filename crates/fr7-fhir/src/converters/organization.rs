//! Organization extraction from the MSH header
//!
//! MSH-4 and MSH-6 name the sending and receiving facilities. Some emitters
//! put a timestamp where the facility name belongs; those get a descriptive
//! display and keep the original string as a local identifier.

use crate::normalize::looks_like_timestamp;
use crate::resources::{Identifier, Organization};
use fr7_core::{FieldValue, Message};
use fr7_terminology::urn_oid;

/// Converter for the MSH facility fields
pub struct OrganizationConverter;

impl OrganizationConverter {
    /// Extract sending and receiving organizations, deduplicated when both
    /// facilities resolve to the same id
    pub fn convert(message: &Message) -> Vec<Organization> {
        let mut organizations: Vec<Organization> = Vec::new();

        let facilities = [
            (message.sending_facility(), "Établissement émetteur"),
            (message.receiving_facility(), "Établissement destinataire"),
        ];
        for (field, fallback_display) in facilities {
            if let Some(org) = Self::convert_facility(field, fallback_display) {
                if !organizations.iter().any(|o| o.id == org.id) {
                    organizations.push(org);
                }
            }
        }

        organizations
    }

    fn convert_facility(field: &FieldValue, fallback_display: &str) -> Option<Organization> {
        let namespace = field.component_str(1)?;

        let mut organization = Organization::new();
        if looks_like_timestamp(namespace) {
            organization.name = Some(fallback_display.to_string());
            organization.id = Some(format!("organization-{}", slug(fallback_display)));
            organization.identifier = Some(vec![Identifier {
                value: Some(namespace.to_string()),
                ..Default::default()
            }]);
        } else {
            organization.name = Some(namespace.to_string());
            organization.id = Some(format!("organization-{}", slug(namespace)));
            // a universal id in the HD qualifies the local identifier
            if let Some(oid) = field.component(2).text() {
                organization.identifier =
                    Some(vec![Identifier::with_system(urn_oid(oid), namespace)]);
            }
        }

        Some(organization)
    }
}

/// Lowercase alphanumeric slug for resource ids
pub fn slug(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_dash = false;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash && !out.is_empty() {
            out.push('-');
            last_dash = true;
        }
    }
    out.trim_end_matches('-').to_string()
}
