use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Snapshot of a business submitted for evaluation. Every nested group is
/// optional on the wire; missing groups deserialize to empty/false values
/// and the derivation layer treats them as absent facts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    #[serde(default)]
    pub as_of_date: String,
    #[serde(default)]
    pub entity: EntityInfo,
    #[serde(default)]
    pub industry: IndustryInfo,
    #[serde(default)]
    pub locations: Locations,
    #[serde(default)]
    pub size: CompanySize,
    #[serde(default)]
    pub operations: Operations,
    #[serde(default)]
    pub payments: Payments,
    #[serde(default)]
    pub data_practices: DataPractices,
}

/// Legal organization form of the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegalForm {
    Llc,
    CCorp,
    SCorp,
    SoleProp,
    Partnership,
    NonprofitOther,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_form: Option<LegalForm>,
    #[serde(default)]
    pub federal_contractor: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndustryInfo {
    #[serde(default)]
    pub naics_codes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Locations {
    #[serde(default)]
    pub primary: PrimaryLocation,
    #[serde(default)]
    pub operating_states: Vec<String>,
    #[serde(default)]
    pub online_sales_states: Vec<String>,
    #[serde(default)]
    pub has_remote_employees_by_state: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimaryLocation {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanySize {
    #[serde(default)]
    pub employee_count_total: u32,
    #[serde(default)]
    pub employee_count_by_state: BTreeMap<String, u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_revenue_usd: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operations {
    #[serde(default)]
    pub serves_food: bool,
    #[serde(default)]
    pub sells_alcohol: bool,
    #[serde(default)]
    pub brick_and_mortar: bool,
    #[serde(default)]
    pub ecommerce: bool,
    #[serde(default)]
    pub is_healthcare_provider: bool,
    #[serde(default)]
    pub is_contractor_or_construction: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payments {
    #[serde(default)]
    pub accepts_card_payments: bool,
    #[serde(default)]
    pub stores_card_data: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPractices {
    #[serde(default)]
    pub collects_personal_data: bool,
    #[serde(default)]
    pub collects_biometric_data: bool,
    #[serde(default)]
    pub collects_payment_cards: bool,
    #[serde(default)]
    pub stores_payment_cards: bool,
    #[serde(default)]
    pub processes_phi: bool,
    #[serde(default)]
    pub processes_ssn: bool,
    #[serde(default)]
    pub targets_children_u13: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records_per_year_estimate: Option<u64>,
    #[serde(default)]
    pub consumers_by_state: BTreeMap<String, u64>,
}

/// A single field-level violation found while validating a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileViolation {
    pub field: String,
    pub message: String,
}

impl ProfileViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation failure carrying every violation found, not just the first.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("business profile failed validation with {} violation(s)", violations.len())]
pub struct ProfileError {
    pub violations: Vec<ProfileViolation>,
}

impl BusinessProfile {
    /// Structural validation beyond what deserialization enforces. Collects
    /// every violation so clients can fix a submission in one round trip.
    pub fn validate(&self) -> Result<(), ProfileError> {
        let mut violations = Vec::new();

        if self.as_of_date.trim().is_empty() {
            violations.push(ProfileViolation::new(
                "as_of_date",
                "must be a non-empty date string",
            ));
        }

        if self.entity.legal_form.is_none() {
            violations.push(ProfileViolation::new("entity.legal_form", "is required"));
        }

        if self.industry.naics_codes.is_empty() {
            violations.push(ProfileViolation::new(
                "industry.naics_codes",
                "at least one NAICS code is required",
            ));
        }
        for (index, code) in self.industry.naics_codes.iter().enumerate() {
            if !is_naics_code(code) {
                violations.push(ProfileViolation::new(
                    format!("industry.naics_codes[{index}]"),
                    "must be 2 to 6 digits",
                ));
            }
        }

        if self.locations.primary.country != "US" {
            violations.push(ProfileViolation::new(
                "locations.primary.country",
                "only US businesses are supported",
            ));
        }
        if !is_state_code(&self.locations.primary.state) {
            violations.push(ProfileViolation::new(
                "locations.primary.state",
                "must be a two-letter state code",
            ));
        }
        for (index, state) in self.locations.operating_states.iter().enumerate() {
            if !is_state_code(state) {
                violations.push(ProfileViolation::new(
                    format!("locations.operating_states[{index}]"),
                    "must be a two-letter state code",
                ));
            }
        }
        for (index, state) in self.locations.online_sales_states.iter().enumerate() {
            if !is_state_code(state) {
                violations.push(ProfileViolation::new(
                    format!("locations.online_sales_states[{index}]"),
                    "must be a two-letter state code",
                ));
            }
        }

        for state in self.locations.has_remote_employees_by_state.keys() {
            if !is_state_code(state) {
                violations.push(ProfileViolation::new(
                    format!("locations.has_remote_employees_by_state.{state}"),
                    "must be keyed by a two-letter state code",
                ));
            }
        }
        for state in self.size.employee_count_by_state.keys() {
            if !is_state_code(state) {
                violations.push(ProfileViolation::new(
                    format!("size.employee_count_by_state.{state}"),
                    "must be keyed by a two-letter state code",
                ));
            }
        }
        for state in self.data_practices.consumers_by_state.keys() {
            if !is_state_code(state) {
                violations.push(ProfileViolation::new(
                    format!("data_practices.consumers_by_state.{state}"),
                    "must be keyed by a two-letter state code",
                ));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ProfileError { violations })
        }
    }
}

fn is_state_code(value: &str) -> bool {
    value.len() == 2 && value.bytes().all(|b| b.is_ascii_alphabetic())
}

fn is_naics_code(value: &str) -> bool {
    (2..=6).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_profile() -> BusinessProfile {
        BusinessProfile {
            as_of_date: "2025-01-15".into(),
            entity: EntityInfo {
                legal_form: Some(LegalForm::Llc),
                federal_contractor: false,
            },
            industry: IndustryInfo {
                naics_codes: vec!["722511".into()],
                description: Some("Full-service restaurant".into()),
            },
            locations: Locations {
                primary: PrimaryLocation {
                    country: "US".into(),
                    state: "IL".into(),
                    city: Some("Chicago".into()),
                    postal_code: Some("60601".into()),
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn empty_document_deserializes_with_defaults() {
        let profile: BusinessProfile = serde_json::from_str("{}").expect("defaults apply");
        assert_eq!(profile.as_of_date, "");
        assert!(profile.entity.legal_form.is_none());
        assert!(!profile.operations.serves_food);
        assert!(profile.size.annual_revenue_usd.is_none());
    }

    #[test]
    fn legal_form_uses_snake_case_names() {
        let parsed: LegalForm = serde_json::from_str("\"c_corp\"").expect("parse");
        assert_eq!(parsed, LegalForm::CCorp);
        assert_eq!(
            serde_json::to_string(&LegalForm::NonprofitOther).expect("serialize"),
            "\"nonprofit_other\""
        );
    }

    #[test]
    fn valid_profile_passes_validation() {
        valid_profile().validate().expect("profile should be valid");
    }

    #[test]
    fn validation_collects_all_violations() {
        let profile = BusinessProfile::default();
        let err = profile.validate().expect_err("empty profile is invalid");
        let fields: Vec<&str> = err
            .violations
            .iter()
            .map(|violation| violation.field.as_str())
            .collect();
        assert!(fields.contains(&"as_of_date"));
        assert!(fields.contains(&"entity.legal_form"));
        assert!(fields.contains(&"industry.naics_codes"));
        assert!(fields.contains(&"locations.primary.country"));
        assert!(fields.contains(&"locations.primary.state"));
    }

    #[test]
    fn validation_flags_bad_codes() {
        let mut profile = valid_profile();
        profile.industry.naics_codes = vec!["7".into(), "72251x".into()];
        profile.locations.operating_states = vec!["Illinois".into()];
        profile
            .size
            .employee_count_by_state
            .insert("Texas".into(), 3);
        profile
            .data_practices
            .consumers_by_state
            .insert("N1".into(), 10);
        let err = profile.validate().expect_err("codes are malformed");
        let fields: Vec<&str> = err
            .violations
            .iter()
            .map(|violation| violation.field.as_str())
            .collect();
        assert!(fields.contains(&"industry.naics_codes[0]"));
        assert!(fields.contains(&"industry.naics_codes[1]"));
        assert!(fields.contains(&"locations.operating_states[0]"));
        assert!(fields.contains(&"size.employee_count_by_state.Texas"));
        assert!(fields.contains(&"data_practices.consumers_by_state.N1"));
    }
}
