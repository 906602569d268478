use serde::{Deserialize, Serialize};
use std::fmt;

use crate::attribute_filter::AttributeMap;
use crate::errors::ValidationError;
use crate::schema::{Constraint, FieldValidator};

/// Countries the partner serves.
pub const ALLOWED_COUNTRIES: &[&str] = &["de", "at", "ch"];

/// Country assumed when a submission names none.
pub const DEFAULT_COUNTRY: &str = "de";

/// Product assumed when a submission names none.
pub const DEFAULT_PRODUCT_NAME: &str = "solar";

pub const MIN_PHONE_LEN: usize = 3;
pub const MIN_POSTAL_CODE_LEN: usize = 4;

/// Extracted lead fields, not yet validated.
///
/// Missing required strings are left empty here; [`LeadDraft::validate`]
/// rejects them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub postal_code: String,
    pub is_house_owner: bool,
    pub street: String,
    pub house_number: Option<String>,
    pub city: Option<String>,
    pub country: String,
    pub product_name: String,
    pub lead_attributes: AttributeMap,
    pub meta_attributes: AttributeMap,
}

impl LeadDraft {
    /// Checks every field constraint and builds the canonical lead.
    ///
    /// All violations are reported together.
    pub fn validate(self) -> Result<CanonicalLead, ValidationError> {
        let mut validator = FieldValidator::new();
        validator.check("first_name", &self.first_name, &[Constraint::NonEmpty]);
        validator.check("last_name", &self.last_name, &[Constraint::NonEmpty]);
        validator.check("email", &self.email, &[Constraint::Email]);
        validator.check(
            "phone",
            &self.phone,
            &[Constraint::NonEmpty, Constraint::MinLength(MIN_PHONE_LEN)],
        );
        validator.check(
            "postal_code",
            &self.postal_code,
            &[Constraint::NonEmpty, Constraint::MinLength(MIN_POSTAL_CODE_LEN)],
        );
        validator.check("street", &self.street, &[Constraint::NonEmpty]);
        validator.check(
            "country",
            &self.country,
            &[Constraint::OneOf(ALLOWED_COUNTRIES)],
        );
        validator.check("product_name", &self.product_name, &[Constraint::NonEmpty]);
        validator.finish()?;

        Ok(CanonicalLead {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            postal_code: self.postal_code,
            is_house_owner: self.is_house_owner,
            street: self.street,
            house_number: self.house_number,
            city: self.city,
            country: self.country,
            product_name: self.product_name,
            lead_attributes: self.lead_attributes,
            meta_attributes: self.meta_attributes,
        })
    }
}

/// A validated lead. Only obtainable through [`LeadDraft::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalLead {
    first_name: String,
    last_name: String,
    email: String,
    phone: String,
    postal_code: String,
    is_house_owner: bool,
    street: String,
    house_number: Option<String>,
    city: Option<String>,
    country: String,
    product_name: String,
    lead_attributes: AttributeMap,
    meta_attributes: AttributeMap,
}

impl CanonicalLead {
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn is_house_owner(&self) -> bool {
        self.is_house_owner
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn house_number(&self) -> Option<&str> {
        self.house_number.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn lead_attributes(&self) -> &AttributeMap {
        &self.lead_attributes
    }

    pub fn meta_attributes(&self) -> &AttributeMap {
        &self.meta_attributes
    }
}

/// Coarse reason codes returned to the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    LeadValidationFailed,
    ZipcodeNotAllowed,
    NotHouseOwner,
    CustomerForwardFailed,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::LeadValidationFailed => "lead_validation_failed",
            Reason::ZipcodeNotAllowed => "zipcode_not_allowed",
            Reason::NotHouseOwner => "not_house_owner",
            Reason::CustomerForwardFailed => "customer_forward_failed",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one ingestion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionResult {
    pub accepted: bool,
    pub forwarded: bool,
    pub reason: Option<Reason>,
    pub partner_status_code: Option<u16>,
}

impl IngestionResult {
    pub fn rejected(reason: Reason) -> Self {
        Self {
            accepted: false,
            forwarded: false,
            reason: Some(reason),
            partner_status_code: None,
        }
    }

    pub fn forwarded(partner_status_code: Option<u16>) -> Self {
        Self {
            accepted: true,
            forwarded: true,
            reason: None,
            partner_status_code,
        }
    }

    pub fn forward_failed(partner_status_code: Option<u16>) -> Self {
        Self {
            accepted: true,
            forwarded: false,
            reason: Some(Reason::CustomerForwardFailed),
            partner_status_code,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft() -> LeadDraft {
        LeadDraft {
            first_name: "Max".to_string(),
            last_name: "P".to_string(),
            email: "max@example.com".to_string(),
            phone: "+491234".to_string(),
            postal_code: "66123".to_string(),
            is_house_owner: true,
            street: "Street".to_string(),
            house_number: Some("1".to_string()),
            city: Some("X".to_string()),
            country: DEFAULT_COUNTRY.to_string(),
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            ..LeadDraft::default()
        }
    }

    #[test]
    fn valid_draft_becomes_canonical_lead() {
        let lead = draft().validate().unwrap();
        assert_eq!(lead.postal_code(), "66123");
        assert_eq!(lead.house_number(), Some("1"));
        assert!(lead.is_house_owner());
    }

    #[test]
    fn empty_draft_reports_all_required_fields() {
        let err = LeadDraft::default().validate().unwrap_err();
        for field in [
            "first_name",
            "last_name",
            "email",
            "phone",
            "postal_code",
            "street",
            "country",
            "product_name",
        ] {
            assert!(err.mentions(field), "missing violation for {}", field);
        }
    }

    #[test]
    fn short_phone_and_postal_code_fail() {
        let err = LeadDraft {
            phone: "12".to_string(),
            postal_code: "661".to_string(),
            ..draft()
        }
        .validate()
        .unwrap_err();

        assert_eq!(err.violations.len(), 2);
        assert!(err.mentions("phone"));
        assert!(err.mentions("postal_code"));
    }

    #[test]
    fn invalid_email_and_country_fail() {
        let err = LeadDraft {
            email: "not-an-email".to_string(),
            country: "fr".to_string(),
            ..draft()
        }
        .validate()
        .unwrap_err();

        assert!(err.mentions("email"));
        assert!(err.mentions("country"));
    }

    #[test]
    fn result_serializes_reason_codes() {
        let value = serde_json::to_value(IngestionResult::rejected(Reason::ZipcodeNotAllowed)).unwrap();
        assert_eq!(
            value,
            json!({
                "accepted": false,
                "forwarded": false,
                "reason": "zipcode_not_allowed",
                "partner_status_code": null
            })
        );

        let value = serde_json::to_value(IngestionResult::forward_failed(Some(502))).unwrap();
        assert_eq!(value["reason"], json!("customer_forward_failed"));
        assert_eq!(value["partner_status_code"], json!(502));
    }
}
