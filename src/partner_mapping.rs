//! Reshapes a canonical lead into the partner's request body.

use serde::Serialize;

use crate::attribute_filter::AttributeMap;
use crate::errors::MappingError;
use crate::models::{CanonicalLead, ALLOWED_COUNTRIES, MIN_PHONE_LEN, MIN_POSTAL_CODE_LEN};
use crate::schema::is_valid_email;

/// Request body of the partner's lead endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerPayload {
    pub lead: PartnerLead,
    pub product: PartnerProduct,
    pub lead_attributes: AttributeMap,
    pub meta_attributes: AttributeMap,
}

/// Contact block. Absent optionals are omitted, not sent as null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerLead {
    pub phone: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub housenumber: Option<String>,
    pub postcode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartnerProduct {
    pub name: String,
}

/// Builds the partner payload, re-checking the partner's own constraints.
pub fn map_to_partner_payload(lead: &CanonicalLead) -> Result<PartnerPayload, MappingError> {
    require(
        "phone",
        lead.phone().chars().count() >= MIN_PHONE_LEN,
        "too short",
    )?;
    require(
        "postcode",
        lead.postal_code().chars().count() >= MIN_POSTAL_CODE_LEN,
        "too short",
    )?;
    require("email", is_valid_email(lead.email()), "not an email address")?;
    require(
        "country",
        ALLOWED_COUNTRIES.contains(&lead.country()),
        "unsupported country",
    )?;
    for (field, value) in [
        ("first_name", lead.first_name()),
        ("last_name", lead.last_name()),
        ("street", lead.street()),
        ("product.name", lead.product_name()),
    ] {
        require(field, !value.trim().is_empty(), "empty")?;
    }

    Ok(PartnerPayload {
        lead: PartnerLead {
            phone: lead.phone().to_string(),
            email: lead.email().to_string(),
            first_name: lead.first_name().to_string(),
            last_name: lead.last_name().to_string(),
            street: lead.street().to_string(),
            housenumber: lead.house_number().map(str::to_string),
            postcode: lead.postal_code().to_string(),
            city: lead.city().map(str::to_string),
            country: lead.country().to_string(),
        },
        product: PartnerProduct {
            name: lead.product_name().to_string(),
        },
        lead_attributes: lead.lead_attributes().clone(),
        meta_attributes: lead.meta_attributes().clone(),
    })
}

fn require(field: &'static str, ok: bool, message: &str) -> Result<(), MappingError> {
    if ok {
        Ok(())
    } else {
        Err(MappingError {
            field,
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadDraft;
    use serde_json::{json, Value};

    fn lead(house_number: Option<&str>, city: Option<&str>) -> CanonicalLead {
        LeadDraft {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "johndoe@example.com".to_string(),
            phone: "+491234".to_string(),
            postal_code: "66123".to_string(),
            is_house_owner: true,
            street: "Weststr.".to_string(),
            house_number: house_number.map(str::to_string),
            city: city.map(str::to_string),
            country: "de".to_string(),
            product_name: "solar".to_string(),
            lead_attributes: json!({"solar_owner": "Ja"}).as_object().cloned().unwrap(),
            meta_attributes: json!({"unique_id": "123"}).as_object().cloned().unwrap(),
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_partner_payload_shape() {
        let payload = map_to_partner_payload(&lead(Some("1"), Some("Chemnitz"))).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        assert_eq!(
            value,
            json!({
                "lead": {
                    "phone": "+491234",
                    "email": "johndoe@example.com",
                    "first_name": "John",
                    "last_name": "Doe",
                    "street": "Weststr.",
                    "housenumber": "1",
                    "postcode": "66123",
                    "city": "Chemnitz",
                    "country": "de"
                },
                "product": {"name": "solar"},
                "lead_attributes": {"solar_owner": "Ja"},
                "meta_attributes": {"unique_id": "123"}
            })
        );
    }

    #[test]
    fn test_absent_optionals_are_omitted() {
        let payload = map_to_partner_payload(&lead(None, None)).unwrap();
        let value = serde_json::to_value(&payload).unwrap();

        let lead_block = value["lead"].as_object().unwrap();
        assert!(!lead_block.contains_key("housenumber"));
        assert!(!lead_block.contains_key("city"));
        assert!(!lead_block.values().any(Value::is_null));
    }
}
