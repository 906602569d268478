//! Turns a loosely structured submission into a [`CanonicalLead`].
//!
//! Two shapes are understood:
//!
//! - nested: `{"lead": {...}, "product": {"name": ..}, "lead_attributes": {..}, "meta_attributes": {..}}`
//! - flat: contact fields at the top level under various aliases, with a
//!   single combined address line.
//!
//! Every canonical field has an ordered alias list. Sources are probed
//! nested block first, then top level, so the nested shape wins when a
//! submission mixes both. Extraction never fails; missing values stay empty
//! and [`LeadDraft::validate`] rejects them.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use crate::attribute_filter::{filter_lead_attributes, AttributeMap};
use crate::attribute_rules::AttributeRuleCatalog;
use crate::errors::ValidationError;
use crate::models::{CanonicalLead, LeadDraft, DEFAULT_COUNTRY, DEFAULT_PRODUCT_NAME};

const FIRST_NAME: &[&str] = &["first_name", "firstname", "firstName"];
const LAST_NAME: &[&str] = &["last_name", "lastname", "lastName"];
const EMAIL: &[&str] = &["email", "email_address", "emailAddress"];
const PHONE: &[&str] = &["phone", "mobile", "phone_number", "phoneNumber"];
const POSTAL_CODE: &[&str] = &["postcode", "zipcode", "zip", "postal_code", "postalCode"];
const CITY: &[&str] = &["city"];
const COUNTRY: &[&str] = &["country", "country_code", "countryCode"];
const HOUSE_NUMBER: &[&str] = &["housenumber", "house_number", "houseNumber"];
const HOUSE_OWNER: &[&str] = &["house_owner", "isHouseOwner", "is_house_owner", "owner"];

/// Street in the nested block, which always comes with its own house number.
const NESTED_STREET: &[&str] = &["street"];

/// Combined "street + number" lines in the flat shape.
const ADDRESS_LINE: &[&str] = &["address", "address_line1", "addressLine1", "street"];

const PRODUCT_NAME: &[&str] = &[
    "product_name",
    "productName",
    "existing_product_name",
    "existingProductName",
    "product",
];

const LEAD_ATTRIBUTES: &[&str] = &["lead_attributes", "leadAttributes"];

/// Top-level tracking keys collected when no `meta_attributes` object is sent.
const FLAT_META_KEYS: &[&str] = &[
    "landingpage_url",
    "unique_id",
    "utm_campaign",
    "utm_content",
    "utm_medium",
    "utm_placement",
    "utm_source",
    "utm_term",
    "ip",
    "browser",
    "optin",
    "optin_wording",
    "optin_wording_2",
];

static TRAILING_HOUSE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)(?:\s+(\d+[a-zA-Z]?))?$").expect("house number pattern is valid")
});

/// Extracts and validates a lead from a raw submission.
///
/// Lead attributes are filtered against `catalog` on the way.
pub fn normalize_lead(
    raw: &Value,
    catalog: &AttributeRuleCatalog,
) -> Result<CanonicalLead, ValidationError> {
    extract_draft(raw, catalog).validate()
}

/// Pulls every canonical field out of `raw` without validating it.
pub fn extract_draft(raw: &Value, catalog: &AttributeRuleCatalog) -> LeadDraft {
    let empty = Map::new();
    let root = raw.as_object().unwrap_or(&empty);
    let lead_block = object_at(root, "lead").unwrap_or(&empty);

    // nested block first, top level second
    let sources = [lead_block, root];

    let raw_attributes = LEAD_ATTRIBUTES
        .iter()
        .find_map(|key| object_at(root, key))
        .unwrap_or(&empty);

    let (street, house_number) = extract_address(lead_block, root);

    LeadDraft {
        first_name: pick_string(&sources, FIRST_NAME).unwrap_or_default(),
        last_name: pick_string(&sources, LAST_NAME).unwrap_or_default(),
        email: pick_string(&sources, EMAIL).unwrap_or_default(),
        phone: pick_string(&sources, PHONE).unwrap_or_default(),
        postal_code: pick_string(&sources, POSTAL_CODE).unwrap_or_default(),
        is_house_owner: extract_house_owner(raw_attributes, root, lead_block),
        street,
        house_number,
        city: pick_string(&sources, CITY),
        country: pick_string(&sources, COUNTRY)
            .map(|c| c.to_lowercase())
            .unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        product_name: pick_product_name(root),
        lead_attributes: filter_lead_attributes(raw_attributes, catalog),
        meta_attributes: extract_meta_attributes(root),
    }
}

/// Splits "Weststr. 12a" into `("Weststr.", Some("12a"))`.
///
/// Only a trailing, whitespace-separated number with at most one letter
/// suffix counts as house number; otherwise the whole line is the street.
pub fn split_street_and_number(line: &str) -> (String, Option<String>) {
    let line = line.trim();
    if line.is_empty() {
        return (String::new(), None);
    }

    let Some(caps) = TRAILING_HOUSE_NUMBER.captures(line) else {
        return (line.to_string(), None);
    };

    let street = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
    let number = caps
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .filter(|n| !n.is_empty());

    if street.is_empty() {
        (line.to_string(), None)
    } else {
        (street.to_string(), number)
    }
}

fn object_at<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    map.get(key).and_then(Value::as_object)
}

/// Trimmed, non-empty string form of a scalar. Numbers are stringified.
fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn pick_string(sources: &[&Map<String, Value>], aliases: &[&str]) -> Option<String> {
    sources.iter().find_map(|source| {
        aliases
            .iter()
            .find_map(|alias| source.get(*alias).and_then(scalar_string))
    })
}

fn extract_address(
    lead_block: &Map<String, Value>,
    root: &Map<String, Value>,
) -> (String, Option<String>) {
    let sources = [lead_block, root];
    if let Some(street) = pick_string(&[lead_block], NESTED_STREET) {
        return (street, pick_string(&sources, HOUSE_NUMBER));
    }

    let line = pick_string(&sources, ADDRESS_LINE).unwrap_or_default();
    match pick_string(&sources, HOUSE_NUMBER) {
        Some(number) => (line, Some(number)),
        None => split_street_and_number(&line),
    }
}

/// The attribute map is authoritative; top-level and nested fields are
/// fallbacks. Absent everywhere means not an owner.
fn extract_house_owner(
    attributes: &Map<String, Value>,
    root: &Map<String, Value>,
    lead_block: &Map<String, Value>,
) -> bool {
    [attributes, root, lead_block]
        .iter()
        .find_map(|source| {
            HOUSE_OWNER
                .iter()
                .find_map(|alias| source.get(*alias).and_then(as_flag))
        })
        .unwrap_or(false)
}

fn as_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            if s.is_empty() {
                None
            } else {
                Some(matches!(s.as_str(), "true" | "yes" | "ja" | "y" | "1" | "on"))
            }
        }
        _ => None,
    }
}

fn pick_product_name(root: &Map<String, Value>) -> String {
    object_at(root, "product")
        .and_then(|product| product.get("name"))
        .filter(|v| v.is_string())
        .and_then(scalar_string)
        .or_else(|| {
            PRODUCT_NAME.iter().find_map(|alias| {
                root.get(*alias)
                    .filter(|v| v.is_string())
                    .and_then(scalar_string)
            })
        })
        .unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_string())
}

fn extract_meta_attributes(root: &Map<String, Value>) -> AttributeMap {
    if let Some(meta) = object_at(root, "meta_attributes") {
        return meta
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
    }

    FLAT_META_KEYS
        .iter()
        .filter_map(|key| {
            root.get(*key)
                .filter(|v| !v.is_null())
                .map(|v| (key.to_string(), v.clone()))
        })
        .collect()
}
