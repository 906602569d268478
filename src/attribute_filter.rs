//! Whitelist filter for free-form lead attributes.

use serde_json::{Map, Value};

use crate::attribute_rules::{AttributeRule, AttributeRuleCatalog};

/// Attribute name to value, as sent to the partner.
pub type AttributeMap = Map<String, Value>;

/// Keeps only the attributes the catalog knows and whose values fit its rule.
///
/// Values are never coerced: a numeric-looking string stays a string.
pub fn filter_lead_attributes(raw: &AttributeMap, catalog: &AttributeRuleCatalog) -> AttributeMap {
    let mut accepted = AttributeMap::new();

    for (key, value) in raw {
        let Some(rule) = catalog.get(key) else {
            tracing::debug!("Dropping lead attribute '{}': unknown to partner", key);
            continue;
        };

        if is_accepted(rule, value) {
            accepted.insert(key.clone(), value.clone());
        } else {
            tracing::debug!("Dropping lead attribute '{}': value rejected by rule", key);
        }
    }

    accepted
}

fn is_accepted(rule: &AttributeRule, value: &Value) -> bool {
    if value.is_null() {
        return false;
    }

    if rule.is_numeric && !is_numeric_value(value) {
        return false;
    }

    if let Some(allowed) = rule.dropdown_values() {
        return match value {
            // all or nothing, no partial lists
            Value::Array(items) => {
                !items.is_empty()
                    && items.iter().all(|item| {
                        item.as_str()
                            .is_some_and(|s| allowed.iter().any(|a| a == s))
                    })
            }
            Value::String(s) => allowed.iter().any(|a| a == s),
            _ => false,
        };
    }

    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

fn is_numeric_value(value: &Value) -> bool {
    match value {
        Value::Number(_) => true,
        Value::String(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
        _ => false,
    }
}
