//! Partner attribute rules.
//!
//! The partner publishes which free-form lead attributes it accepts, keyed by
//! attribute name:
//!
//! ```json
//! {
//!   "roof_type": { "attribute_type": "dropdown", "is_numeric": false, "values": ["flat", "pitched"] },
//!   "roof_area": { "attribute_type": "number", "is_numeric": true, "values": null }
//! }
//! ```
//!
//! The catalog is read once and never mutated afterwards, so it is shared by
//! reference between concurrent requests.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::errors::CatalogLoadError;

/// Kind of input the partner renders for an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// Fixed list of allowed values.
    Dropdown,
    /// Anything else (text, number, checkbox, ...).
    #[default]
    #[serde(other)]
    Other,
}

/// Typing rule for one attribute key.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AttributeRule {
    #[serde(default)]
    pub attribute_type: AttributeType,
    #[serde(default)]
    pub is_numeric: bool,
    /// Allowed values for dropdowns, in the partner's order.
    #[serde(default)]
    pub values: Option<Vec<String>>,
}

impl AttributeRule {
    pub fn dropdown<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            attribute_type: AttributeType::Dropdown,
            is_numeric: false,
            values: Some(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn numeric() -> Self {
        Self {
            is_numeric: true,
            ..Self::default()
        }
    }

    pub fn free_form() -> Self {
        Self::default()
    }

    /// The allowed-value set, when this rule is a dropdown with a non-empty one.
    pub fn dropdown_values(&self) -> Option<&[String]> {
        match (&self.attribute_type, &self.values) {
            (AttributeType::Dropdown, Some(values)) if !values.is_empty() => Some(values),
            _ => None,
        }
    }
}

/// Attribute rules keyed by attribute name.
#[derive(Debug, Clone, Default)]
pub struct AttributeRuleCatalog {
    rules: HashMap<String, AttributeRule>,
}

impl AttributeRuleCatalog {
    /// A catalog without rules; every attribute is dropped against it.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogLoadError> {
        let rules: HashMap<String, AttributeRule> = serde_json::from_str(raw)?;
        Ok(Self { rules })
    }

    pub fn load(path: &Path) -> Result<Self, CatalogLoadError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn get(&self, key: &str) -> Option<&AttributeRule> {
        self.rules.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, AttributeRule)> for AttributeRuleCatalog {
    fn from_iter<T: IntoIterator<Item = (K, AttributeRule)>>(iter: T) -> Self {
        Self {
            rules: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Lazily loaded catalog owned by the application state.
///
/// The first call to [`CatalogSource::catalog`] reads the rule file. A missing
/// or malformed file is logged and replaced by an empty catalog for the rest
/// of the process lifetime; the service keeps accepting leads, only without
/// lead attributes.
#[derive(Debug)]
pub struct CatalogSource {
    path: Option<PathBuf>,
    catalog: OnceLock<AttributeRuleCatalog>,
}

impl CatalogSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            catalog: OnceLock::new(),
        }
    }

    /// Wraps an already built catalog; nothing is read from disk.
    pub fn preloaded(catalog: AttributeRuleCatalog) -> Self {
        Self {
            path: None,
            catalog: OnceLock::from(catalog),
        }
    }

    pub fn catalog(&self) -> &AttributeRuleCatalog {
        self.catalog.get_or_init(|| {
            let Some(path) = self.path.as_deref() else {
                return AttributeRuleCatalog::empty();
            };

            match AttributeRuleCatalog::load(path) {
                Ok(catalog) => {
                    tracing::info!(
                        "✓ Loaded {} partner attribute rules from {}",
                        catalog.len(),
                        path.display()
                    );
                    catalog
                }
                Err(e) => {
                    tracing::error!("Attribute rules unavailable, dropping all lead attributes: {}", e);
                    AttributeRuleCatalog::empty()
                }
            }
        })
    }
}
