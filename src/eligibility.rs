//! Accept/reject rules applied to canonical leads.

use crate::models::{CanonicalLead, Reason};

/// Postal code prefix served by the partner unless configured otherwise.
pub const DEFAULT_ELIGIBLE_POSTAL_PREFIX: &str = "66";

/// One business rule. Rules are checked in list order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilityRule {
    /// The postal code must start with this prefix.
    PostalCodePrefix(String),
    /// The submitter must own the house.
    HouseOwner,
}

impl EligibilityRule {
    fn check(&self, lead: &CanonicalLead) -> Result<(), Reason> {
        match self {
            EligibilityRule::PostalCodePrefix(prefix) => {
                if lead.postal_code().starts_with(prefix.as_str()) {
                    Ok(())
                } else {
                    Err(Reason::ZipcodeNotAllowed)
                }
            }
            EligibilityRule::HouseOwner => {
                if lead.is_house_owner() {
                    Ok(())
                } else {
                    Err(Reason::NotHouseOwner)
                }
            }
        }
    }
}

/// Result of evaluating the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub accepted: bool,
    pub reason: Option<Reason>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityPolicy {
    rules: Vec<EligibilityRule>,
}

impl EligibilityPolicy {
    /// Postal code prefix first, then house ownership.
    pub fn new(eligible_postal_prefix: impl Into<String>) -> Self {
        Self {
            rules: vec![
                EligibilityRule::PostalCodePrefix(eligible_postal_prefix.into()),
                EligibilityRule::HouseOwner,
            ],
        }
    }

    /// Appends a rule after the existing ones.
    pub fn with_rule(mut self, rule: EligibilityRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[EligibilityRule] {
        &self.rules
    }

    /// The first failing rule decides the reason.
    pub fn evaluate(&self, lead: &CanonicalLead) -> Decision {
        match self.rules.iter().try_for_each(|rule| rule.check(lead)) {
            Ok(()) => Decision {
                accepted: true,
                reason: None,
            },
            Err(reason) => Decision {
                accepted: false,
                reason: Some(reason),
            },
        }
    }
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_ELIGIBLE_POSTAL_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeadDraft;

    fn lead(postal_code: &str, is_house_owner: bool) -> CanonicalLead {
        LeadDraft {
            first_name: "Max".to_string(),
            last_name: "P".to_string(),
            email: "max@example.com".to_string(),
            phone: "+491234".to_string(),
            postal_code: postal_code.to_string(),
            is_house_owner,
            street: "Street".to_string(),
            house_number: Some("1".to_string()),
            city: Some("X".to_string()),
            country: "de".to_string(),
            product_name: "solar".to_string(),
            ..LeadDraft::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_accepts_zip_66_owner_true() {
        let decision = EligibilityPolicy::default().evaluate(&lead("66123", true));
        assert!(decision.accepted);
        assert_eq!(decision.reason, None);
    }

    #[test]
    fn test_rejects_wrong_zip() {
        let decision = EligibilityPolicy::default().evaluate(&lead("70123", true));
        assert!(!decision.accepted);
        assert_eq!(decision.reason, Some(Reason::ZipcodeNotAllowed));
    }

    #[test]
    fn test_zip_checked_before_ownership() {
        let decision = EligibilityPolicy::default().evaluate(&lead("70123", false));
        assert_eq!(decision.reason, Some(Reason::ZipcodeNotAllowed));
    }

    #[test]
    fn test_rejects_non_owner() {
        let decision = EligibilityPolicy::default().evaluate(&lead("66123", false));
        assert!(!decision.accepted);
        assert_eq!(decision.reason, Some(Reason::NotHouseOwner));
    }

    #[test]
    fn test_configured_prefix() {
        let policy = EligibilityPolicy::new("70");
        assert!(policy.evaluate(&lead("70123", true)).accepted);
        assert!(!policy.evaluate(&lead("66123", true)).accepted);
    }

    #[test]
    fn test_appended_rule_runs_last() {
        let policy = EligibilityPolicy::default()
            .with_rule(EligibilityRule::PostalCodePrefix("661".to_string()));
        assert_eq!(policy.rules().len(), 3);

        let decision = policy.evaluate(&lead("66200", false));
        assert_eq!(decision.reason, Some(Reason::NotHouseOwner));

        let decision = policy.evaluate(&lead("66200", true));
        assert_eq!(decision.reason, Some(Reason::ZipcodeNotAllowed));
    }
}
