//! Declarative field constraints.
//!
//! Each canonical field lists the constraints it must satisfy; a
//! [`FieldValidator`] evaluates all of them and folds the failures into one
//! [`ValidationError`].

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::errors::ValidationError;

// local@domain.tld, the domain needs at least one dot
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .expect("email pattern is valid")
});

/// A single rule a string field must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// At least one non-whitespace character.
    NonEmpty,
    /// At least this many characters.
    MinLength(usize),
    /// Syntactically valid email address.
    Email,
    /// Exactly one of the listed values.
    OneOf(&'static [&'static str]),
}

impl Constraint {
    pub fn is_satisfied_by(&self, value: &str) -> bool {
        match self {
            Constraint::NonEmpty => !value.trim().is_empty(),
            Constraint::MinLength(min) => value.chars().count() >= *min,
            Constraint::Email => is_valid_email(value),
            Constraint::OneOf(allowed) => allowed.contains(&value),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::NonEmpty => write!(f, "must not be empty"),
            Constraint::MinLength(min) => write!(f, "must have at least {} characters", min),
            Constraint::Email => write!(f, "must be a valid email address"),
            Constraint::OneOf(allowed) => write!(f, "must be one of {}", allowed.join(", ")),
        }
    }
}

/// A field that failed one of its constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub constraint: Constraint,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.constraint)
    }
}

/// Collects violations across all fields of a record.
#[derive(Debug, Default)]
pub struct FieldValidator {
    violations: Vec<FieldViolation>,
}

impl FieldValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks `value` against `constraints`, recording the first one it fails.
    pub fn check(&mut self, field: &'static str, value: &str, constraints: &[Constraint]) {
        if let Some(failed) = constraints.iter().find(|c| !c.is_satisfied_by(value)) {
            self.violations.push(FieldViolation {
                field,
                constraint: failed.clone(),
            });
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                violations: self.violations,
            })
        }
    }
}

/// Syntactic email check (RFC 5322, simplified).
pub fn is_valid_email(email: &str) -> bool {
    email.len() >= 5 && EMAIL_RE.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("j@x.com"));
        assert!(is_valid_email("johndoe123@example.com"));
        assert!(is_valid_email("user+tag@example.co.uk"));
        assert!(is_valid_email("user_name@example-domain.com"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not_an_email"));
        assert!(!is_valid_email("missing@domain"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user @example.com"));
        assert!(!is_valid_email("user@exam ple.com"));
    }

    #[test]
    fn validator_reports_first_failed_constraint_per_field() {
        let mut validator = FieldValidator::new();
        validator.check("phone", "", &[Constraint::NonEmpty, Constraint::MinLength(3)]);
        validator.check("first_name", "John", &[Constraint::NonEmpty]);

        let err = validator.finish().unwrap_err();
        assert_eq!(err.violations.len(), 1);
        assert_eq!(err.violations[0].field, "phone");
        assert_eq!(err.violations[0].constraint, Constraint::NonEmpty);
    }

    #[test]
    fn one_of_is_exact_match() {
        let countries = Constraint::OneOf(&["de", "at", "ch"]);
        assert!(countries.is_satisfied_by("at"));
        assert!(!countries.is_satisfied_by("DE"));
        assert!(!countries.is_satisfied_by("fr"));
    }

    #[test]
    fn min_length_counts_characters() {
        assert!(Constraint::MinLength(4).is_satisfied_by("ü123"));
        assert!(!Constraint::MinLength(4).is_satisfied_by("123"));
    }

    #[test]
    fn empty_validator_passes() {
        assert!(FieldValidator::new().finish().is_ok());
    }
}
