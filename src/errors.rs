use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

use crate::schema::FieldViolation;

/// Errors surfaced at the HTTP boundary.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Error interacting with an external API.
    ExternalApiError(String),
    /// Missing or mismatched bearer token.
    Unauthorized(String),
    /// Request body refused before parsing (size, content type, syntax).
    PayloadRejected { status: StatusCode, message: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::PayloadRejected { status, message } => {
                write!(f, "Payload rejected ({}): {}", status, message)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Maps each variant to a status code and a `{"error": ...}` body.
    ///
    /// Detail is logged, never returned to the caller.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "External service error".to_string(),
                )
            }
            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized access: {}", msg);
                (StatusCode::UNAUTHORIZED, "unauthorized".to_string())
            }
            AppError::PayloadRejected { status, message } => (*status, message.clone()),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// A submission that could not be turned into a canonical lead.
///
/// Carries every violated constraint, not just the first one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// True when any violation concerns `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lead validation failed: ")?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The canonical lead violates a partner-side constraint.
///
/// Normalization already enforces a superset of these rules, so this only
/// fires if the two drift apart.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "partner payload invalid at '{}': {}",
            self.field, self.message
        )
    }
}

impl std::error::Error for MappingError {}

/// Failure to read or parse the attribute rule document.
#[derive(Debug)]
pub enum CatalogLoadError {
    /// The rule file could not be read.
    Io {
        path: String,
        source: std::io::Error,
    },
    /// The rule document is not valid JSON of the expected shape.
    Parse(serde_json::Error),
}

impl fmt::Display for CatalogLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogLoadError::Io { path, source } => {
                write!(f, "cannot read attribute rules at {}: {}", path, source)
            }
            CatalogLoadError::Parse(e) => write!(f, "malformed attribute rules: {}", e),
        }
    }
}

impl std::error::Error for CatalogLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogLoadError::Io { source, .. } => Some(source),
            CatalogLoadError::Parse(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for CatalogLoadError {
    fn from(err: serde_json::Error) -> Self {
        CatalogLoadError::Parse(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Constraint;

    #[test]
    fn validation_error_lists_every_violation() {
        let err = ValidationError {
            violations: vec![
                FieldViolation {
                    field: "email",
                    constraint: Constraint::Email,
                },
                FieldViolation {
                    field: "phone",
                    constraint: Constraint::MinLength(3),
                },
            ],
        };

        let text = err.to_string();
        assert!(text.contains("email"));
        assert!(text.contains("phone"));
        assert!(err.mentions("phone"));
        assert!(!err.mentions("street"));
    }

    #[test]
    fn unauthorized_maps_to_401() {
        let response = AppError::Unauthorized("missing token".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn payload_rejection_keeps_its_status() {
        let response = AppError::PayloadRejected {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "length limit exceeded".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
