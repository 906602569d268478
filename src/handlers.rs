use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::Config;
use crate::errors::AppError;
use crate::ingestion::IngestionPipeline;
use crate::models::IngestionResult;

/// Largest accepted submission body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Normalization, eligibility and forwarding for one submission.
    pub pipeline: IngestionPipeline,
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// `GET /` sends browsers to the API docs.
pub async fn root() -> Redirect {
    Redirect::temporary("/docs")
}

/// Serves the OpenAPI specification YAML file.
///
/// Reads `openapi.yml` from the working directory; 404 when it is missing.
pub async fn serve_openapi_spec() -> impl IntoResponse {
    match tokio::fs::read_to_string("openapi.yml").await {
        Ok(content) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/yaml")],
            content,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "OpenAPI spec not found").into_response(),
    }
}

/// Serves a Swagger UI page pointed at `serve_openapi_spec`.
pub async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Lead Intake API - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.yml",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

/// POST /api/v1/leads/ingest
///
/// Authenticates the caller, then runs the submission through the ingestion
/// pipeline. The response body is always an [`IngestionResult`] once the
/// caller is authenticated and the body is JSON.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `headers` - Request headers carrying `Authorization: Bearer <token>`.
/// * `body` - The raw submission, nested or flat shape.
pub async fn ingest_lead(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<IngestionResult>, AppError> {
    validate_bearer(&state.config, &headers)?;

    let Json(raw) = body.map_err(|e| AppError::PayloadRejected {
        status: e.status(),
        message: e.body_text(),
    })?;

    tracing::info!("POST /leads/ingest");
    Ok(Json(state.pipeline.ingest(&raw).await))
}

/// Checks `Authorization: Bearer <token>` against the configured secret.
fn validate_bearer(config: &Config, headers: &HeaderMap) -> Result<(), AppError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?;

    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or_else(|| AppError::Unauthorized("Malformed Authorization header".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::Unauthorized(format!(
            "Unsupported auth scheme '{}'",
            scheme
        )));
    }

    if !tokens_match(token.trim(), &config.bearer_token) {
        return Err(AppError::Unauthorized("Invalid bearer token".to_string()));
    }

    Ok(())
}

/// Compares SHA-256 digests in constant time, so neither the content nor the
/// length of the secret leaks through timing.
fn tokens_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Routes that bypass auth and rate limiting.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.yml", get(serve_openapi_spec))
}

/// Authenticated ingestion routes, with the body size limit applied.
pub fn ingest_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/leads/ingest", post(ingest_lead))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
}

/// Complete application without rate limiting.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(ingest_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn config(token: &str) -> Config {
        Config {
            port: 3000,
            bearer_token: token.to_string(),
            partner_token: token.to_string(),
            partner_base_url: "https://example.com".to_string(),
            partner_user_id: "op".to_string(),
            send_to_partner: false,
            request_timeout: std::time::Duration::from_secs(1),
            eligible_postal_prefix: "66".to_string(),
            attribute_rules_path: "unused.json".into(),
        }
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            HeaderValue::from_str(value).unwrap(),
        );
        headers
    }

    #[test]
    fn test_bearer_accepts_matching_token() {
        assert!(validate_bearer(&config("s3cret"), &headers("Bearer s3cret")).is_ok());
        assert!(validate_bearer(&config("s3cret"), &headers("bearer s3cret")).is_ok());
    }

    #[test]
    fn test_bearer_rejects_bad_credentials() {
        let cfg = config("s3cret");
        assert!(validate_bearer(&cfg, &HeaderMap::new()).is_err());
        assert!(validate_bearer(&cfg, &headers("Bearer wrong")).is_err());
        assert!(validate_bearer(&cfg, &headers("Basic s3cret")).is_err());
        assert!(validate_bearer(&cfg, &headers("s3cret")).is_err());
        assert!(validate_bearer(&cfg, &headers("Bearer s3cret-but-longer")).is_err());
    }

    #[test]
    fn test_tokens_match() {
        assert!(tokens_match("abc", "abc"));
        assert!(!tokens_match("abc", "abd"));
        assert!(!tokens_match("", "abc"));
    }
}
