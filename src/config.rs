use std::path::PathBuf;
use std::time::Duration;

use crate::eligibility::DEFAULT_ELIGIBLE_POSTAL_PREFIX;

const DEFAULT_PARTNER_BASE_URL: &str = "https://contactapi.static.fyi";
const DEFAULT_ATTRIBUTE_RULES_PATH: &str = "resources/partner_attribute_rules.json";
const DEFAULT_REQUEST_TIMEOUT_SECONDS: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Secret expected in the inbound `Authorization: Bearer` header.
    pub bearer_token: String,
    /// Bearer token sent to the partner.
    pub partner_token: String,
    pub partner_base_url: String,
    /// Operator identifier in the partner intake path.
    pub partner_user_id: String,
    pub send_to_partner: bool,
    pub request_timeout: Duration,
    pub eligible_postal_prefix: String,
    pub attribute_rules_path: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let bearer_token = std::env::var("BEARER_TOKEN")
            .map_err(|_| anyhow::anyhow!("BEARER_TOKEN environment variable required"))
            .and_then(|token| {
                if token.trim().is_empty() {
                    anyhow::bail!("BEARER_TOKEN cannot be empty");
                }
                Ok(token)
            })?;

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            partner_token: non_empty_var("PARTNER_TOKEN").unwrap_or_else(|| bearer_token.clone()),
            bearer_token,
            partner_base_url: validate_http_url(
                "PARTNER_BASE_URL",
                non_empty_var("PARTNER_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_PARTNER_BASE_URL.to_string()),
            )?,
            partner_user_id: non_empty_var("PARTNER_USER_ID")
                .or_else(|| non_empty_var("USER_ID"))
                .ok_or_else(|| {
                    anyhow::anyhow!("PARTNER_USER_ID or USER_ID environment variable required")
                })?,
            send_to_partner: match non_empty_var("SEND_TO_PARTNER")
                .or_else(|| non_empty_var("SEND_TO_CUSTOMER"))
            {
                Some(raw) => parse_bool(&raw)
                    .ok_or_else(|| anyhow::anyhow!("SEND_TO_PARTNER must be true or false"))?,
                None => true,
            },
            request_timeout: match non_empty_var("REQUEST_TIMEOUT_SECONDS") {
                Some(raw) => parse_timeout(&raw)?,
                None => Duration::from_secs_f64(DEFAULT_REQUEST_TIMEOUT_SECONDS),
            },
            eligible_postal_prefix: non_empty_var("ELIGIBLE_POSTAL_PREFIX")
                .unwrap_or_else(|| DEFAULT_ELIGIBLE_POSTAL_PREFIX.to_string()),
            attribute_rules_path: non_empty_var("ATTRIBUTE_RULES_PATH")
                .unwrap_or_else(|| DEFAULT_ATTRIBUTE_RULES_PATH.to_string())
                .into(),
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Partner Base URL: {}", config.partner_base_url);
        tracing::debug!("Send to partner: {}", config.send_to_partner);
        tracing::debug!("Request timeout: {:?}", config.request_timeout);
        tracing::debug!("Attribute rules: {}", config.attribute_rules_path.display());
        tracing::debug!("Server Port: {}", config.port);
        if !config.send_to_partner {
            tracing::warn!("SEND_TO_PARTNER is off: eligible leads will not be forwarded");
        }

        Ok(config)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn validate_http_url(name: &str, value: String) -> anyhow::Result<String> {
    let url = url::Url::parse(&value)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(value)
}

/// Accepts true/false, 1/0, yes/no, on/off in any case.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_timeout(raw: &str) -> anyhow::Result<Duration> {
    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("REQUEST_TIMEOUT_SECONDS must be a number"))?;
    if !seconds.is_finite() || seconds <= 0.0 {
        anyhow::bail!("REQUEST_TIMEOUT_SECONDS must be greater than zero");
    }
    Ok(Duration::from_secs_f64(seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_variants() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" off "), Some(false));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("2.5").unwrap(), Duration::from_millis(2500));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("-1").is_err());
        assert!(parse_timeout("soon").is_err());
    }

    #[test]
    fn test_url_scheme_check() {
        assert!(validate_http_url("X", "https://contactapi.static.fyi".to_string()).is_ok());
        assert!(validate_http_url("X", "ftp://example.com".to_string()).is_err());
        assert!(validate_http_url("X", "not a url".to_string()).is_err());
    }
}
