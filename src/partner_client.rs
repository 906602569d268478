use std::time::Duration;

use crate::config::Config;
use crate::errors::AppError;
use crate::partner_mapping::PartnerPayload;

/// How a forwarding attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardOutcome {
    /// 2xx response, or forwarding disabled.
    pub ok: bool,
    /// Status of the partner response; `None` if nothing came back.
    pub status_code: Option<u16>,
}

impl ForwardOutcome {
    fn skipped() -> Self {
        Self {
            ok: true,
            status_code: None,
        }
    }

    fn transport_failure() -> Self {
        Self {
            ok: false,
            status_code: None,
        }
    }

    fn from_status(status: reqwest::StatusCode) -> Self {
        Self {
            ok: status.is_success(),
            status_code: Some(status.as_u16()),
        }
    }
}

/// Client for the partner's lead intake API.
///
/// Sends exactly one POST per accepted lead and never retries.
#[derive(Clone)]
pub struct PartnerClient {
    client: reqwest::Client,
    base_url: String,
    user_id: String,
    token: String,
    enabled: bool,
}

impl PartnerClient {
    /// Creates a new `PartnerClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The partner API base URL.
    /// * `user_id` - Operator identifier embedded in the intake path.
    /// * `token` - Bearer token sent with every request.
    /// * `timeout` - Upper bound for one request, connect included.
    /// * `enabled` - When false, `forward` reports success without sending.
    pub fn new(
        base_url: String,
        user_id: String,
        token: String,
        timeout: Duration,
        enabled: bool,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create partner client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id,
            token,
            enabled,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.partner_base_url.clone(),
            config.partner_user_id.clone(),
            config.partner_token.clone(),
            config.request_timeout,
            config.send_to_partner,
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Intake endpoint for this operator.
    pub fn lead_url(&self) -> String {
        format!("{}/lead/receive/fake/{}/", self.base_url, self.user_id)
    }

    /// Posts `payload` to the partner and classifies the result.
    ///
    /// Transport errors and timeouts yield `ok = false` without a status;
    /// any HTTP response yields its status, `ok` iff 2xx. The body is ignored.
    pub async fn forward(&self, payload: &PartnerPayload) -> ForwardOutcome {
        if !self.enabled {
            tracing::info!("Partner forwarding disabled, skipping send");
            return ForwardOutcome::skipped();
        }

        let url = self.lead_url();
        tracing::debug!("Forwarding lead to partner: {}", url);

        let response = match self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .json(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Partner API request failed: {}", e);
                return ForwardOutcome::transport_failure();
            }
        };

        let outcome = ForwardOutcome::from_status(response.status());
        if outcome.ok {
            tracing::info!("✓ Partner accepted lead ({})", response.status());
        } else {
            tracing::warn!("Partner rejected lead with status {}", response.status());
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> PartnerClient {
        PartnerClient::new(
            base_url.to_string(),
            "op-42".to_string(),
            "token".to_string(),
            Duration::from_secs(1),
            true,
        )
        .unwrap()
    }

    #[test]
    fn test_client_creation() {
        assert!(client("https://example.com").is_enabled());
    }

    #[test]
    fn test_lead_url_embeds_operator() {
        assert_eq!(
            client("https://example.com/").lead_url(),
            "https://example.com/lead/receive/fake/op-42/"
        );
    }

    #[test]
    fn test_status_classification() {
        assert!(ForwardOutcome::from_status(reqwest::StatusCode::CREATED).ok);
        let outcome = ForwardOutcome::from_status(reqwest::StatusCode::BAD_REQUEST);
        assert!(!outcome.ok);
        assert_eq!(outcome.status_code, Some(400));
        assert!(!ForwardOutcome::from_status(reqwest::StatusCode::MULTIPLE_CHOICES).ok);
    }
}
