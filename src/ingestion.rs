//! Ingestion pipeline: normalize → filter → evaluate → map → forward.
//!
//! Every path ends in exactly one [`IngestionResult`]; no error leaves this
//! module.

use serde_json::Value;

use crate::attribute_rules::CatalogSource;
use crate::config::Config;
use crate::eligibility::{Decision, EligibilityPolicy};
use crate::errors::AppError;
use crate::models::{IngestionResult, Reason};
use crate::normalizer::normalize_lead;
use crate::partner_client::PartnerClient;
use crate::partner_mapping::map_to_partner_payload;

pub struct IngestionPipeline {
    catalog: CatalogSource,
    policy: EligibilityPolicy,
    partner: PartnerClient,
}

impl IngestionPipeline {
    pub fn new(catalog: CatalogSource, policy: EligibilityPolicy, partner: PartnerClient) -> Self {
        Self {
            catalog,
            policy,
            partner,
        }
    }

    /// Wires the pipeline from configuration. The rule file is read by
    /// [`Self::warm_catalog`] or, failing that, on the first request.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self::new(
            CatalogSource::from_path(config.attribute_rules_path.clone()),
            EligibilityPolicy::new(config.eligible_postal_prefix.clone()),
            PartnerClient::from_config(config)?,
        ))
    }

    /// Loads the attribute rules now so no request pays for the file read.
    /// Returns the number of rules available.
    pub fn warm_catalog(&self) -> usize {
        self.catalog.catalog().len()
    }

    pub async fn ingest(&self, raw: &Value) -> IngestionResult {
        let lead = match normalize_lead(raw, self.catalog.catalog()) {
            Ok(lead) => lead,
            Err(e) => {
                tracing::warn!("❌ {}", e);
                return IngestionResult::rejected(Reason::LeadValidationFailed);
            }
        };

        if let Decision {
            accepted: false,
            reason: Some(reason),
        } = self.policy.evaluate(&lead)
        {
            tracing::info!(
                "Lead rejected reason={} zipcode={} email={}",
                reason,
                lead.postal_code(),
                lead.email()
            );
            return IngestionResult::rejected(reason);
        }

        let payload = match map_to_partner_payload(&lead) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!("Canonical lead failed partner mapping: {}", e);
                return IngestionResult::rejected(Reason::LeadValidationFailed);
            }
        };

        let outcome = self.partner.forward(&payload).await;
        if !outcome.ok {
            tracing::error!(
                "Lead accepted but forwarding failed status_code={:?} email={}",
                outcome.status_code,
                lead.email()
            );
            return IngestionResult::forward_failed(outcome.status_code);
        }

        tracing::info!(
            "✅ Lead accepted and forwarded email={} zipcode={}",
            lead.email(),
            lead.postal_code()
        );
        IngestionResult::forwarded(outcome.status_code)
    }
}
