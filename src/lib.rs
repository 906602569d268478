//! Lead Intake API Library
//!
//! Accepts lead submissions in loosely structured JSON, normalizes them into
//! a canonical lead, applies the eligibility policy and forwards eligible
//! leads to the partner API in the partner's shape.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `attribute_filter`: Whitelist filter for free-form lead attributes.
//! - `attribute_rules`: Partner attribute rule catalog.
//! - `config`: Configuration management.
//! - `eligibility`: Accept/reject business rules.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and routes.
//! - `ingestion`: The end-to-end ingestion pipeline.
//! - `models`: Canonical lead and ingestion result.
//! - `normalizer`: Submission normalization.
//! - `partner_client`: Partner API client.
//! - `partner_mapping`: Partner payload mapping.
//! - `schema`: Declarative field constraints.

pub mod api;
pub mod core;
pub mod integrations;

pub mod attribute_filter;
pub mod attribute_rules;
pub mod config;
pub mod eligibility;
pub mod errors;
pub mod handlers;
pub mod ingestion;
pub mod models;
pub mod normalizer;
pub mod partner_client;
pub mod partner_mapping;
pub mod schema;
