//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check upstream endpoints parse as http/https URLs
//! - Validate value ranges (timeouts > 0)
//! - Reject fixed outbound header values that cannot be sent
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.upstream.api_base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            if url.host_str().is_none() {
                errors.push(ValidationError::new("upstream.api_base_url", "missing host"));
            }
        }
        Ok(url) => errors.push(ValidationError::new(
            "upstream.api_base_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("upstream.api_base_url", e.to_string())),
    }

    let domain = &config.upstream.audio_domain;
    if domain.is_empty() {
        errors.push(ValidationError::new("upstream.audio_domain", "must not be empty"));
    } else if domain.starts_with('.') || domain.ends_with('.') {
        errors.push(ValidationError::new(
            "upstream.audio_domain",
            "must not start or end with '.'",
        ));
    }

    if HeaderValue::from_str(&config.upstream.audio_referer).is_err() {
        errors.push(ValidationError::new(
            "upstream.audio_referer",
            "not a valid header value",
        ));
    }
    if HeaderValue::from_str(&config.upstream.default_user_agent).is_err() {
        errors.push(ValidationError::new(
            "upstream.default_user_agent",
            "not a valid header value",
        ));
    }

    let document = &config.static_files.default_document;
    if document.is_empty()
        || document == "."
        || document == ".."
        || document.contains('/')
        || document.contains('\\')
    {
        errors.push(ValidationError::new(
            "static_files.default_document",
            "must be a plain file name",
        ));
    }

    if config.timeouts.upstream_secs == Some(0) {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be greater than 0"));
    }
    if config.timeouts.connect_secs == Some(0) {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "not a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
