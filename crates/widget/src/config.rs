//! Widget configuration from host-page embed attributes.
//!
//! A host page activates the widget by placing an element carrying
//! `data-*` attributes with the job/location context. The embedder passes
//! those attributes through as a plain map; everything required must be
//! present before any network call is made.

use std::collections::HashMap;

/// A configuration failure detected before any network activity.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing embed attribute: {0}")]
    MissingAttribute(String),
    #[error("Embed attribute {0} must not be empty")]
    EmptyAttribute(String),
    /// The domain comes from the embedding page, not an attribute.
    #[error("Embedding page domain is required")]
    MissingDomain,
}

const DEFAULT_API_BASE: &str = "https://api.screener.example.com";
const DEFAULT_WS_BASE: &str = "wss://api.screener.example.com";

/// Everything the widget needs to bootstrap a session, resolved once at
/// activation and immutable afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetConfig {
    pub job_id: String,
    pub location: String,
    /// Hostname of the embedding page, used for domain validation.
    pub domain: String,
    pub api_base: String,
    pub ws_base: String,
}

impl WidgetConfig {
    /// Builds a config from the host element's attributes.
    ///
    /// `data-job-id` and `data-location` are required; `data-api-base` and
    /// `data-ws-base` override the production endpoints (useful for staging
    /// and for tests). `domain` comes from the embedding page itself, not
    /// from an attribute.
    pub fn from_attributes(
        attributes: &HashMap<String, String>,
        domain: &str,
    ) -> Result<Self, ConfigError> {
        let job_id = required(attributes, "data-job-id")?;
        let location = required(attributes, "data-location")?;
        if domain.is_empty() {
            return Err(ConfigError::MissingDomain);
        }

        let api_base = attributes
            .get("data-api-base")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let ws_base = attributes
            .get("data-ws-base")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_WS_BASE.to_string());

        Ok(Self {
            job_id,
            location,
            domain: domain.to_string(),
            api_base,
            ws_base,
        })
    }
}

fn required(attributes: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    let value = attributes
        .get(key)
        .ok_or_else(|| ConfigError::MissingAttribute(key.to_string()))?;
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyAttribute(key.to_string()));
    }
    Ok(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn minimal_attributes_use_default_endpoints() {
        let config = WidgetConfig::from_attributes(
            &attrs(&[("data-job-id", "cashier_ft"), ("data-location", "Springfield, IL")]),
            "jobs.example.com",
        )
        .unwrap();

        assert_eq!(config.job_id, "cashier_ft");
        assert_eq!(config.location, "Springfield, IL");
        assert_eq!(config.domain, "jobs.example.com");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.ws_base, DEFAULT_WS_BASE);
    }

    #[test]
    fn missing_job_id_fails_before_any_network_call() {
        let err = WidgetConfig::from_attributes(
            &attrs(&[("data-location", "Springfield, IL")]),
            "jobs.example.com",
        )
        .unwrap_err();
        assert_eq!(format!("{}", err), "Missing embed attribute: data-job-id");
    }

    #[test]
    fn blank_location_is_rejected() {
        let err = WidgetConfig::from_attributes(
            &attrs(&[("data-job-id", "cashier_ft"), ("data-location", "  ")]),
            "jobs.example.com",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyAttribute(key) if key == "data-location"));
    }

    #[test]
    fn endpoint_overrides_strip_trailing_slash() {
        let config = WidgetConfig::from_attributes(
            &attrs(&[
                ("data-job-id", "cook_pt"),
                ("data-location", "Springfield, IL"),
                ("data-api-base", "http://localhost:8000/"),
                ("data-ws-base", "ws://localhost:8000/"),
            ]),
            "localhost",
        )
        .unwrap();
        assert_eq!(config.api_base, "http://localhost:8000");
        assert_eq!(config.ws_base, "ws://localhost:8000");
    }

    #[test]
    fn empty_domain_is_rejected() {
        let err = WidgetConfig::from_attributes(
            &attrs(&[("data-job-id", "cook_pt"), ("data-location", "Springfield, IL")]),
            "",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingDomain));
        assert_eq!(format!("{}", err), "Embedding page domain is required");
    }
}
