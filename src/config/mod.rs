//! Adapter configuration.
//!
//! # Design Decisions
//! - Config is immutable once built; all fields have defaults so a
//!   minimal config is the empty one
//! - Validation separates syntactic (serde) from semantic checks and
//!   happens once at load, never per request
//! - The per-call [`HeaderFilter`] parameter stays the primary
//!   configuration surface; this struct is the file-loadable convenience
//!   on top of it

use std::sync::Arc;

use axum::http::header::HeaderName;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entry::{EntryPoint, NoopEntryPoint, TracingEntryPoint};
use crate::kernel::{is_kernel_header, HeaderFilter};

/// Tracing adapter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Whether tracing is active. Disabled yields a noop entry point;
    /// requests still flow, spans track nothing.
    pub enabled: bool,

    /// Header consulted for an upstream trace id.
    pub propagation_header: String,

    /// Base URL under which traces can be viewed.
    pub viewer_base_url: Option<String>,

    /// Extra header names excluded from kernels on top of the default
    /// redaction policy.
    pub redact_headers: Vec<String>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            propagation_header: crate::entry::tracing::DEFAULT_PROPAGATION_HEADER.to_string(),
            viewer_base_url: None,
            redact_headers: Vec::new(),
        }
    }
}

/// Semantic configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("propagation header name is empty")]
    EmptyHeaderName,

    #[error("invalid header name `{0}`")]
    InvalidHeaderName(String),
}

impl TraceConfig {
    /// Semantic validation of header names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_header_name(&self.propagation_header)?;
        for name in &self.redact_headers {
            validate_header_name(name)?;
        }
        Ok(())
    }

    /// Kernel filter combining the default redaction policy with any
    /// configured extra exclusions.
    pub fn header_filter(&self) -> HeaderFilter {
        if self.redact_headers.is_empty() {
            return HeaderFilter::default();
        }
        let extra: Vec<String> = self
            .redact_headers
            .iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();
        HeaderFilter::new(move |name| {
            is_kernel_header(name) && !extra.iter().any(|e| name.eq_ignore_ascii_case(e))
        })
    }

    /// Build the entry point this configuration describes.
    pub fn entry_point(&self) -> Arc<dyn EntryPoint> {
        if !self.enabled {
            return Arc::new(NoopEntryPoint);
        }
        let mut entry = TracingEntryPoint::new().with_propagation_header(&self.propagation_header);
        if let Some(base) = &self.viewer_base_url {
            entry = entry.with_viewer_base(base);
        }
        Arc::new(entry)
    }
}

fn validate_header_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::EmptyHeaderName);
    }
    HeaderName::from_bytes(name.as_bytes())
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidHeaderName(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TraceConfig::default();
        assert!(config.enabled);
        assert_eq!(config.propagation_header, "x-trace-id");
        assert!(config.viewer_base_url.is_none());
        assert!(config.redact_headers.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_minimal_config_deserializes() {
        let config: TraceConfig = serde_json::from_str("{}").unwrap();
        assert!(config.enabled);
        assert_eq!(config.propagation_header, "x-trace-id");
    }

    #[test]
    fn test_invalid_header_name_rejected() {
        let config = TraceConfig {
            propagation_header: "not a header".to_string(),
            ..TraceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidHeaderName(_))
        ));

        let config = TraceConfig {
            propagation_header: String::new(),
            ..TraceConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyHeaderName)));
    }

    #[test]
    fn test_extra_redactions_compose_with_default_policy() {
        let config = TraceConfig {
            redact_headers: vec!["X-Api-Key".to_string()],
            ..TraceConfig::default()
        };
        let filter = config.header_filter();

        assert!(!filter.allows("x-api-key"));
        assert!(!filter.allows("X-API-KEY"));
        assert!(!filter.allows("authorization"));
        assert!(filter.allows("x-trace-id"));
    }

    #[test]
    fn test_disabled_config_yields_noop_entry_point() {
        let config = TraceConfig {
            enabled: false,
            ..TraceConfig::default()
        };
        let entry = config.entry_point();
        let guard = entry.continue_or_root("/", &crate::kernel::Kernel::default());
        assert!(guard.span().trace_id().is_none());
    }
}
