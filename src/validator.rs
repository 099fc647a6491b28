//! Payload validation policy.
//!
//! The rule is intentionally simple: an empty payload is unreadable, anything
//! containing the institution marker is accepted, everything else is not
//! recognized. It offers no tamper resistance.

use crate::config::{ConfigError, DEFAULT_MARKER, ScanConfig};
use crate::models::{RejectionReason, ValidationVerdict};
use rayon::prelude::*;

/// Maps decoded payloads to verdicts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validator {
    marker: String,
}

impl Validator {
    /// Validator using the default `"EIA"` marker
    pub fn new() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
        }
    }

    /// Validator with a custom marker. The marker must not be empty.
    pub fn with_marker(marker: impl Into<String>) -> Result<Self, ConfigError> {
        let marker = marker.into();
        if marker.is_empty() {
            return Err(ConfigError::EmptyMarker);
        }
        Ok(Self { marker })
    }

    /// Validator configured from `config`
    pub fn from_config(config: &ScanConfig) -> Result<Self, ConfigError> {
        Self::with_marker(config.marker.clone())
    }

    /// The substring payloads must contain
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Validate one decoded payload
    ///
    /// # Arguments
    /// * `payload` - Decoded text, or `None` when the capture yielded nothing
    ///
    /// # Returns
    /// A verdict. `None` and `""` are rejected as empty or unreadable; a
    /// payload containing the marker (case-sensitive) is accepted; anything
    /// else is rejected as not recognized. Never fails.
    pub fn validate(&self, payload: Option<&str>) -> ValidationVerdict {
        match payload {
            None | Some("") => ValidationVerdict::reject("", RejectionReason::EmptyOrUnreadable),
            Some(p) if p.contains(self.marker.as_str()) => ValidationVerdict::accept(p),
            Some(p) => ValidationVerdict::reject(p, RejectionReason::NotRecognized),
        }
    }

    /// Validate many payloads in parallel, preserving input order
    pub fn validate_batch<S>(&self, payloads: &[S]) -> Vec<ValidationVerdict>
    where
        S: AsRef<str> + Sync,
    {
        payloads
            .par_iter()
            .map(|p| self.validate(Some(p.as_ref())))
            .collect()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate with the default marker
pub fn validate(payload: Option<&str>) -> ValidationVerdict {
    Validator::new().validate(payload)
}
