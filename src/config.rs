use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

/// Institution marker a payload must contain to be accepted
pub const DEFAULT_MARKER: &str = "EIA";
/// Deferred validations older than this are rejected with a timeout
pub const DEFAULT_VALIDATION_TIMEOUT_MS: u64 = 5_000;
/// Registration only accepts addresses in this domain
pub const DEFAULT_EMAIL_DOMAIN: &str = "@eia.edu.co";
/// Minimum password length for registration
pub const DEFAULT_MIN_PASSWORD_LEN: usize = 8;

/// Errors from reading configuration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable was set but could not be parsed
    #[error("invalid value {value:?} for {name}")]
    InvalidValue {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },
    /// The marker would accept every non-empty payload
    #[error("marker must not be empty")]
    EmptyMarker,
    /// The email domain must start with '@'
    #[error("email domain {0:?} must start with '@'")]
    InvalidEmailDomain(String),
}

/// Runtime knobs for validation, sessions and registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Substring a payload must contain (case-sensitive)
    pub marker: String,
    /// Deadline for deferred validations, in milliseconds
    pub validation_timeout_ms: u64,
    /// Institutional email suffix, including the '@'
    pub email_domain: String,
    /// Minimum password length in characters
    pub min_password_len: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            validation_timeout_ms: DEFAULT_VALIDATION_TIMEOUT_MS,
            email_domain: DEFAULT_EMAIL_DOMAIN.to_string(),
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

impl ScanConfig {
    /// Read `EIAR_*` variables from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            marker: lookup("EIAR_MARKER").unwrap_or(defaults.marker),
            validation_timeout_ms: parse_var(
                &lookup,
                "EIAR_VALIDATION_TIMEOUT_MS",
                defaults.validation_timeout_ms,
            )?,
            email_domain: lookup("EIAR_EMAIL_DOMAIN")
                .map(|d| d.trim().to_lowercase())
                .unwrap_or(defaults.email_domain),
            min_password_len: parse_var(
                &lookup,
                "EIAR_MIN_PASSWORD_LEN",
                defaults.min_password_len,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values no component can work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.marker.is_empty() {
            return Err(ConfigError::EmptyMarker);
        }
        if !self.email_domain.starts_with('@') {
            return Err(ConfigError::InvalidEmailDomain(self.email_domain.clone()));
        }
        Ok(())
    }

    /// Process-wide configuration, read once. Bad values fall back to defaults.
    pub fn global() -> &'static ScanConfig {
        static GLOBAL: OnceLock<ScanConfig> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            Self::from_env().unwrap_or_else(|err| {
                tracing::warn!(%err, "ignoring EIAR_* environment, using defaults");
                Self::default()
            })
        })
    }

    /// Deferred validation deadline
    pub fn validation_timeout(&self) -> Duration {
        Duration::from_millis(self.validation_timeout_ms)
    }
}
