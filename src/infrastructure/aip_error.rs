//! Error types for airport lookups
//!
//! Every failure a caller of the lookup service can observe is one of these
//! variants. Missing fields on an otherwise reachable page are never errors;
//! they become sentinel values in the record instead.

use std::fmt;
use thiserror::Error;

/// Step of the navigation procedure that was running when a lookup failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationStage {
    OpenLanding,
    ResolveCurrentEdition,
    OpenEdition,
    ReachAirportPage,
}

impl NavigationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenLanding => "open landing page",
            Self::ResolveCurrentEdition => "resolve current edition",
            Self::OpenEdition => "open edition",
            Self::ReachAirportPage => "reach airport page",
        }
    }
}

impl fmt::Display for NavigationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone)]
pub enum AipError {
    #[error("Invalid airport code '{code}': {reason}")]
    InvalidAirportCode { code: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("No scraper registered for country '{country}' and no usable default")]
    UnsupportedCountry { country: String },

    #[error("Navigation failed for {code} while trying to {stage}: {}", .attempts.join("; "))]
    NavigationFailure {
        code: String,
        stage: NavigationStage,
        attempts: Vec<String>,
    },

    #[error("Failed to acquire page resource for {country}: {reason}")]
    ResourceInitFailure { country: String, reason: String },
}

impl AipError {
    pub fn invalid_airport_code(code: &str, reason: &str) -> Self {
        Self::InvalidAirportCode {
            code: code.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn unsupported_country(country: &str) -> Self {
        Self::UnsupportedCountry {
            country: country.to_string(),
        }
    }

    /// Navigation failure carrying a single recorded reason
    pub fn navigation(code: &str, stage: NavigationStage, reason: impl Into<String>) -> Self {
        Self::NavigationFailure {
            code: code.to_string(),
            stage,
            attempts: vec![reason.into()],
        }
    }

    /// Navigation failure listing every attempt that was made
    pub fn navigation_exhausted(code: &str, stage: NavigationStage, attempts: Vec<String>) -> Self {
        Self::NavigationFailure {
            code: code.to_string(),
            stage,
            attempts,
        }
    }

    pub fn resource_init(country: &str, reason: impl Into<String>) -> Self {
        Self::ResourceInitFailure {
            country: country.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the same lookup later could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidAirportCode { .. } => false,
            Self::Configuration { .. } => false,
            Self::UnsupportedCountry { .. } => false,
            Self::NavigationFailure { .. } => true,
            Self::ResourceInitFailure { .. } => true,
        }
    }

    /// Short machine-readable kind, used in CLI error output
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidAirportCode { .. } => "invalid_airport_code",
            Self::Configuration { .. } => "configuration",
            Self::UnsupportedCountry { .. } => "unsupported_country",
            Self::NavigationFailure { .. } => "navigation_failure",
            Self::ResourceInitFailure { .. } => "resource_init_failure",
        }
    }
}

pub type AipResult<T> = Result<T, AipError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_failure_lists_attempts() {
        let error = AipError::navigation_exhausted(
            "EVRA",
            NavigationStage::ReachAirportPage,
            vec!["click anchor: timed out".into(), "direct url: HTTP 404".into()],
        );
        let message = error.to_string();
        assert!(message.contains("EVRA"));
        assert!(message.contains("reach airport page"));
        assert!(message.contains("click anchor: timed out; direct url: HTTP 404"));
        assert!(error.is_recoverable());
        assert_eq!(error.kind(), "navigation_failure");
    }

    #[test]
    fn test_invalid_code_is_not_recoverable() {
        let error = AipError::invalid_airport_code("E1", "too short");
        assert!(!error.is_recoverable());
        assert_eq!(error.to_string(), "Invalid airport code 'E1': too short");
    }
}
