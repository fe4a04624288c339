//! Error types for the simulation framework

use thiserror::Error;

/// Top-level error type for simulation operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("Event error: {0}")]
    Event(#[from] EventError),

    #[error("Invalid capacity: server count must be at least 1 (got {server_count})")]
    InvalidCapacity { server_count: usize },

    #[error("Invalid rate: {parameter} must be positive and finite (got {value})")]
    InvalidRate { parameter: &'static str, value: f64 },

    #[error("Invalid horizon: must be positive and finite (got {horizon})")]
    InvalidHorizon { horizon: f64 },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Run with {server_count} server(s) produced no completed entity")]
    EmptyRun { server_count: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SimError {
    /// Whether the error is a configuration problem detected before any event
    /// was scheduled.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SimError::InvalidCapacity { .. }
                | SimError::InvalidRate { .. }
                | SimError::InvalidHorizon { .. }
                | SimError::Configuration(_)
        )
    }
}

/// Errors related to event scheduling and handling
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EventError {
    #[error("Invalid scheduling delay: {delay} (must be finite and non-negative)")]
    InvalidDelay { delay: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SimError::InvalidCapacity { server_count: 0 };
        assert_eq!(
            err.to_string(),
            "Invalid capacity: server count must be at least 1 (got 0)"
        );

        let err: SimError = EventError::InvalidDelay { delay: -1.0 }.into();
        assert!(err.to_string().contains("Invalid scheduling delay: -1"));
    }

    #[test]
    fn test_is_configuration() {
        assert!(SimError::InvalidCapacity { server_count: 0 }.is_configuration());
        assert!(SimError::InvalidRate { parameter: "inter_arrival_time", value: 0.0 }.is_configuration());
        assert!(!SimError::EmptyRun { server_count: 2 }.is_configuration());
        assert!(!SimError::Internal("boom".into()).is_configuration());
    }
}
