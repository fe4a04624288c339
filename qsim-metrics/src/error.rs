//! Error types for result aggregation

use qsim_core::SimError;
use thiserror::Error;

/// Errors raised while turning raw samples into results
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Run with {server_count} server(s) produced no completed entity")]
    EmptyRun { server_count: usize },

    #[error("Sample sequences disagree: {waits} wait times but {services} service times")]
    InconsistentSamples { waits: usize, services: usize },

    #[error("Histogram error: {0}")]
    Histogram(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<MetricsError> for SimError {
    fn from(err: MetricsError) -> Self {
        match err {
            MetricsError::EmptyRun { server_count } => SimError::EmptyRun { server_count },
            other => SimError::Internal(other.to_string()),
        }
    }
}
