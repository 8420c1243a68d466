use crate::constants::exit_codes;

use std::time::Duration;
use thiserror::Error;

/// Errors raised by a remote service client ([`TrainingService`](crate::traits::TrainingService),
/// [`LogService`](crate::traits::LogService)).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Network hiccup, throttling or a 5xx from the service.
    /// Safe to retry.
    #[error("Transient service failure: {0}")]
    Transient(String),

    /// The call did not answer within its timeout.
    /// Treated exactly like [`ServiceError::Transient`].
    #[error("Remote call timed out after {0:?}")]
    Timeout(Duration),

    /// The job, algorithm or log stream does not exist (yet).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A job with the same name already exists.
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),

    /// The service refused the request (malformed, quota, permissions).
    #[error("Request rejected: {0}")]
    Rejected(String),
}

impl ServiceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Timeout(_))
    }
}

/// The caller's inputs are malformed or contradictory.
///
/// Raised before anything is sent to the service, never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Must specify at least one input channel")]
    NoChannels,

    #[error("Please specify a training image or an algorithm name")]
    NoAlgorithm,

    #[error("Missing required input '{0}'")]
    MissingInput(&'static str),

    #[error("Invalid input '{key}': {reason}")]
    InvalidInput { key: String, reason: String },

    #[error("Spot training requires {0}")]
    Spot(String),

    #[error("Built-in algorithm '{algorithm}' has no image for region '{region}'")]
    UnsupportedRegion { algorithm: String, region: String },
}

impl ValidationError {
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// Outputs are write-once.
    #[error("Output '{0}' has already been written")]
    OutputAlreadySet(String),

    #[error("Spec inputs must be a JSON object")]
    NotAnObject,
}

/// Errors that end a run without a terminal job outcome.
///
/// A failed or cancelled job is reported through [`JobOutcome`](crate::job::JobOutcome) instead.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Maps to exit code [`exit_codes::VALIDATION`]. No job was created.
    #[error("Invalid job request: {0}")]
    Validation(#[from] ValidationError),

    /// Maps to exit code [`exit_codes::SUBMISSION`]. No job was created.
    #[error("Failed to create job {job_name}: {source}")]
    Submission {
        job_name: String,
        #[source]
        source: ServiceError,
    },

    /// Transient errors outlasted the retry budget while the job was being polled.
    /// Maps to exit code [`exit_codes::INDETERMINATE`].
    #[error("Gave up on job {job_name} after {attempts} failed attempts: {source}")]
    RetriesExhausted {
        job_name: String,
        attempts: u32,
        #[source]
        source: ServiceError,
    },

    /// The service refused to describe the job.
    /// Maps to exit code [`exit_codes::INDETERMINATE`].
    #[error("Lost track of job {job_name}: {source}")]
    Poll {
        job_name: String,
        #[source]
        source: ServiceError,
    },

    #[error(transparent)]
    Spec(#[from] SpecError),
}

impl OrchestratorError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Spec(_) => exit_codes::VALIDATION,
            Self::Submission { .. } => exit_codes::SUBMISSION,
            Self::RetriesExhausted { .. } | Self::Poll { .. } => exit_codes::INDETERMINATE,
        }
    }
}
