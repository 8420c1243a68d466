use crate::constants::{exit_codes, inputs};
use crate::spec::Spec;

use chrono::Utc;
use rand::{Rng, distr::Alphanumeric};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The status of a remote job, collapsed to what the orchestrator acts on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Completed,
    Failed(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// How a run ended once a job had been submitted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    /// The service reported the job as failed. `reason` is passed through verbatim.
    Failed { reason: String },
    /// The run was interrupted and the job was asked to stop.
    Cancelled,
}

impl JobOutcome {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Succeeded => exit_codes::SUCCESS,
            Self::Failed { .. } => exit_codes::JOB_FAILED,
            Self::Cancelled => exit_codes::CANCELLED,
        }
    }
}

/// The name of the job owned by this run. Assigned once, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobIdentity(String);

impl JobIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Generates `<prefix>-<yyyymmddHHMMSS>-<4 random chars>`.
    ///
    /// The suffix keeps names apart when two runs start within the same second.
    pub fn generate(prefix: &str) -> Self {
        let suffix: String = rand::rng()
            .sample_iter(Alphanumeric)
            .take(4)
            .map(|b| char::from(b).to_ascii_lowercase())
            .collect();

        Self(format!(
            "{prefix}-{}-{suffix}",
            Utc::now().format("%Y%m%d%H%M%S")
        ))
    }

    /// Uses the `job_name` input verbatim when present, otherwise generates one.
    pub fn resolve(spec: &Spec, prefix: &str) -> Self {
        spec.input(inputs::JOB_NAME)
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .map(Self::new)
            .unwrap_or_else(|| Self::generate(prefix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for JobIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogEvent {
    /// RFC3339 timestamp string, e.g., "2026-01-01T01:00:00Z".
    pub timestamp: Option<String>,
    pub message: String,
}

/// One page of a log stream, read from a continuation token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogPage {
    pub events: Vec<LogEvent>,
    /// Token to resume after the last event of this page.
    pub next_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_job_name_is_used_verbatim() {
        let spec = Spec::default().with_input(inputs::JOB_NAME, json!("my-training-run"));
        let job = JobIdentity::resolve(&spec, "TrainingJob");
        assert_eq!(job.as_str(), "my-training-run");
    }

    #[test]
    fn explicit_job_name_is_not_trimmed() {
        let spec = Spec::default().with_input(inputs::JOB_NAME, json!(" my-training-run "));
        let job = JobIdentity::resolve(&spec, "TrainingJob");
        assert_eq!(job.as_str(), " my-training-run ");
    }

    #[test]
    fn blank_job_name_falls_back_to_generated() {
        let spec = Spec::default().with_input(inputs::JOB_NAME, json!("  "));
        let job = JobIdentity::resolve(&spec, "TrainingJob");
        assert!(job.as_str().starts_with("TrainingJob-"));
    }

    #[test]
    fn generated_names_differ_between_back_to_back_runs() {
        let spec = Spec::default();
        let first = JobIdentity::resolve(&spec, "TrainingJob");
        let second = JobIdentity::resolve(&spec, "TrainingJob");

        assert_ne!(first, second);
        assert!(first.as_str().len() <= 63);
        let parts: Vec<&str> = first.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 14);
        assert!(parts[2].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[yare::parameterized(
        running   = { JobStatus::Running, false },
        completed = { JobStatus::Completed, true },
        failed    = { JobStatus::Failed("OutOfMemory".into()), true },
    )]
    fn terminal_states(status: JobStatus, terminal: bool) {
        assert_eq!(status.is_terminal(), terminal);
    }

    #[test]
    fn cancellation_has_its_own_exit_code() {
        let failed = JobOutcome::Failed {
            reason: "OutOfMemory".into(),
        };
        assert_eq!(JobOutcome::Succeeded.exit_code(), 0);
        assert_ne!(failed.exit_code(), 0);
        assert_ne!(JobOutcome::Cancelled.exit_code(), failed.exit_code());
    }
}
