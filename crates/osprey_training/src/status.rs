use osprey_core::prelude::*;

use tracing::warn;

/// Collapses a training job description into [`JobStatus`].
///
/// `Stopping` still counts as running; a `Stopped` job is a failure since it
/// produced no model. Unknown statuses are logged and treated as running.
pub fn classify(description: &TrainingJobDescription) -> JobStatus {
    match &description.status {
        TrainingJobStatus::InProgress | TrainingJobStatus::Stopping => JobStatus::Running,
        TrainingJobStatus::Completed => JobStatus::Completed,
        TrainingJobStatus::Failed => JobStatus::Failed(
            description
                .failure_reason
                .clone()
                .unwrap_or_else(|| "Training job failed without a reason".to_string()),
        ),
        TrainingJobStatus::Stopped => JobStatus::Failed(
            description
                .failure_reason
                .clone()
                .unwrap_or_else(|| "Training job was stopped".to_string()),
        ),
        TrainingJobStatus::Unknown(status) => {
            warn!(job_name = %description.job_name, %status, "Unknown training job status, still waiting");
            JobStatus::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn description(status: TrainingJobStatus, reason: Option<&str>) -> TrainingJobDescription {
        TrainingJobDescription {
            job_name: "job".into(),
            status,
            secondary_status: None,
            failure_reason: reason.map(str::to_string),
            model_artifacts: None,
            training_image: None,
            algorithm_name: None,
        }
    }

    #[yare::parameterized(
        in_progress  = { TrainingJobStatus::InProgress, None, JobStatus::Running },
        stopping     = { TrainingJobStatus::Stopping, None, JobStatus::Running },
        unknown      = { TrainingJobStatus::Unknown("Paused".into()), None, JobStatus::Running },
        completed    = { TrainingJobStatus::Completed, None, JobStatus::Completed },
        failed       = { TrainingJobStatus::Failed, Some("OutOfMemory"), JobStatus::Failed("OutOfMemory".into()) },
        failed_blank = { TrainingJobStatus::Failed, None, JobStatus::Failed("Training job failed without a reason".into()) },
        stopped      = { TrainingJobStatus::Stopped, None, JobStatus::Failed("Training job was stopped".into()) },
    )]
    fn collapses_remote_status(status: TrainingJobStatus, reason: Option<&str>, expected: JobStatus) {
        assert_eq!(classify(&description(status, reason)), expected);
    }
}
