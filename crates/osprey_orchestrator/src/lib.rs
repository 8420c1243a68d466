//! # Osprey Orchestrator
//!
//! Drives a remote job from submission to a terminal outcome.
//!
//! The [`Orchestrator`] owns the lifecycle: it validates and submits the request,
//! polls the job, relays its logs, stops it when the run is cancelled and writes
//! the job's outputs back into the [`Spec`]. Everything specific to a kind of job
//! comes from its [`JobKind`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use osprey_core::prelude::*;
//! use osprey_orchestrator::Orchestrator;
//!
//! async fn train<K: JobKind, L: LogService>(kind: K, logs: L, spec: &mut Spec) -> u8 {
//!     let orchestrator = Orchestrator::new(kind, logs);
//!     match orchestrator.run(spec).await {
//!         Ok(run) => run.outcome.exit_code(),
//!         Err(e) => e.exit_code(),
//!     }
//! }
//! ```

mod call;
pub mod relay;

pub use relay::{JOB_LOG_TARGET, LogCursor, LogRelay, RelayBatch};
pub use tokio_util::sync::CancellationToken;

use call::timed;

use osprey_core::prelude::*;

use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How often to poll and how hard to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Pause between two status checks.
    pub interval: Duration,
    pub retry: RetryPolicy,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// The job a run created and how it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRun {
    pub job: JobIdentity,
    pub outcome: JobOutcome,
}

impl JobRun {
    pub fn exit_code(&self) -> u8 {
        self.outcome.exit_code()
    }
}

pub struct Orchestrator<K, L> {
    kind: K,
    logs: L,
    settings: PollSettings,
    cancel: CancellationToken,
}

impl<K: JobKind, L: LogService> Orchestrator<K, L> {
    pub fn new(kind: K, logs: L) -> Self {
        Self {
            kind,
            logs,
            settings: PollSettings::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_settings(mut self, settings: PollSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the token that cancels the run.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Cancelling this token stops the remote job and ends the run as [`JobOutcome::Cancelled`].
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    /// Submits the job described by `spec` and waits for it to end.
    ///
    /// On success the job name and the job's outputs are written to `spec`.
    /// A failed or cancelled job is an `Ok` outcome; errors mean the job was never
    /// created or its state could not be determined.
    pub async fn run(&self, spec: &mut Spec) -> Result<JobRun, OrchestratorError> {
        let job = JobIdentity::resolve(spec, self.kind.name_prefix());
        let request = self.kind.build_request(&job, spec)?;
        debug!(job_name = %job, ?request, "Built job request");

        if self.cancel.is_cancelled() {
            info!(job_name = %job, "Cancelled before submission, no job created");
            return Ok(JobRun {
                job,
                outcome: JobOutcome::Cancelled,
            });
        }

        timed(self.settings.retry.call_timeout, self.kind.submit(&request))
            .await
            .map_err(|source| OrchestratorError::Submission {
                job_name: job.to_string(),
                source,
            })?;
        self.kind.after_submit(&job, spec);

        let outcome = self.poll(&job).await?;

        if outcome == JobOutcome::Succeeded {
            spec.set_output(outputs::JOB_NAME, job.as_str())?;

            match self.with_retries(|| self.kind.extract_outputs(&job)).await {
                Ok(values) => {
                    for (key, value) in values {
                        spec.set_output(key, value)?;
                    }
                }
                Err(err) => error!(job_name = %job, %err, "Failed to read job outputs"),
            }
        }

        info!(job_name = %job, ?outcome, "Run finished");
        Ok(JobRun { job, outcome })
    }

    async fn poll(&self, job: &JobIdentity) -> Result<JobOutcome, OrchestratorError> {
        let policy = self.settings.retry;
        let mut relay = LogRelay::new(self.kind.log_group(), job, policy.call_timeout);
        let mut failures = 0;

        loop {
            let Some(described) = self
                .interruptible(timed(policy.call_timeout, self.kind.describe(job)))
                .await
            else {
                return Ok(self.cancel_job(job, &mut relay).await);
            };

            match described {
                Ok(description) => {
                    failures = 0;
                    match self.kind.classify_status(&description) {
                        JobStatus::Running => {
                            debug!(job_name = %job, ?description, "Job is running");
                        }
                        JobStatus::Completed => {
                            relay.relay(&self.logs).await;
                            info!(job_name = %job, "Job completed");
                            return Ok(JobOutcome::Succeeded);
                        }
                        JobStatus::Failed(reason) => {
                            relay.relay(&self.logs).await;
                            error!(job_name = %job, %reason, "Job failed");
                            return Ok(JobOutcome::Failed { reason });
                        }
                    }
                }
                Err(err) if err.is_transient() => {
                    failures += 1;
                    if policy.is_exhausted(failures) {
                        error!(job_name = %job, %err, failures, "Giving up on job status");
                        self.stop(job).await;
                        return Err(OrchestratorError::RetriesExhausted {
                            job_name: job.to_string(),
                            attempts: failures,
                            source: err,
                        });
                    }

                    warn!(job_name = %job, %err, failures, "Failed to describe job, retrying");
                    if self
                        .interruptible(tokio::time::sleep(policy.backoff(failures)))
                        .await
                        .is_none()
                    {
                        return Ok(self.cancel_job(job, &mut relay).await);
                    }
                    continue;
                }
                Err(source) => {
                    error!(job_name = %job, err = %source, "Failed to describe job");
                    self.stop(job).await;
                    return Err(OrchestratorError::Poll {
                        job_name: job.to_string(),
                        source,
                    });
                }
            }

            if self.interruptible(relay.relay(&self.logs)).await.is_none()
                || self
                    .interruptible(tokio::time::sleep(self.settings.interval))
                    .await
                    .is_none()
            {
                return Ok(self.cancel_job(job, &mut relay).await);
            }
        }
    }

    async fn cancel_job(&self, job: &JobIdentity, relay: &mut LogRelay) -> JobOutcome {
        warn!(job_name = %job, "Run cancelled, stopping job");
        self.stop(job).await;
        relay.relay(&self.logs).await;
        JobOutcome::Cancelled
    }

    /// Best-effort: a job that cannot be stopped is only logged.
    async fn stop(&self, job: &JobIdentity) {
        match self.with_retries(|| self.kind.on_terminate(job)).await {
            Ok(()) => info!(job_name = %job, "Requested job stop"),
            Err(err) => error!(job_name = %job, %err, "Failed to stop job, it may still be running"),
        }
    }

    /// Runs `op` with a timeout, retrying transient failures with backoff.
    async fn with_retries<T, F, Fut>(&self, mut op: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let policy = self.settings.retry;
        let mut failures = 0;

        loop {
            match timed(policy.call_timeout, op()).await {
                Err(err) if err.is_transient() => {
                    failures += 1;
                    if policy.is_exhausted(failures) {
                        return Err(err);
                    }
                    warn!(%err, failures, "Remote call failed, retrying");
                    tokio::time::sleep(policy.backoff(failures)).await;
                }
                result => return result,
            }
        }
    }

    /// Resolves to [`None`] as soon as the run is cancelled.
    async fn interruptible<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            out = fut => Some(out),
        }
    }
}
