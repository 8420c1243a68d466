//! # Osprey Mock
//!
//! An in-memory [`TrainingService`] and [`LogService`] whose answers are scripted
//! up front, for tests and dry runs.
//!
//! **WARNING**: Nothing is trained. Jobs only move through the statuses you push.
//!
//! ## Usage
//!
//! ```rust
//! # use osprey_core::prelude::*;
//! # use osprey_mock::ScriptedBackend;
//! # fn main() {
//! let backend = ScriptedBackend::new().with_model_artifacts("s3://bucket/model.tar.gz");
//! backend.push_status(TrainingJobStatus::InProgress);
//! backend.push_failure("OutOfMemory");
//! backend.append_log("job/algo-1-1700000000", "epoch 1");
//! # }
//! ```

use osprey_core::prelude::*;

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_PAGE_SIZE: usize = 100;

enum Step {
    Status {
        status: TrainingJobStatus,
        reason: Option<String>,
        logs: Vec<(String, String)>,
    },
    Error(ServiceError),
}

struct State {
    script: VecDeque<Step>,
    status: TrainingJobStatus,
    failure_reason: Option<String>,
    jobs: Vec<TrainingJobRequest>,
    create_error: Option<ServiceError>,
    stop_calls: Vec<String>,
    describe_calls: usize,
    describe_delay: Option<Duration>,
    algorithms: HashMap<String, String>,
    algorithm_lookups: usize,
    model_artifacts: Option<String>,
    streams: BTreeMap<String, Vec<LogEvent>>,
    fetch_errors: VecDeque<ServiceError>,
    fetch_calls: usize,
    served: Vec<String>,
    page_size: usize,
}

impl Default for State {
    fn default() -> Self {
        Self {
            script: VecDeque::new(),
            status: TrainingJobStatus::InProgress,
            failure_reason: None,
            jobs: Vec::new(),
            create_error: None,
            stop_calls: Vec::new(),
            describe_calls: 0,
            describe_delay: None,
            algorithms: HashMap::new(),
            algorithm_lookups: 0,
            model_artifacts: None,
            streams: BTreeMap::new(),
            fetch_errors: VecDeque::new(),
            fetch_calls: 0,
            served: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl State {
    fn append_log(&mut self, stream: &str, message: &str) {
        self.streams
            .entry(stream.to_string())
            .or_default()
            .push(LogEvent {
                timestamp: None,
                message: message.to_string(),
            });
    }
}

/// A scripted training service and log store.
///
/// Every `describe` consumes the next scripted step; once the script runs out the
/// last status is repeated. Stopping a job turns it `Stopped` regardless of the script.
#[derive(Clone, Default)]
pub struct ScriptedBackend {
    inner: Arc<Mutex<State>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model_artifacts(self, url: impl Into<String>) -> Self {
        self.inner.lock().model_artifacts = Some(url.into());
        self
    }

    /// Registers an algorithm resource for `describe_algorithm`.
    pub fn with_algorithm(self, name: impl Into<String>, image: impl Into<String>) -> Self {
        self.inner.lock().algorithms.insert(name.into(), image.into());
        self
    }

    /// Makes the next `create_training_job` fail with `err`.
    pub fn reject_create(self, err: ServiceError) -> Self {
        self.inner.lock().create_error = Some(err);
        self
    }

    /// Makes every `describe_training_job` take `delay` before it answers.
    pub fn with_describe_delay(self, delay: Duration) -> Self {
        self.inner.lock().describe_delay = Some(delay);
        self
    }

    /// Limits how many events a single log fetch returns.
    pub fn with_page_size(self, size: usize) -> Self {
        self.inner.lock().page_size = size.max(1);
        self
    }

    pub fn push_status(&self, status: TrainingJobStatus) {
        self.push_status_with_logs(status, &[]);
    }

    /// Scripts a status; `logs` are appended to their streams when the step is consumed.
    pub fn push_status_with_logs(&self, status: TrainingJobStatus, logs: &[(&str, &str)]) {
        self.inner.lock().script.push_back(Step::Status {
            status,
            reason: None,
            logs: logs
                .iter()
                .map(|(s, m)| (s.to_string(), m.to_string()))
                .collect(),
        });
    }

    pub fn push_failure(&self, reason: impl Into<String>) {
        self.inner.lock().script.push_back(Step::Status {
            status: TrainingJobStatus::Failed,
            reason: Some(reason.into()),
            logs: Vec::new(),
        });
    }

    /// Scripts a failed `describe` call.
    pub fn push_error(&self, err: ServiceError) {
        self.inner.lock().script.push_back(Step::Error(err));
    }

    pub fn append_log(&self, stream: &str, message: &str) {
        self.inner.lock().append_log(stream, message);
    }

    /// Makes the next log fetch fail with `err`.
    pub fn fail_next_fetch(&self, err: ServiceError) {
        self.inner.lock().fetch_errors.push_back(err);
    }

    pub fn submitted(&self) -> Vec<TrainingJobRequest> {
        self.inner.lock().jobs.clone()
    }

    pub fn stop_calls(&self) -> Vec<String> {
        self.inner.lock().stop_calls.clone()
    }

    pub fn describe_calls(&self) -> usize {
        self.inner.lock().describe_calls
    }

    pub fn fetch_calls(&self) -> usize {
        self.inner.lock().fetch_calls
    }

    /// Every log message handed out by `fetch_events`, in order.
    pub fn served_messages(&self) -> Vec<String> {
        self.inner.lock().served.clone()
    }

    pub fn algorithm_lookups(&self) -> usize {
        self.inner.lock().algorithm_lookups
    }
}

impl TrainingService for ScriptedBackend {
    async fn create_training_job(&self, request: &TrainingJobRequest) -> Result<(), ServiceError> {
        let mut state = self.inner.lock();
        if let Some(err) = state.create_error.take() {
            return Err(err);
        }

        if state
            .jobs
            .iter()
            .any(|j| j.training_job_name == request.training_job_name)
        {
            return Err(ServiceError::AlreadyExists(request.training_job_name.clone()));
        }

        state.jobs.push(request.clone());
        Ok(())
    }

    async fn describe_training_job(
        &self,
        job_name: &str,
    ) -> Result<TrainingJobDescription, ServiceError> {
        let delay = {
            let mut state = self.inner.lock();
            state.describe_calls += 1;
            state.describe_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.inner.lock();
        let request = state
            .jobs
            .iter()
            .find(|j| j.training_job_name == job_name)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(job_name.to_string()))?;

        if state.status != TrainingJobStatus::Stopped {
            match state.script.pop_front() {
                Some(Step::Error(err)) => return Err(err),
                Some(Step::Status {
                    status,
                    reason,
                    logs,
                }) => {
                    state.status = status;
                    state.failure_reason = reason;
                    for (stream, message) in logs {
                        state.append_log(&stream, &message);
                    }
                }
                None => {}
            }
        }

        let (training_image, algorithm_name) = match request.algorithm_specification.source {
            AlgorithmSource::Image(image) => (Some(image), None),
            AlgorithmSource::AlgorithmName(name) => (None, Some(name)),
        };

        Ok(TrainingJobDescription {
            job_name: job_name.to_string(),
            status: state.status.clone(),
            secondary_status: None,
            failure_reason: state.failure_reason.clone(),
            model_artifacts: (state.status == TrainingJobStatus::Completed)
                .then(|| state.model_artifacts.clone())
                .flatten(),
            training_image,
            algorithm_name,
        })
    }

    async fn stop_training_job(&self, job_name: &str) -> Result<(), ServiceError> {
        let mut state = self.inner.lock();
        state.stop_calls.push(job_name.to_string());

        let known = state.jobs.iter().any(|j| j.training_job_name == job_name);
        if known
            && !matches!(
                state.status,
                TrainingJobStatus::Completed | TrainingJobStatus::Failed
            )
        {
            state.status = TrainingJobStatus::Stopped;
        }
        Ok(())
    }

    async fn describe_algorithm(&self, algorithm_name: &str) -> Result<String, ServiceError> {
        let mut state = self.inner.lock();
        state.algorithm_lookups += 1;
        state
            .algorithms
            .get(algorithm_name)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(algorithm_name.to_string()))
    }
}

impl LogService for ScriptedBackend {
    async fn list_streams(&self, _group: &str, prefix: &str) -> Result<Vec<String>, ServiceError> {
        let state = self.inner.lock();
        Ok(state
            .streams
            .keys()
            .filter(|s| s.starts_with(prefix))
            .cloned()
            .collect())
    }

    /// Tokens are the index of the next unread event.
    async fn fetch_events(
        &self,
        _group: &str,
        stream: &str,
        token: Option<&str>,
    ) -> Result<LogPage, ServiceError> {
        let mut state = self.inner.lock();
        state.fetch_calls += 1;

        if let Some(err) = state.fetch_errors.pop_front() {
            return Err(err);
        }

        let events = state
            .streams
            .get(stream)
            .ok_or_else(|| ServiceError::NotFound(stream.to_string()))?;

        let start = match token {
            Some(t) => t
                .parse::<usize>()
                .map_err(|_| ServiceError::Rejected(format!("invalid token {t}")))?,
            None => 0,
        }
        .min(events.len());
        let end = (start + state.page_size).min(events.len());
        let page = events[start..end].to_vec();

        state.served.extend(page.iter().map(|e| e.message.clone()));
        Ok(LogPage {
            events: page,
            next_token: Some(end.to_string()),
        })
    }
}
