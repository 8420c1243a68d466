use crate::error::*;
use crate::job::{JobIdentity, JobStatus, LogPage};
use crate::spec::{Map, Spec, Value};
use crate::training::{TrainingJobDescription, TrainingJobRequest};

use serde::Serialize;
use std::fmt::Debug;

/// A trait for injecting the remote training API.
pub trait TrainingService: Send + Sync + 'static + Clone {
    /// Creates a training job. Fails with [`ServiceError::AlreadyExists`] if the name is taken.
    fn create_training_job(
        &self,
        request: &TrainingJobRequest,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Describes a training job by name.
    fn describe_training_job(
        &self,
        job_name: &str,
    ) -> impl Future<Output = Result<TrainingJobDescription, ServiceError>> + Send;

    /// Asks the service to stop a training job.
    ///
    /// Stopping a job that already reached a terminal state is not an error.
    fn stop_training_job(&self, job_name: &str)
    -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Returns the training image of an algorithm resource.
    fn describe_algorithm(
        &self,
        algorithm_name: &str,
    ) -> impl Future<Output = Result<String, ServiceError>> + Send;
}

/// A trait for injecting the remote log store.
pub trait LogService: Send + Sync + 'static + Clone {
    /// Lists the streams in `group` whose name starts with `prefix`.
    ///
    /// A missing group yields an empty list.
    fn list_streams(
        &self,
        group: &str,
        prefix: &str,
    ) -> impl Future<Output = Result<Vec<String>, ServiceError>> + Send;

    /// Reads the events following `token`, or from the start of the stream when [`None`].
    fn fetch_events(
        &self,
        group: &str,
        stream: &str,
        token: Option<&str>,
    ) -> impl Future<Output = Result<LogPage, ServiceError>> + Send;
}

/// The hooks a job type supplies to the orchestrator.
///
/// The orchestrator owns the lifecycle (submit, poll, relay logs, finalize);
/// implementors only know how to talk about their own kind of job.
pub trait JobKind: Send + Sync {
    /// The job-creation request sent to the service.
    type Request: Serialize + Debug + Send + Sync;

    /// Whatever the service returns when asked about the job.
    type Description: Debug + Send + Sync;

    /// Prefix for generated job names.
    fn name_prefix(&self) -> &str;

    /// Log group the service writes this kind's logs to.
    fn log_group(&self) -> &str;

    /// Validates the inputs and builds the creation request. Must not touch the network.
    fn build_request(
        &self,
        job: &JobIdentity,
        spec: &Spec,
    ) -> Result<Self::Request, ValidationError>;

    fn submit(&self, request: &Self::Request)
    -> impl Future<Output = Result<(), ServiceError>> + Send;

    fn describe(
        &self,
        job: &JobIdentity,
    ) -> impl Future<Output = Result<Self::Description, ServiceError>> + Send;

    /// Collapses a description into the three states the orchestrator acts on.
    fn classify_status(&self, description: &Self::Description) -> JobStatus;

    /// Stops the job after the run was interrupted.
    fn on_terminate(&self, job: &JobIdentity)
    -> impl Future<Output = Result<(), ServiceError>> + Send;

    /// Reads the values handed to downstream steps once the job completed.
    fn extract_outputs(
        &self,
        job: &JobIdentity,
    ) -> impl Future<Output = Result<Map<String, Value>, ServiceError>> + Send;

    /// Called once the service acknowledged the job.
    fn after_submit(&self, _job: &JobIdentity, _spec: &Spec) {}
}
