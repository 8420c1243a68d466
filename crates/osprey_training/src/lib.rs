//! # Osprey Training
//!
//! The SageMaker training job as a [`JobKind`]: builds the `CreateTrainingJob`
//! request from a [`Spec`], collapses training job statuses and reads the model
//! artifacts once the job completed.
//!
//! ## Example
//!
//! ```rust,no_run
//! use osprey_core::prelude::*;
//! use osprey_training::TrainingJob;
//!
//! fn kind<S: TrainingService>(service: S) -> TrainingJob<S> {
//!     TrainingJob::new(service, AlgorithmCatalog::builtin())
//! }
//! ```

pub mod extract;
pub mod inputs;
pub mod request;
pub mod status;

pub use inputs::TrainingInputs;
pub use request::build_request;

use osprey_core::prelude::*;

use tracing::info;

/// A training job running on a [`TrainingService`].
#[derive(Clone, Debug)]
pub struct TrainingJob<S> {
    service: S,
    catalog: AlgorithmCatalog,
}

impl<S: TrainingService> TrainingJob<S> {
    pub fn new(service: S, catalog: AlgorithmCatalog) -> Self {
        Self { service, catalog }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn catalog(&self) -> &AlgorithmCatalog {
        &self.catalog
    }
}

impl<S: TrainingService> JobKind for TrainingJob<S> {
    type Request = TrainingJobRequest;
    type Description = TrainingJobDescription;

    fn name_prefix(&self) -> &str {
        defaults::JOB_NAME_PREFIX
    }

    fn log_group(&self) -> &str {
        log_groups::TRAINING_JOBS
    }

    fn build_request(
        &self,
        job: &JobIdentity,
        spec: &Spec,
    ) -> Result<TrainingJobRequest, ValidationError> {
        request::build_request(job, spec, &self.catalog)
    }

    async fn submit(&self, request: &TrainingJobRequest) -> Result<(), ServiceError> {
        self.service.create_training_job(request).await
    }

    async fn describe(&self, job: &JobIdentity) -> Result<TrainingJobDescription, ServiceError> {
        self.service.describe_training_job(job.as_str()).await
    }

    fn classify_status(&self, description: &TrainingJobDescription) -> JobStatus {
        status::classify(description)
    }

    async fn on_terminate(&self, job: &JobIdentity) -> Result<(), ServiceError> {
        self.service.stop_training_job(job.as_str()).await
    }

    async fn extract_outputs(&self, job: &JobIdentity) -> Result<Map<String, Value>, ServiceError> {
        extract::extract_outputs(&self.service, job).await
    }

    fn after_submit(&self, job: &JobIdentity, spec: &Spec) {
        info!(job_name = %job, "Created training job");

        if let Some(region) = spec.input_str(osprey_core::constants::inputs::REGION) {
            info!(
                "Training job in SageMaker: https://{region}.console.aws.amazon.com/sagemaker/home?region={region}#/jobs/{job}"
            );
            info!(
                "CloudWatch logs: https://{region}.console.aws.amazon.com/cloudwatch/home?region={region}#logStream:group={};prefix={job};streamFilter=typeLogStreamPrefix",
                log_groups::TRAINING_JOBS
            );
        }
    }
}
