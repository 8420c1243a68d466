//! # Osprey SageMaker
//!
//! [`TrainingService`] on Amazon SageMaker and [`LogService`] on CloudWatch Logs.
//!
//! Credentials and region come from the shared [`aws_config::SdkConfig`].

mod convert;
mod error;

use error::classify;

use osprey_core::prelude::*;

use aws_sdk_cloudwatchlogs::Client as LogsClient;
use aws_sdk_sagemaker::Client as SageMakerClient;
use aws_sdk_sagemaker::error::{DisplayErrorContext, ProvideErrorMetadata};

use chrono::{TimeZone, Utc};
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct SageMakerBackend {
    sagemaker: SageMakerClient,
    logs: LogsClient,
}

impl SageMakerBackend {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            sagemaker: SageMakerClient::new(config),
            logs: LogsClient::new(config),
        }
    }
}

impl TrainingService for SageMakerBackend {
    async fn create_training_job(&self, request: &TrainingJobRequest) -> Result<(), ServiceError> {
        let channels = request
            .input_data_config
            .iter()
            .map(convert::channel)
            .collect::<Result<Vec<_>, _>>()?;
        let tags = request
            .tags
            .iter()
            .map(convert::tag)
            .collect::<Result<Vec<_>, _>>()?;
        let rules = request
            .debug_rule_configurations
            .iter()
            .map(convert::debug_rule_configuration)
            .collect::<Result<Vec<_>, _>>()?;

        self.sagemaker
            .create_training_job()
            .training_job_name(&request.training_job_name)
            .role_arn(&request.role_arn)
            .set_hyper_parameters(Some(
                request
                    .hyper_parameters
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            ))
            .algorithm_specification(convert::algorithm_specification(
                &request.algorithm_specification,
            )?)
            .set_input_data_config(Some(channels))
            .output_data_config(convert::output_data_config(&request.output_data_config)?)
            .resource_config(convert::resource_config(&request.resource_config)?)
            .set_vpc_config(request.vpc_config.as_ref().map(convert::vpc_config).transpose()?)
            .stopping_condition(convert::stopping_condition(&request.stopping_condition)?)
            .set_tags((!tags.is_empty()).then_some(tags))
            .enable_network_isolation(request.enable_network_isolation)
            .enable_inter_container_traffic_encryption(
                request.enable_inter_container_traffic_encryption,
            )
            .enable_managed_spot_training(request.enable_managed_spot_training)
            .set_checkpoint_config(
                request
                    .checkpoint_config
                    .as_ref()
                    .map(convert::checkpoint_config)
                    .transpose()?,
            )
            .set_debug_hook_config(
                request
                    .debug_hook_config
                    .as_ref()
                    .map(convert::debug_hook_config)
                    .transpose()?,
            )
            .set_debug_rule_configurations((!rules.is_empty()).then_some(rules))
            .send()
            .await
            .map(|output| debug!(arn = output.training_job_arn(), "Training job created"))
            .map_err(|e| {
                if e.as_service_error().is_some_and(|s| s.is_resource_in_use()) {
                    ServiceError::AlreadyExists(request.training_job_name.clone())
                } else {
                    classify(e)
                }
            })
    }

    async fn describe_training_job(
        &self,
        job_name: &str,
    ) -> Result<TrainingJobDescription, ServiceError> {
        let output = self
            .sagemaker
            .describe_training_job()
            .training_job_name(job_name)
            .send()
            .await
            .map_err(classify)?;

        let algorithm = output.algorithm_specification();

        Ok(TrainingJobDescription {
            job_name: job_name.to_string(),
            status: output
                .training_job_status()
                .map(|s| TrainingJobStatus::from(s.as_str()))
                .unwrap_or_else(|| TrainingJobStatus::Unknown(String::new())),
            secondary_status: output.secondary_status().map(|s| s.as_str().to_string()),
            failure_reason: output.failure_reason().map(str::to_string),
            model_artifacts: output
                .model_artifacts()
                .map(|a| a.s3_model_artifacts().to_string()),
            training_image: algorithm
                .and_then(|a| a.training_image())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            algorithm_name: algorithm
                .and_then(|a| a.algorithm_name())
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }

    async fn stop_training_job(&self, job_name: &str) -> Result<(), ServiceError> {
        match self
            .sagemaker
            .stop_training_job()
            .training_job_name(job_name)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            // Already stopped, completed or failed.
            Err(e)
                if e.as_service_error().is_some_and(|s| {
                    s.is_resource_not_found() || s.code() == Some("ValidationException")
                }) =>
            {
                warn!(job_name, err = %DisplayErrorContext(&e), "Job was not running, nothing to stop");
                Ok(())
            }
            Err(e) => Err(classify(e)),
        }
    }

    async fn describe_algorithm(&self, algorithm_name: &str) -> Result<String, ServiceError> {
        let output = self
            .sagemaker
            .describe_algorithm()
            .algorithm_name(algorithm_name)
            .send()
            .await
            .map_err(classify)?;

        output
            .training_specification()
            .map(|t| t.training_image().to_string())
            .filter(|image| !image.is_empty())
            .ok_or_else(|| ServiceError::NotFound(format!("training image of {algorithm_name}")))
    }
}

impl LogService for SageMakerBackend {
    async fn list_streams(&self, group: &str, prefix: &str) -> Result<Vec<String>, ServiceError> {
        let mut streams = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let output = match self
                .logs
                .describe_log_streams()
                .log_group_name(group)
                .log_stream_name_prefix(prefix)
                .set_next_token(token.take())
                .send()
                .await
            {
                Ok(output) => output,
                // The group only exists once the first instance started logging.
                Err(e) if e.as_service_error().is_some_and(|s| s.is_resource_not_found_exception()) => {
                    return Ok(streams);
                }
                Err(e) => return Err(classify(e)),
            };

            streams.extend(
                output
                    .log_streams()
                    .iter()
                    .filter_map(|s| s.log_stream_name())
                    .map(str::to_string),
            );

            match output.next_token() {
                Some(next) => token = Some(next.to_string()),
                None => return Ok(streams),
            }
        }
    }

    async fn fetch_events(
        &self,
        group: &str,
        stream: &str,
        token: Option<&str>,
    ) -> Result<LogPage, ServiceError> {
        let output = self
            .logs
            .get_log_events()
            .log_group_name(group)
            .log_stream_name(stream)
            .start_from_head(true)
            .set_next_token(token.map(str::to_string))
            .send()
            .await
            .map_err(classify)?;

        let events = output
            .events()
            .iter()
            .map(|event| LogEvent {
                timestamp: event
                    .timestamp()
                    .and_then(|ts| Utc.timestamp_millis_opt(ts).single())
                    .map(|ts| ts.to_rfc3339()),
                message: event.message().unwrap_or_default().to_string(),
            })
            .collect();

        Ok(LogPage {
            events,
            next_token: output.next_forward_token().map(str::to_string),
        })
    }
}
