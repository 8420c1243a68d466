use osprey_core::prelude::*;

/// Reads the model artifact location and the image the job actually trained with.
///
/// A job started from an algorithm resource only knows the algorithm's name, so
/// the image is looked up once more in the algorithm registry.
pub async fn extract_outputs<S: TrainingService>(
    service: &S,
    job: &JobIdentity,
) -> Result<Map<String, Value>, ServiceError> {
    let description = service.describe_training_job(job.as_str()).await?;

    let artifact_url = description
        .model_artifacts
        .ok_or_else(|| ServiceError::NotFound(format!("model artifacts of {job}")))?;

    let image = match (description.training_image, description.algorithm_name) {
        (Some(image), _) => image,
        (None, Some(algorithm)) => service.describe_algorithm(&algorithm).await?,
        (None, None) => {
            return Err(ServiceError::NotFound(format!(
                "training image or algorithm of {job}"
            )));
        }
    };

    let mut out = Map::new();
    out.insert(outputs::MODEL_ARTIFACT_URL.into(), Value::String(artifact_url));
    out.insert(outputs::TRAINING_IMAGE.into(), Value::String(image));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use osprey_mock::ScriptedBackend;

    fn request(source: AlgorithmSource) -> TrainingJobRequest {
        TrainingJobRequest {
            training_job_name: "job".into(),
            role_arn: "role".into(),
            hyper_parameters: Default::default(),
            algorithm_specification: AlgorithmSpecification {
                source,
                training_input_mode: "File".into(),
                metric_definitions: vec![],
            },
            input_data_config: vec![],
            output_data_config: OutputDataConfig {
                s3_output_path: "s3://bucket/out".into(),
                kms_key_id: None,
            },
            resource_config: ResourceConfig {
                instance_type: "ml.m4.xlarge".into(),
                instance_count: 1,
                volume_size_in_gb: 30,
                volume_kms_key_id: None,
            },
            vpc_config: None,
            stopping_condition: StoppingCondition {
                max_runtime_in_seconds: 3600,
                max_wait_time_in_seconds: None,
            },
            tags: vec![],
            enable_network_isolation: true,
            enable_inter_container_traffic_encryption: false,
            enable_managed_spot_training: false,
            checkpoint_config: None,
            debug_hook_config: None,
            debug_rule_configurations: vec![],
        }
    }

    #[tokio::test]
    async fn image_jobs_report_their_image() {
        let backend = ScriptedBackend::new().with_model_artifacts("s3://bucket/out/model.tar.gz");
        backend
            .create_training_job(&request(AlgorithmSource::Image("my-image:1".into())))
            .await
            .unwrap();
        backend.push_status(TrainingJobStatus::Completed);

        let out = extract_outputs(&backend, &JobIdentity::new("job")).await.unwrap();

        assert_eq!(out[outputs::MODEL_ARTIFACT_URL], "s3://bucket/out/model.tar.gz");
        assert_eq!(out[outputs::TRAINING_IMAGE], "my-image:1");
        assert_eq!(backend.algorithm_lookups(), 0);
    }

    #[tokio::test]
    async fn algorithm_jobs_resolve_the_image_through_the_registry() {
        let backend = ScriptedBackend::new()
            .with_algorithm("my-algorithm", "registry.local/my-algorithm:7")
            .with_model_artifacts("s3://bucket/out/model.tar.gz");
        backend
            .create_training_job(&request(AlgorithmSource::AlgorithmName("my-algorithm".into())))
            .await
            .unwrap();
        backend.push_status(TrainingJobStatus::Completed);

        let out = extract_outputs(&backend, &JobIdentity::new("job")).await.unwrap();

        assert_eq!(out[outputs::TRAINING_IMAGE], "registry.local/my-algorithm:7");
        assert_eq!(backend.algorithm_lookups(), 1);
    }
}
