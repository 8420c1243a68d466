use osprey::prelude::*;
use osprey_mock::ScriptedBackend;

use serde_json::json;
use std::time::Duration;

fn settings() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(1),
        retry: RetryPolicy {
            initial_backoff: Duration::from_millis(1),
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn builtin_algorithm_trains_with_the_catalog_image() {
    let backend = ScriptedBackend::new().with_model_artifacts("s3://bucket/models/out/model.tar.gz");
    backend.push_status_with_logs(
        TrainingJobStatus::InProgress,
        &[("xgb/algo-1-1700000000", "[0]#011train-rmse:0.5")],
    );
    backend.push_status(TrainingJobStatus::Completed);

    let orchestrator = Orchestrator::new(
        TrainingJob::new(backend.clone(), AlgorithmCatalog::builtin()),
        backend.clone(),
    )
    .with_settings(settings());

    let mut spec = Spec::from_value(json!({
        "job_name": "xgb",
        "region": "us-west-2",
        "role": "arn:aws:iam::123456789012:role/training",
        "algorithm_name": " XGBoost ",
        "hyperparameters": { "num_round": 50 },
        "channels": [{
            "ChannelName": "train",
            "DataSource": { "S3DataSource": {
                "S3Uri": "s3://bucket/train",
                "S3DataType": "S3Prefix"
            }}
        }],
        "model_artifact_path": "s3://bucket/models"
    }))
    .unwrap();

    let run = orchestrator.run(&mut spec).await.unwrap();

    let submitted = &backend.submitted()[0];
    assert_eq!(
        submitted.algorithm_specification.source,
        AlgorithmSource::Image("433757028032.dkr.ecr.us-west-2.amazonaws.com/xgboost:1".into())
    );
    assert_eq!(submitted.hyper_parameters["num_round"], "50");

    assert_eq!(run.outcome, JobOutcome::Succeeded);
    assert_eq!(
        spec.output(outputs::TRAINING_IMAGE),
        Some(&json!("433757028032.dkr.ecr.us-west-2.amazonaws.com/xgboost:1"))
    );
    assert_eq!(
        spec.output(outputs::MODEL_ARTIFACT_URL),
        Some(&json!("s3://bucket/models/out/model.tar.gz"))
    );
}
