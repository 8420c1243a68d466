use crate::output::write_outputs;

use osprey_core::constants::inputs as keys;
use osprey_core::prelude::*;
use osprey_orchestrator::{Orchestrator, PollSettings};
use osprey_sagemaker::SageMakerBackend;
use osprey_training::TrainingJob;

use anyhow::Context;
use aws_config::{BehaviorVersion, Region};
use clap::{ArgAction, Args};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};

fn json(s: &str) -> Result<Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {e}"))
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Training job name; generated when omitted
    #[arg(long, env = "OSPREY_JOB_NAME")]
    job_name: Option<String>,

    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// IAM role ARN the job runs as
    #[arg(long, env = "OSPREY_ROLE_ARN")]
    role: Option<String>,

    /// Training image URI
    #[arg(long)]
    image: Option<String>,

    /// Built-in algorithm or algorithm resource name, used when no image is given
    #[arg(long)]
    algorithm_name: Option<String>,

    #[arg(long)]
    training_input_mode: Option<String>,

    /// JSON object of hyperparameters
    #[arg(long, value_parser = json)]
    hyperparameters: Option<Value>,

    /// JSON object mapping metric names to regexes
    #[arg(long, value_parser = json)]
    metric_definitions: Option<Value>,

    /// JSON list of input channels
    #[arg(long, value_parser = json)]
    channels: Option<Value>,

    /// Comma-separated security group ids
    #[arg(long)]
    vpc_security_group_ids: Option<String>,

    /// Comma-separated subnet ids
    #[arg(long)]
    vpc_subnets: Option<String>,

    /// S3 path the model artifacts are written to
    #[arg(long)]
    model_artifact_path: Option<String>,

    #[arg(long)]
    output_encryption_key: Option<String>,

    #[arg(long)]
    instance_type: Option<String>,

    #[arg(long)]
    instance_count: Option<u32>,

    /// Volume size in GB
    #[arg(long)]
    volume_size: Option<u32>,

    #[arg(long)]
    resource_encryption_key: Option<String>,

    /// Maximum run time in seconds
    #[arg(long)]
    max_run_time: Option<u32>,

    #[arg(long, action = ArgAction::Set)]
    network_isolation: Option<bool>,

    #[arg(long, action = ArgAction::Set)]
    traffic_encryption: Option<bool>,

    /// Use managed spot training
    #[arg(long)]
    spot_instance: bool,

    /// Maximum wait time in seconds for spot capacity
    #[arg(long)]
    max_wait_time: Option<u32>,

    /// JSON object with `S3Uri` and optional `LocalPath`
    #[arg(long, value_parser = json)]
    checkpoint_config: Option<Value>,

    /// JSON object of tags
    #[arg(long, value_parser = json)]
    tags: Option<Value>,

    /// JSON debugger hook config with `S3OutputPath` and optional collections
    #[arg(long, value_parser = json)]
    debug_hook_config: Option<Value>,

    /// JSON list of debugger rule configurations
    #[arg(long, value_parser = json)]
    debug_rule_config: Option<Value>,

    #[arg(long, default_value_t = 30)]
    poll_interval_secs: u64,

    /// Consecutive failed remote calls tolerated before giving up
    #[arg(long, default_value_t = 10)]
    max_retries: u32,

    #[arg(long, default_value_t = 60)]
    call_timeout_secs: u64,

    /// JSON file replacing the built-in algorithm catalog
    #[arg(long)]
    algorithm_catalog: Option<PathBuf>,

    /// Directory receiving one file per output
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Validate and print the request without submitting it
    #[arg(long)]
    dry_run: bool,
}

impl TrainArgs {
    fn spec(&self) -> Spec {
        let mut inputs = Map::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                inputs.insert(key.to_string(), value);
            }
        };

        let text = |v: &Option<String>| v.clone().map(Value::from);
        let number = |v: Option<u32>| v.map(Value::from);

        put(keys::JOB_NAME, text(&self.job_name));
        put(keys::REGION, text(&self.region));
        put(keys::ROLE, text(&self.role));
        put(keys::IMAGE, text(&self.image));
        put(keys::ALGORITHM_NAME, text(&self.algorithm_name));
        put("training_input_mode", text(&self.training_input_mode));
        put(keys::HYPERPARAMETERS, self.hyperparameters.clone());
        put("metric_definitions", self.metric_definitions.clone());
        put(keys::CHANNELS, self.channels.clone());
        put("vpc_security_group_ids", text(&self.vpc_security_group_ids));
        put("vpc_subnets", text(&self.vpc_subnets));
        put("model_artifact_path", text(&self.model_artifact_path));
        put("output_encryption_key", text(&self.output_encryption_key));
        put(keys::INSTANCE_TYPE, text(&self.instance_type));
        put("instance_count", number(self.instance_count));
        put("volume_size", number(self.volume_size));
        put("resource_encryption_key", text(&self.resource_encryption_key));
        put("max_run_time", number(self.max_run_time));
        put("network_isolation", self.network_isolation.map(Value::from));
        put("traffic_encryption", self.traffic_encryption.map(Value::from));
        put("spot_instance", Some(Value::from(self.spot_instance)));
        put(keys::MAX_WAIT_TIME, number(self.max_wait_time));
        put(keys::CHECKPOINT_CONFIG, self.checkpoint_config.clone());
        put("tags", self.tags.clone());
        put(keys::DEBUG_HOOK_CONFIG, self.debug_hook_config.clone());
        put(keys::DEBUG_RULE_CONFIG, self.debug_rule_config.clone());

        Spec::new(inputs)
    }

    fn settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_secs(self.poll_interval_secs),
            retry: RetryPolicy {
                max_attempts: self.max_retries,
                call_timeout: Duration::from_secs(self.call_timeout_secs),
                ..Default::default()
            },
        }
    }

    async fn catalog(&self) -> anyhow::Result<AlgorithmCatalog> {
        let Some(path) = &self.algorithm_catalog else {
            return Ok(AlgorithmCatalog::builtin());
        };

        let json = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read algorithm catalog {}", path.display()))?;
        AlgorithmCatalog::from_json(&json)
            .with_context(|| format!("Invalid algorithm catalog {}", path.display()))
    }
}

pub async fn run(args: TrainArgs) -> anyhow::Result<u8> {
    let catalog = args.catalog().await?;
    let mut spec = args.spec();

    if args.dry_run {
        return dry_run(&spec, &catalog);
    }

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &args.region {
        loader = loader.region(Region::new(region.clone()));
    }
    let aws_config = loader.load().await;

    if args.region.is_none() {
        if let Some(region) = aws_config.region() {
            spec = spec.with_input(keys::REGION, region.to_string());
        }
    }

    let backend = SageMakerBackend::new(&aws_config);
    let orchestrator = Orchestrator::new(TrainingJob::new(backend.clone(), catalog), backend)
        .with_settings(args.settings());

    let token = orchestrator.cancellation_token();
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Received shutdown signal, stopping job");
        token.cancel();
    });

    let code = match orchestrator.run(&mut spec).await {
        Ok(run) => {
            info!(job_name = %run.job, outcome = ?run.outcome, "Training step finished");
            run.exit_code()
        }
        Err(e) => {
            error!("{e}");
            e.exit_code()
        }
    };

    if let Some(dir) = &args.output_dir {
        write_outputs(dir, spec.outputs()).await?;
    }

    Ok(code)
}

fn dry_run(spec: &Spec, catalog: &AlgorithmCatalog) -> anyhow::Result<u8> {
    let job = JobIdentity::resolve(spec, defaults::JOB_NAME_PREFIX);

    match osprey_training::build_request(&job, spec, catalog) {
        Ok(request) => {
            println!("{}", serde_json::to_string_pretty(&request)?);
            Ok(exit_codes::SUCCESS)
        }
        Err(e) => {
            error!("Invalid job request: {e}");
            Ok(exit_codes::VALIDATION)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
