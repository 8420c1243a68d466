use crate::inputs::{TrainingInputs, non_empty, non_zero, present, scalar_to_string};

use osprey_core::constants::inputs as keys;
use osprey_core::prelude::*;

use std::collections::BTreeMap;
use tracing::{info, warn};

/// Validates the training inputs of `spec` and builds the creation request for `job`.
///
/// Pure: nothing here talks to the service.
pub fn build_request(
    job: &JobIdentity,
    spec: &Spec,
    catalog: &AlgorithmCatalog,
) -> Result<TrainingJobRequest, ValidationError> {
    let inputs = TrainingInputs::from_spec(spec)?;

    let role_arn = non_empty(&inputs.role).ok_or(ValidationError::MissingInput(keys::ROLE))?;
    let source = algorithm_source(&inputs, catalog)?;
    let input_data_config = channels(&inputs)?;
    let s3_output_path = non_empty(&inputs.model_artifact_path)
        .ok_or(ValidationError::MissingInput("model_artifact_path"))?;

    let max_runtime_in_seconds =
        non_zero(inputs.max_run_time).unwrap_or(defaults::MAX_RUNTIME_SECONDS);
    let spot = spot_settings(&inputs, max_runtime_in_seconds)?;
    let instance_type = instance_type(&inputs)?;

    Ok(TrainingJobRequest {
        training_job_name: job.to_string(),
        role_arn,
        hyper_parameters: hyperparameters(&inputs.hyperparameters)?,
        algorithm_specification: AlgorithmSpecification {
            source,
            training_input_mode: non_empty(&inputs.training_input_mode)
                .unwrap_or_else(|| defaults::TRAINING_INPUT_MODE.to_string()),
            metric_definitions: metric_definitions(&inputs.metric_definitions)?,
        },
        input_data_config,
        output_data_config: OutputDataConfig {
            s3_output_path,
            kms_key_id: non_empty(&inputs.output_encryption_key),
        },
        resource_config: ResourceConfig {
            instance_type,
            instance_count: non_zero(inputs.instance_count).unwrap_or(defaults::INSTANCE_COUNT),
            volume_size_in_gb: non_zero(inputs.volume_size).unwrap_or(defaults::VOLUME_SIZE_GB),
            volume_kms_key_id: non_empty(&inputs.resource_encryption_key),
        },
        vpc_config: vpc_config(&inputs),
        stopping_condition: StoppingCondition {
            max_runtime_in_seconds,
            max_wait_time_in_seconds: spot.as_ref().map(|(wait, _)| *wait),
        },
        tags: tags(&inputs.tags)?,
        enable_network_isolation: inputs.network_isolation.unwrap_or(true),
        enable_inter_container_traffic_encryption: inputs.traffic_encryption.unwrap_or(false),
        enable_managed_spot_training: spot.is_some(),
        checkpoint_config: spot.map(|(_, checkpoint)| checkpoint),
        debug_hook_config: debug_hook_config(&inputs)?,
        debug_rule_configurations: debug_rules(&inputs)?,
    })
}

/// Picks the training image or algorithm resource.
///
/// An explicit image always wins. A built-in algorithm name is swapped for its
/// image; any other name is kept as the caller's own algorithm resource.
fn algorithm_source(
    inputs: &TrainingInputs,
    catalog: &AlgorithmCatalog,
) -> Result<AlgorithmSource, ValidationError> {
    let image = present(&inputs.image);
    let algorithm = present(&inputs.algorithm_name);

    match (image, algorithm) {
        (Some(image), Some(_)) => {
            warn!("Both image and algorithm name were given, only one should be. Proceeding with the image.");
            Ok(AlgorithmSource::Image(image))
        }
        (Some(image), None) => Ok(AlgorithmSource::Image(image)),
        (None, Some(algorithm)) => {
            let region = non_empty(&inputs.region);
            match catalog.lookup(&algorithm, region.as_deref()) {
                Lookup::Image(image) => {
                    info!(%algorithm, %image, "Algorithm name is a built-in algorithm, using its image");
                    Ok(AlgorithmSource::Image(image.to_string()))
                }
                Lookup::UnsupportedRegion => match region {
                    Some(region) => Err(ValidationError::UnsupportedRegion { algorithm, region }),
                    None => Err(ValidationError::MissingInput(keys::REGION)),
                },
                Lookup::Unknown => Ok(AlgorithmSource::AlgorithmName(algorithm)),
            }
        }
        (None, None) => Err(ValidationError::NoAlgorithm),
    }
}

fn channels(inputs: &TrainingInputs) -> Result<Vec<Channel>, ValidationError> {
    if inputs.channels.is_empty() {
        return Err(ValidationError::NoChannels);
    }

    for channel in &inputs.channels {
        if channel.channel_name.trim().is_empty() {
            return Err(ValidationError::invalid(
                keys::CHANNELS,
                "every channel needs a ChannelName",
            ));
        }

        let source = &channel.data_source;
        let reason = match (&source.s3_data_source, &source.file_system_data_source) {
            (Some(s3), None) if s3.s3_uri.trim().is_empty() => Some("an S3Uri in its S3DataSource"),
            (None, Some(fs)) if fs.file_system_id.trim().is_empty() => {
                Some("a FileSystemId in its FileSystemDataSource")
            }
            (Some(_), None) | (None, Some(_)) => None,
            (Some(_), Some(_)) => Some("only one of S3DataSource and FileSystemDataSource"),
            (None, None) => Some("an S3DataSource or a FileSystemDataSource"),
        };
        if let Some(reason) = reason {
            return Err(ValidationError::invalid(
                keys::CHANNELS,
                format!("channel '{}' needs {reason}", channel.channel_name),
            ));
        }
    }

    Ok(inputs.channels.clone())
}

fn hyperparameters(values: &Map<String, Value>) -> Result<BTreeMap<String, String>, ValidationError> {
    values
        .iter()
        .map(|(k, v)| {
            scalar_to_string(keys::HYPERPARAMETERS, v).map(|v| (k.clone(), v))
        })
        .collect()
}

fn metric_definitions(values: &Map<String, Value>) -> Result<Vec<MetricDefinition>, ValidationError> {
    values
        .iter()
        .map(|(name, regex)| match regex {
            Value::String(regex) if !regex.is_empty() => Ok(MetricDefinition {
                name: name.clone(),
                regex: regex.clone(),
            }),
            _ => Err(ValidationError::invalid(
                "metric_definitions",
                format!("metric '{name}' needs a regex string"),
            )),
        })
        .collect()
}

/// Both lists must be present, otherwise the whole block is left out.
fn vpc_config(inputs: &TrainingInputs) -> Option<VpcConfig> {
    let split = |value: &Option<String>| -> Vec<String> {
        value
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    };

    let security_group_ids = split(&inputs.vpc_security_group_ids);
    let subnets = split(&inputs.vpc_subnets);

    if security_group_ids.is_empty() || subnets.is_empty() {
        return None;
    }

    Some(VpcConfig {
        security_group_ids,
        subnets,
    })
}

fn tags(values: &Map<String, Value>) -> Result<Vec<Tag>, ValidationError> {
    values
        .iter()
        .map(|(key, value)| {
            scalar_to_string("tags", value).map(|value| Tag {
                key: key.clone(),
                value,
            })
        })
        .collect()
}

/// Training instances are always `ml.*` types.
fn instance_type(inputs: &TrainingInputs) -> Result<String, ValidationError> {
    match non_empty(&inputs.instance_type) {
        None => Ok(defaults::INSTANCE_TYPE.to_string()),
        Some(instance_type) if instance_type.starts_with("ml.") => Ok(instance_type),
        Some(instance_type) => Err(ValidationError::invalid(
            keys::INSTANCE_TYPE,
            format!("'{instance_type}' is not a training instance type (ml.*)"),
        )),
    }
}

/// An empty hook config is the same as none; anything else needs an output path.
fn debug_hook_config(inputs: &TrainingInputs) -> Result<Option<DebugHookConfig>, ValidationError> {
    let Some(hook) = &inputs.debug_hook_config else {
        return Ok(None);
    };

    let empty = hook.local_path.is_none()
        && hook.hook_parameters.is_empty()
        && hook.collection_configurations.is_empty();

    match (hook.s3_output_path.trim().is_empty(), empty) {
        (true, true) => Ok(None),
        (true, false) => Err(ValidationError::invalid(
            keys::DEBUG_HOOK_CONFIG,
            "needs an S3OutputPath",
        )),
        (false, _) => Ok(Some(hook.clone())),
    }
}

fn debug_rules(inputs: &TrainingInputs) -> Result<Vec<DebugRuleConfiguration>, ValidationError> {
    for rule in &inputs.debug_rule_config {
        if rule.rule_configuration_name.trim().is_empty()
            || rule.rule_evaluator_image.trim().is_empty()
        {
            return Err(ValidationError::invalid(
                keys::DEBUG_RULE_CONFIG,
                "every rule needs a RuleConfigurationName and a RuleEvaluatorImage",
            ));
        }
    }

    Ok(inputs.debug_rule_config.clone())
}

/// Returns the wait time and checkpoint config when spot training is enabled.
fn spot_settings(
    inputs: &TrainingInputs,
    max_runtime: u32,
) -> Result<Option<(u32, CheckpointConfig)>, ValidationError> {
    if !inputs.spot_instance {
        return Ok(None);
    }

    let max_wait = non_zero(inputs.max_wait_time)
        .ok_or_else(|| ValidationError::Spot(format!("'{}' to be set", keys::MAX_WAIT_TIME)))?;

    if max_wait < max_runtime {
        return Err(ValidationError::Spot(format!(
            "'{}' ({max_wait}s) to be at least the max run time ({max_runtime}s)",
            keys::MAX_WAIT_TIME
        )));
    }

    let checkpoint = inputs
        .checkpoint_config
        .clone()
        .filter(|c| !c.s3_uri.trim().is_empty())
        .ok_or_else(|| {
            ValidationError::Spot(format!("'{}' with an S3Uri", keys::CHECKPOINT_CONFIG))
        })?;

    Ok(Some((max_wait, checkpoint)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn required() -> Spec {
        Spec::from_value(json!({
            "region": "us-west-2",
            "role": "arn:aws:iam::123456789012:user/Development/product_1234/*",
            "image": "test-image",
            "channels": [{
                "ChannelName": "train",
                "DataSource": { "S3DataSource": {
                    "S3Uri": "s3://fake-bucket/data",
                    "S3DataType": "S3Prefix",
                    "S3DataDistributionType": "FullyReplicated"
                }},
                "ContentType": "",
                "CompressionType": "None",
                "RecordWrapperType": "None",
                "InputMode": "File"
            }],
            "instance_type": "ml.m4.xlarge",
            "instance_count": 1,
            "volume_size": 50,
            "max_run_time": 3600,
            "model_artifact_path": "test-path"
        }))
        .unwrap()
    }

    fn build(spec: &Spec) -> Result<TrainingJobRequest, ValidationError> {
        build_request(&JobIdentity::new("test-job"), spec, &AlgorithmCatalog::builtin())
    }

    fn to_json(request: &TrainingJobRequest) -> Value {
        serde_json::to_value(request).unwrap()
    }

    fn without(spec: Spec, key: &str) -> Spec {
        let mut inputs = spec.inputs().clone();
        inputs.remove(key);
        Spec::new(inputs)
    }

    #[test]
    fn required_inputs_get_reasonable_defaults() {
        let request = build(&required()).unwrap();
        let value = to_json(&request);

        assert!(!request.enable_managed_spot_training);
        assert!(request.hyper_parameters.is_empty());
        assert!(request.enable_network_isolation);
        assert!(!request.enable_inter_container_traffic_encryption);
        assert!(value.get("VpcConfig").is_none());
        assert!(value["AlgorithmSpecification"].get("MetricDefinitions").is_none());
        assert!(value.get("CheckpointConfig").is_none());
        assert!(value["StoppingCondition"].get("MaxWaitTimeInSeconds").is_none());
        assert_eq!(value["TrainingJobName"], "test-job");
        assert_eq!(value["AlgorithmSpecification"]["TrainingInputMode"], "File");
        assert_eq!(value["OutputDataConfig"]["S3OutputPath"], "test-path");
        assert_eq!(value["ResourceConfig"]["VolumeSizeInGB"], 50);
        assert_eq!(value["StoppingCondition"]["MaxRuntimeInSeconds"], 3600);
    }

    #[test]
    fn image_only_request_has_no_algorithm_name_or_tags() {
        let value = to_json(&build(&required()).unwrap());
        let algorithm = &value["AlgorithmSpecification"];

        assert_eq!(algorithm["TrainingImage"], "test-image");
        assert!(algorithm.get("AlgorithmName").is_none());
        assert!(value.get("Tags").is_none());
    }

    #[test]
    fn zero_channels_is_rejected() {
        let spec = required().with_input("channels", json!([]));
        assert_eq!(build(&spec), Err(ValidationError::NoChannels));

        let spec = without(required(), "channels");
        assert_eq!(build(&spec), Err(ValidationError::NoChannels));
    }

    #[test]
    fn channel_without_uri_is_rejected() {
        let spec = required().with_input(
            "channels",
            json!([{ "ChannelName": "train", "DataSource": {} }]),
        );
        assert!(matches!(build(&spec), Err(ValidationError::InvalidInput { .. })));
    }

    #[test]
    fn file_system_channel_needs_no_s3_uri() {
        let spec = required().with_input(
            "channels",
            json!([{
                "ChannelName": "train",
                "DataSource": { "FileSystemDataSource": {
                    "FileSystemId": "fs-1",
                    "FileSystemAccessMode": "ro",
                    "FileSystemType": "EFS",
                    "DirectoryPath": "/train"
                }}
            }]),
        );
        let value = to_json(&build(&spec).unwrap());

        assert_eq!(
            value["InputDataConfig"][0]["DataSource"]["FileSystemDataSource"]["FileSystemId"],
            "fs-1"
        );
    }

    #[test]
    fn channel_with_both_sources_is_rejected() {
        let spec = required().with_input(
            "channels",
            json!([{
                "ChannelName": "train",
                "DataSource": {
                    "S3DataSource": { "S3Uri": "s3://b/t", "S3DataType": "S3Prefix" },
                    "FileSystemDataSource": {
                        "FileSystemId": "fs-1",
                        "FileSystemAccessMode": "ro",
                        "FileSystemType": "EFS",
                        "DirectoryPath": "/train"
                    }
                }
            }]),
        );
        assert!(matches!(build(&spec), Err(ValidationError::InvalidInput { .. })));
    }

    #[test]
    fn channel_options_reach_the_request() {
        let channel = json!({
            "ChannelName": "train",
            "DataSource": { "S3DataSource": {
                "S3DataType": "S3Prefix",
                "S3Uri": "s3://b/t",
                "InstanceGroupNames": ["group-a"]
            }},
            "ShuffleConfig": { "Seed": 7 }
        });
        let spec = required().with_input("channels", json!([channel.clone()]));

        assert_eq!(to_json(&build(&spec).unwrap())["InputDataConfig"][0], channel);
    }

    #[test]
    fn unknown_channel_keys_are_rejected() {
        let spec = required().with_input(
            "channels",
            json!([{
                "ChannelName": "train",
                "DataSource": { "S3DataSource": { "S3Uri": "s3://b/t", "S3DataType": "S3Prefix" }},
                "Shuffle": true
            }]),
        );
        assert!(matches!(build(&spec), Err(ValidationError::InvalidInput { .. })));
    }

    #[test]
    fn missing_image_and_algorithm_is_rejected() {
        let spec = without(required(), "image");
        assert_eq!(build(&spec), Err(ValidationError::NoAlgorithm));
    }

    #[test]
    fn missing_role_is_rejected() {
        let spec = without(required(), "role");
        assert_eq!(build(&spec), Err(ValidationError::MissingInput("role")));
    }

    #[test]
    fn image_wins_over_algorithm_name() {
        let spec = required().with_input("algorithm_name", "xgboost");
        let value = to_json(&build(&spec).unwrap());

        assert_eq!(value["AlgorithmSpecification"]["TrainingImage"], "test-image");
        assert!(value["AlgorithmSpecification"].get("AlgorithmName").is_none());
    }

    #[yare::parameterized(
        canonical = { "xgboost" },
        mixed_case = { "XGBoost" },
        padded = { "  xgboost  " },
    )]
    fn builtin_algorithm_resolves_to_catalog_image(name: &str) {
        let spec = without(required(), "image").with_input("algorithm_name", name);
        let value = to_json(&build(&spec).unwrap());
        let algorithm = &value["AlgorithmSpecification"];

        assert_eq!(
            algorithm["TrainingImage"],
            "433757028032.dkr.ecr.us-west-2.amazonaws.com/xgboost:1"
        );
        assert!(algorithm.get("AlgorithmName").is_none());
    }

    #[test]
    fn display_name_resolves_like_canonical() {
        let spec = without(required(), "image").with_input("algorithm_name", "Linear Learner");
        let value = to_json(&build(&spec).unwrap());

        assert_eq!(
            value["AlgorithmSpecification"]["TrainingImage"],
            "174872318107.dkr.ecr.us-west-2.amazonaws.com/linear-learner:1"
        );
    }

    #[test]
    fn custom_algorithm_keeps_its_name() {
        let spec = without(required(), "image").with_input("algorithm_name", "My-Algorithm");
        let value = to_json(&build(&spec).unwrap());
        let algorithm = &value["AlgorithmSpecification"];

        assert_eq!(algorithm["AlgorithmName"], "My-Algorithm");
        assert!(algorithm.get("TrainingImage").is_none());
    }

    #[test]
    fn builtin_algorithm_outside_its_regions_is_rejected() {
        let spec = without(required(), "image")
            .with_input("algorithm_name", "lda")
            .with_input("region", "ap-south-1");
        assert!(matches!(
            build(&spec),
            Err(ValidationError::UnsupportedRegion { .. })
        ));
    }

    #[test]
    fn builtin_algorithm_without_region_asks_for_one() {
        let spec = without(without(required(), "image"), "region")
            .with_input("algorithm_name", "xgboost");
        assert_eq!(build(&spec), Err(ValidationError::MissingInput("region")));
    }

    #[test]
    fn custom_algorithm_and_image_are_not_rewritten() {
        let spec = without(required(), "image").with_input("algorithm_name", " My-Algorithm ");
        let value = to_json(&build(&spec).unwrap());
        assert_eq!(value["AlgorithmSpecification"]["AlgorithmName"], " My-Algorithm ");

        let spec = required().with_input("image", "registry/image:1 ");
        let value = to_json(&build(&spec).unwrap());
        assert_eq!(value["AlgorithmSpecification"]["TrainingImage"], "registry/image:1 ");
    }

    #[yare::parameterized(
        not_ml   = { "m4.xlarge" },
        made_up  = { "invalid-instance" },
    )]
    fn non_training_instance_types_are_rejected(instance_type: &str) {
        let spec = required().with_input("instance_type", instance_type);
        assert!(matches!(
            build(&spec),
            Err(ValidationError::InvalidInput { key, .. }) if key == "instance_type"
        ));
    }

    #[test]
    fn debugger_configs_are_added() {
        let spec = required()
            .with_input(
                "debug_hook_config",
                json!({
                    "S3OutputPath": "s3://bucket/hook_config",
                    "CollectionConfigurations": [
                        { "CollectionName": "losses", "CollectionParameters": { "save_interval": "10" } }
                    ]
                }),
            )
            .with_input(
                "debug_rule_config",
                json!([{
                    "RuleConfigurationName": "LossNotDecreasing",
                    "RuleEvaluatorImage": "895741380848.dkr.ecr.us-west-2.amazonaws.com/sagemaker-debugger-rules:latest",
                    "RuleParameters": { "rule_to_invoke": "LossNotDecreasing" }
                }]),
            );
        let value = to_json(&build(&spec).unwrap());

        assert_eq!(value["DebugHookConfig"]["S3OutputPath"], "s3://bucket/hook_config");
        assert_eq!(
            value["DebugHookConfig"]["CollectionConfigurations"][0]["CollectionParameters"]["save_interval"],
            "10"
        );
        assert_eq!(
            value["DebugRuleConfigurations"][0]["RuleConfigurationName"],
            "LossNotDecreasing"
        );
    }

    #[test]
    fn empty_debugger_configs_are_omitted() {
        let spec = required()
            .with_input("debug_hook_config", json!({}))
            .with_input("debug_rule_config", json!([]));
        let value = to_json(&build(&spec).unwrap());

        assert!(value.get("DebugHookConfig").is_none());
        assert!(value.get("DebugRuleConfigurations").is_none());
    }

    #[test]
    fn debug_hook_without_output_path_is_rejected() {
        let spec = required().with_input(
            "debug_hook_config",
            json!({ "HookParameters": { "save_all": "true" } }),
        );
        assert!(matches!(build(&spec), Err(ValidationError::InvalidInput { .. })));
    }

    #[test]
    fn metric_definitions_keep_input_order() {
        let spec = required().with_input(
            "metric_definitions",
            json!({ "metric1": "regexval1", "metric2": "regexval2" }),
        );
        let request = build(&spec).unwrap();

        assert_eq!(
            request.algorithm_specification.metric_definitions,
            vec![
                MetricDefinition { name: "metric1".into(), regex: "regexval1".into() },
                MetricDefinition { name: "metric2".into(), regex: "regexval2".into() },
            ]
        );
    }

    #[test]
    fn hyperparameters_are_rendered_as_strings() {
        let spec = required().with_input(
            "hyperparameters",
            json!({ "hp1": "val1", "num_round": 50, "verbose": false }),
        );
        let request = build(&spec).unwrap();

        assert_eq!(request.hyper_parameters["hp1"], "val1");
        assert_eq!(request.hyper_parameters["num_round"], "50");
        assert_eq!(request.hyper_parameters["verbose"], "false");
    }

    #[test]
    fn nested_hyperparameters_are_rejected() {
        let spec = required().with_input(
            "hyperparameters",
            json!({ "hp1": { "innerkey": "innerval" } }),
        );
        assert!(matches!(build(&spec), Err(ValidationError::InvalidInput { .. })));
    }

    #[test]
    fn vpc_config_needs_both_lists() {
        let spec = required()
            .with_input("vpc_security_group_ids", "sg1,sg2")
            .with_input("vpc_subnets", "subnet1, subnet2");
        let vpc = build(&spec).unwrap().vpc_config.unwrap();
        assert_eq!(vpc.security_group_ids, ["sg1", "sg2"]);
        assert_eq!(vpc.subnets, ["subnet1", "subnet2"]);

        let spec = required().with_input("vpc_security_group_ids", "sg1,sg2");
        assert_eq!(build(&spec).unwrap().vpc_config, None);
    }

    #[test]
    fn training_mode_is_passed_through() {
        let spec = required().with_input("training_input_mode", "Pipe");
        let request = build(&spec).unwrap();
        assert_eq!(request.algorithm_specification.training_input_mode, "Pipe");
    }

    #[test]
    fn zero_overrides_keep_defaults() {
        let spec = required()
            .with_input("instance_count", 0)
            .with_input("volume_size", 0)
            .with_input("max_run_time", 0);
        let request = build(&spec).unwrap();

        assert_eq!(request.resource_config.instance_count, defaults::INSTANCE_COUNT);
        assert_eq!(request.resource_config.volume_size_in_gb, defaults::VOLUME_SIZE_GB);
        assert_eq!(
            request.stopping_condition.max_runtime_in_seconds,
            defaults::MAX_RUNTIME_SECONDS
        );
    }

    #[test]
    fn empty_encryption_keys_are_omitted() {
        let spec = required()
            .with_input("output_encryption_key", "")
            .with_input("resource_encryption_key", "kms-key");
        let value = to_json(&build(&spec).unwrap());

        assert!(value["OutputDataConfig"].get("KmsKeyId").is_none());
        assert_eq!(value["ResourceConfig"]["VolumeKmsKeyId"], "kms-key");
    }

    #[test]
    fn tags_are_appended() {
        let spec = required().with_input("tags", json!({ "team": "ml", "cost-center": 42 }));
        let request = build(&spec).unwrap();

        assert_eq!(
            request.tags,
            vec![
                Tag { key: "team".into(), value: "ml".into() },
                Tag { key: "cost-center".into(), value: "42".into() },
            ]
        );
    }

    #[test]
    fn spot_requires_wait_time_and_checkpoint() {
        let no_wait = required().with_input("spot_instance", true);
        let no_checkpoint = no_wait.clone().with_input("max_wait_time", 3600);
        let no_uri = no_checkpoint
            .clone()
            .with_input("checkpoint_config", json!({}));

        for spec in [no_wait, no_checkpoint, no_uri] {
            assert!(matches!(build(&spec), Err(ValidationError::Spot(_))));
        }
    }

    #[test]
    fn spot_wait_time_below_run_time_is_rejected() {
        let spec = required()
            .with_input("spot_instance", true)
            .with_input("max_wait_time", 3599)
            .with_input(
                "checkpoint_config",
                json!({ "S3Uri": "s3://fake-uri/", "LocalPath": "local-path" }),
            );
        assert!(matches!(build(&spec), Err(ValidationError::Spot(_))));
    }

    #[test]
    fn spot_settings_are_added() {
        let spec = required()
            .with_input("spot_instance", true)
            .with_input("max_wait_time", 3600)
            .with_input(
                "checkpoint_config",
                json!({ "S3Uri": "s3://fake-uri/", "LocalPath": "local-path" }),
            );
        let value = to_json(&build(&spec).unwrap());

        assert_eq!(value["EnableManagedSpotTraining"], true);
        assert_eq!(value["StoppingCondition"]["MaxWaitTimeInSeconds"], 3600);
        assert_eq!(value["CheckpointConfig"]["S3Uri"], "s3://fake-uri/");
        assert_eq!(value["CheckpointConfig"]["LocalPath"], "local-path");
    }

    fn assert_no_empty_strings(value: &Value) {
        match value {
            Value::String(s) => assert!(!s.is_empty(), "request contains an empty string"),
            Value::Array(items) => items.iter().for_each(assert_no_empty_strings),
            Value::Object(map) => map.values().for_each(assert_no_empty_strings),
            _ => {}
        }
    }

    #[test]
    fn request_never_contains_empty_strings() {
        let spec = required()
            .with_input("spot_instance", true)
            .with_input("max_wait_time", 3600)
            .with_input("checkpoint_config", json!({ "S3Uri": "s3://fake-uri/", "LocalPath": "" }))
            .with_input("output_encryption_key", "")
            .with_input("vpc_subnets", "");
        assert_no_empty_strings(&to_json(&build(&spec).unwrap()));
    }
}
