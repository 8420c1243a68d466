//! Wire types to SDK builders.

use crate::error::int;

use osprey_core::prelude::*;

use aws_sdk_sagemaker::types::{
    AlgorithmSpecification as SdkAlgorithmSpecification, Channel as SdkChannel,
    CheckpointConfig as SdkCheckpointConfig, CollectionConfiguration as SdkCollectionConfiguration,
    CompressionType, DataSource as SdkDataSource, DebugHookConfig as SdkDebugHookConfig,
    DebugRuleConfiguration as SdkDebugRuleConfiguration, FileSystemAccessMode,
    FileSystemDataSource as SdkFileSystemDataSource, FileSystemType,
    MetricDefinition as SdkMetricDefinition, OutputDataConfig as SdkOutputDataConfig,
    ProcessingInstanceType, RecordWrapper, ResourceConfig as SdkResourceConfig,
    S3DataDistribution, S3DataSource as SdkS3DataSource, S3DataType,
    ShuffleConfig as SdkShuffleConfig, StoppingCondition as SdkStoppingCondition, Tag as SdkTag,
    TrainingInputMode, TrainingInstanceType, VpcConfig as SdkVpcConfig,
};
use std::collections::{BTreeMap, HashMap};

fn rejected(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::Rejected(e.to_string())
}

/// Empty maps are left out of the request.
fn string_map(map: &BTreeMap<String, String>) -> Option<HashMap<String, String>> {
    (!map.is_empty()).then(|| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
}

pub(crate) fn algorithm_specification(
    spec: &AlgorithmSpecification,
) -> Result<SdkAlgorithmSpecification, ServiceError> {
    let metrics = spec
        .metric_definitions
        .iter()
        .map(|m| {
            SdkMetricDefinition::builder()
                .name(&m.name)
                .regex(&m.regex)
                .build()
                .map_err(rejected)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let builder = match &spec.source {
        AlgorithmSource::Image(image) => SdkAlgorithmSpecification::builder().training_image(image),
        AlgorithmSource::AlgorithmName(name) => {
            SdkAlgorithmSpecification::builder().algorithm_name(name)
        }
    };

    builder
        .training_input_mode(TrainingInputMode::from(spec.training_input_mode.as_str()))
        .set_metric_definitions((!metrics.is_empty()).then_some(metrics))
        .build()
        .map_err(rejected)
}

pub(crate) fn channel(channel: &Channel) -> Result<SdkChannel, ServiceError> {
    let s3 = channel
        .data_source
        .s3_data_source
        .as_ref()
        .map(|s3| {
            SdkS3DataSource::builder()
                .s3_data_type(S3DataType::from(s3.s3_data_type.as_str()))
                .s3_uri(&s3.s3_uri)
                .set_s3_data_distribution_type(
                    s3.s3_data_distribution_type
                        .as_deref()
                        .map(S3DataDistribution::from),
                )
                .set_attribute_names(s3.attribute_names.clone())
                .set_instance_group_names(s3.instance_group_names.clone())
                .build()
                .map_err(rejected)
        })
        .transpose()?;

    let file_system = channel
        .data_source
        .file_system_data_source
        .as_ref()
        .map(|fs| {
            SdkFileSystemDataSource::builder()
                .file_system_id(&fs.file_system_id)
                .file_system_access_mode(FileSystemAccessMode::from(
                    fs.file_system_access_mode.as_str(),
                ))
                .file_system_type(FileSystemType::from(fs.file_system_type.as_str()))
                .directory_path(&fs.directory_path)
                .build()
                .map_err(rejected)
        })
        .transpose()?;

    SdkChannel::builder()
        .channel_name(&channel.channel_name)
        .data_source(
            SdkDataSource::builder()
                .set_s3_data_source(s3)
                .set_file_system_data_source(file_system)
                .build(),
        )
        .set_content_type(channel.content_type.clone())
        .set_compression_type(channel.compression_type.as_deref().map(CompressionType::from))
        .set_record_wrapper_type(channel.record_wrapper_type.as_deref().map(RecordWrapper::from))
        .set_input_mode(channel.input_mode.as_deref().map(TrainingInputMode::from))
        .set_shuffle_config(
            channel
                .shuffle_config
                .map(|shuffle| SdkShuffleConfig::builder().seed(shuffle.seed).build()),
        )
        .build()
        .map_err(rejected)
}

pub(crate) fn output_data_config(
    config: &OutputDataConfig,
) -> Result<SdkOutputDataConfig, ServiceError> {
    SdkOutputDataConfig::builder()
        .s3_output_path(&config.s3_output_path)
        .set_kms_key_id(config.kms_key_id.clone())
        .build()
        .map_err(rejected)
}

pub(crate) fn resource_config(config: &ResourceConfig) -> Result<SdkResourceConfig, ServiceError> {
    SdkResourceConfig::builder()
        .instance_type(TrainingInstanceType::from(config.instance_type.as_str()))
        .instance_count(int("InstanceCount", config.instance_count)?)
        .volume_size_in_gb(int("VolumeSizeInGB", config.volume_size_in_gb)?)
        .set_volume_kms_key_id(config.volume_kms_key_id.clone())
        .build()
        .map_err(rejected)
}

pub(crate) fn vpc_config(config: &VpcConfig) -> Result<SdkVpcConfig, ServiceError> {
    SdkVpcConfig::builder()
        .set_security_group_ids(Some(config.security_group_ids.clone()))
        .set_subnets(Some(config.subnets.clone()))
        .build()
        .map_err(rejected)
}

pub(crate) fn stopping_condition(
    condition: &StoppingCondition,
) -> Result<SdkStoppingCondition, ServiceError> {
    Ok(SdkStoppingCondition::builder()
        .max_runtime_in_seconds(int("MaxRuntimeInSeconds", condition.max_runtime_in_seconds)?)
        .set_max_wait_time_in_seconds(
            condition
                .max_wait_time_in_seconds
                .map(|v| int("MaxWaitTimeInSeconds", v))
                .transpose()?,
        )
        .build())
}

pub(crate) fn tag(tag: &Tag) -> Result<SdkTag, ServiceError> {
    SdkTag::builder()
        .key(&tag.key)
        .value(&tag.value)
        .build()
        .map_err(rejected)
}

pub(crate) fn checkpoint_config(
    config: &CheckpointConfig,
) -> Result<SdkCheckpointConfig, ServiceError> {
    SdkCheckpointConfig::builder()
        .s3_uri(&config.s3_uri)
        .set_local_path(config.local_path.clone())
        .build()
        .map_err(rejected)
}

pub(crate) fn debug_hook_config(
    config: &DebugHookConfig,
) -> Result<SdkDebugHookConfig, ServiceError> {
    let collections = config
        .collection_configurations
        .iter()
        .map(|c| {
            SdkCollectionConfiguration::builder()
                .collection_name(&c.collection_name)
                .set_collection_parameters(string_map(&c.collection_parameters))
                .build()
        })
        .collect::<Vec<_>>();

    SdkDebugHookConfig::builder()
        .s3_output_path(&config.s3_output_path)
        .set_local_path(config.local_path.clone())
        .set_hook_parameters(string_map(&config.hook_parameters))
        .set_collection_configurations((!collections.is_empty()).then_some(collections))
        .build()
        .map_err(rejected)
}

pub(crate) fn debug_rule_configuration(
    rule: &DebugRuleConfiguration,
) -> Result<SdkDebugRuleConfiguration, ServiceError> {
    SdkDebugRuleConfiguration::builder()
        .rule_configuration_name(&rule.rule_configuration_name)
        .rule_evaluator_image(&rule.rule_evaluator_image)
        .set_local_path(rule.local_path.clone())
        .set_s3_output_path(rule.s3_output_path.clone())
        .set_instance_type(rule.instance_type.as_deref().map(ProcessingInstanceType::from))
        .set_volume_size_in_gb(
            rule.volume_size_in_gb
                .map(|v| int("VolumeSizeInGB", v))
                .transpose()?,
        )
        .set_rule_parameters(string_map(&rule.rule_parameters))
        .build()
        .map_err(rejected)
}
