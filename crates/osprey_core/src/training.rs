//! Wire-level types of the SageMaker training API.
//!
//! Field names serialize exactly as the service spells them, so a request can be
//! printed, diffed or replayed as-is.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Request to create a training job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrainingJobRequest {
    pub training_job_name: String,
    pub role_arn: String,
    #[serde(default)]
    pub hyper_parameters: BTreeMap<String, String>,
    pub algorithm_specification: AlgorithmSpecification,
    pub input_data_config: Vec<Channel>,
    pub output_data_config: OutputDataConfig,
    pub resource_config: ResourceConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vpc_config: Option<VpcConfig>,
    pub stopping_condition: StoppingCondition,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    pub enable_network_isolation: bool,
    pub enable_inter_container_traffic_encryption: bool,
    pub enable_managed_spot_training: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkpoint_config: Option<CheckpointConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_hook_config: Option<DebugHookConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub debug_rule_configurations: Vec<DebugRuleConfiguration>,
}

/// Where the training code comes from. A request carries exactly one of the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlgorithmSource {
    #[serde(rename = "TrainingImage")]
    Image(String),
    #[serde(rename = "AlgorithmName")]
    AlgorithmName(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AlgorithmSpecification {
    #[serde(flatten)]
    pub source: AlgorithmSource,
    pub training_input_mode: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metric_definitions: Vec<MetricDefinition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetricDefinition {
    pub name: String,
    pub regex: String,
}

/// An input channel, taken from the caller's `channels` input.
///
/// Covers every field of the service's channel shape; keys it does not know are
/// refused instead of being dropped on the way to the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct Channel {
    pub channel_name: String,
    pub data_source: DataSource,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub compression_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub record_wrapper_type: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub input_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle_config: Option<ShuffleConfig>,
}

/// Where a channel reads from. A valid channel sets exactly one source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSource {
    #[serde(
        default,
        rename = "S3DataSource",
        skip_serializing_if = "Option::is_none"
    )]
    pub s3_data_source: Option<S3DataSource>,
    #[serde(
        default,
        rename = "FileSystemDataSource",
        skip_serializing_if = "Option::is_none"
    )]
    pub file_system_data_source: Option<FileSystemDataSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct S3DataSource {
    #[serde(rename = "S3DataType")]
    pub s3_data_type: String,
    #[serde(rename = "S3Uri")]
    pub s3_uri: String,
    #[serde(
        default,
        rename = "S3DataDistributionType",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub s3_data_distribution_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_group_names: Option<Vec<String>>,
}

/// An EFS or FSx for Lustre file system mounted into the training container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct FileSystemDataSource {
    pub file_system_id: String,
    /// `rw` or `ro`.
    pub file_system_access_mode: String,
    /// `EFS` or `FSxLustre`.
    pub file_system_type: String,
    pub directory_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct ShuffleConfig {
    pub seed: i64,
}

/// Where the debugger hook writes tensors, and which collections it saves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DebugHookConfig {
    #[serde(rename = "S3OutputPath", default)]
    pub s3_output_path: String,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub local_path: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hook_parameters: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collection_configurations: Vec<CollectionConfiguration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct CollectionConfiguration {
    pub collection_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub collection_parameters: BTreeMap<String, String>,
}

/// A debugger rule evaluated alongside the training job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", deny_unknown_fields)]
pub struct DebugRuleConfiguration {
    pub rule_configuration_name: String,
    pub rule_evaluator_image: String,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub local_path: Option<String>,
    #[serde(
        default,
        rename = "S3OutputPath",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub s3_output_path: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub instance_type: Option<String>,
    #[serde(
        default,
        rename = "VolumeSizeInGB",
        skip_serializing_if = "Option::is_none"
    )]
    pub volume_size_in_gb: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rule_parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDataConfig {
    #[serde(rename = "S3OutputPath")]
    pub s3_output_path: String,
    #[serde(
        default,
        rename = "KmsKeyId",
        skip_serializing_if = "Option::is_none"
    )]
    pub kms_key_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceConfig {
    pub instance_type: String,
    pub instance_count: u32,
    #[serde(rename = "VolumeSizeInGB")]
    pub volume_size_in_gb: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_kms_key_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct VpcConfig {
    pub security_group_ids: Vec<String>,
    pub subnets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoppingCondition {
    pub max_runtime_in_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_wait_time_in_seconds: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointConfig {
    #[serde(rename = "S3Uri", default)]
    pub s3_uri: String,
    #[serde(
        rename = "LocalPath",
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub local_path: Option<String>,
}

/// Raw training job status as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrainingJobStatus {
    InProgress,
    Completed,
    Failed,
    Stopping,
    Stopped,
    /// A status this client does not know about.
    Unknown(String),
}

impl From<&str> for TrainingJobStatus {
    fn from(value: &str) -> Self {
        match value {
            "InProgress" => Self::InProgress,
            "Completed" => Self::Completed,
            "Failed" => Self::Failed,
            "Stopping" => Self::Stopping,
            "Stopped" => Self::Stopped,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// The parts of a training job description the pipeline step reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingJobDescription {
    pub job_name: String,
    pub status: TrainingJobStatus,
    pub secondary_status: Option<String>,
    pub failure_reason: Option<String>,
    /// S3 location of the model artifacts, set once the job completed.
    pub model_artifacts: Option<String>,
    pub training_image: Option<String>,
    pub algorithm_name: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn channel_drops_empty_strings() {
        let channel: Channel = serde_json::from_value(json!({
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
        }))
        .unwrap();

        assert_eq!(channel.content_type, None);
        assert_eq!(channel.compression_type.as_deref(), Some("None"));

        let value = serde_json::to_value(&channel).unwrap();
        assert!(value.get("ContentType").is_none());
        assert_eq!(
            value["DataSource"]["S3DataSource"]["S3DataDistributionType"],
            "FullyReplicated"
        );
    }

    #[test]
    fn channel_keeps_shuffle_and_instance_groups() {
        let input = json!({
            "ChannelName": "train",
            "DataSource": { "S3DataSource": {
                "S3Uri": "s3://b/t",
                "S3DataType": "S3Prefix",
                "InstanceGroupNames": ["group-a"]
            }},
            "ShuffleConfig": { "Seed": 7 }
        });
        let channel: Channel = serde_json::from_value(input.clone()).unwrap();

        assert_eq!(channel.shuffle_config, Some(ShuffleConfig { seed: 7 }));
        assert_eq!(serde_json::to_value(&channel).unwrap(), input);
    }

    #[test]
    fn file_system_channel_round_trips() {
        let input = json!({
            "ChannelName": "train",
            "DataSource": { "FileSystemDataSource": {
                "FileSystemId": "fs-1",
                "FileSystemAccessMode": "ro",
                "FileSystemType": "EFS",
                "DirectoryPath": "/data/train"
            }}
        });
        let channel: Channel = serde_json::from_value(input.clone()).unwrap();

        assert_eq!(channel.data_source.s3_data_source, None);
        assert_eq!(serde_json::to_value(&channel).unwrap(), input);
    }

    #[test]
    fn unknown_channel_keys_are_refused() {
        let err = serde_json::from_value::<Channel>(json!({
            "ChannelName": "train",
            "DataSource": { "S3DataSource": { "S3Uri": "s3://b/t", "S3DataType": "S3Prefix" }},
            "ShuffleSeed": 7
        }))
        .unwrap_err();

        assert!(err.to_string().contains("ShuffleSeed"));
    }

    #[test]
    fn algorithm_source_flattens_into_specification() {
        let spec = AlgorithmSpecification {
            source: AlgorithmSource::Image("test-image".into()),
            training_input_mode: "File".into(),
            metric_definitions: vec![],
        };

        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            value,
            json!({ "TrainingImage": "test-image", "TrainingInputMode": "File" })
        );
    }

    #[test]
    fn unknown_status_is_preserved() {
        assert_eq!(
            TrainingJobStatus::from("Paused"),
            TrainingJobStatus::Unknown("Paused".into())
        );
        assert_eq!(TrainingJobStatus::from("Stopped"), TrainingJobStatus::Stopped);
    }
}
