use osprey_core::prelude::*;

use serde::Deserialize;

/// The caller-facing inputs of a training job, as found in [`Spec::inputs`].
///
/// Every field is optional at this level; [`build_request`](crate::request::build_request)
/// decides what is required and what falls back to a default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrainingInputs {
    pub region: Option<String>,
    pub role: Option<String>,
    pub hyperparameters: Map<String, Value>,
    pub image: Option<String>,
    pub algorithm_name: Option<String>,
    pub training_input_mode: Option<String>,
    /// Metric name -> regex.
    pub metric_definitions: Map<String, Value>,
    /// Comma-separated security group ids.
    pub vpc_security_group_ids: Option<String>,
    /// Comma-separated subnet ids.
    pub vpc_subnets: Option<String>,
    pub channels: Vec<Channel>,
    pub model_artifact_path: Option<String>,
    pub output_encryption_key: Option<String>,
    pub instance_type: Option<String>,
    pub instance_count: Option<u32>,
    pub volume_size: Option<u32>,
    pub resource_encryption_key: Option<String>,
    pub max_run_time: Option<u32>,
    pub network_isolation: Option<bool>,
    pub traffic_encryption: Option<bool>,
    pub spot_instance: bool,
    pub max_wait_time: Option<u32>,
    pub checkpoint_config: Option<CheckpointConfig>,
    pub tags: Map<String, Value>,
    pub debug_hook_config: Option<DebugHookConfig>,
    pub debug_rule_config: Vec<DebugRuleConfiguration>,
}

impl TrainingInputs {
    pub fn from_spec(spec: &Spec) -> Result<Self, ValidationError> {
        spec.inputs_as()
            .map_err(|e| ValidationError::invalid("inputs", e.to_string()))
    }
}

/// Trims a string input, treating blank strings as absent.
pub(crate) fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Like [`non_empty`], but keeps the value exactly as the caller wrote it.
pub(crate) fn present(value: &Option<String>) -> Option<String> {
    value.clone().filter(|s| !s.trim().is_empty())
}

/// Treats zero as "use the default".
pub(crate) fn non_zero(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v > 0)
}

/// Renders a flat map value as the string the service expects.
///
/// Strings pass through, numbers and booleans are formatted; anything nested is rejected.
pub(crate) fn scalar_to_string(key: &str, value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => Err(ValidationError::invalid(
            key,
            "values must be strings, numbers or booleans",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_keys_take_defaults() {
        let inputs = TrainingInputs::from_spec(&Spec::default()).unwrap();
        assert!(inputs.channels.is_empty());
        assert!(!inputs.spot_instance);
        assert_eq!(inputs.instance_count, None);
    }

    #[test]
    fn wrong_types_are_validation_errors() {
        let spec = Spec::default().with_input("instance_count", "two");
        assert!(matches!(
            TrainingInputs::from_spec(&spec),
            Err(ValidationError::InvalidInput { .. })
        ));
    }

    #[yare::parameterized(
        string = { json!("0.1"), Some("0.1") },
        int    = { json!(10), Some("10") },
        float  = { json!(0.5), Some("0.5") },
        bool   = { json!(true), Some("true") },
        null   = { json!(null), None },
        nested = { json!({ "innerkey": "innerval" }), None },
        list   = { json!(["a"]), None },
    )]
    fn scalar_rendering(value: Value, expected: Option<&str>) {
        assert_eq!(
            scalar_to_string("hp", &value).ok().as_deref(),
            expected
        );
    }
}
