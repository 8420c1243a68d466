use crate::error::SpecError;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub use serde_json::{Map, Value};

/// The caller's inputs and the outputs handed to downstream steps.
///
/// Inputs keep their insertion order. Outputs stay empty until a job succeeds
/// and every key can be written only once.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spec {
    inputs: Map<String, Value>,
    #[serde(default)]
    outputs: Map<String, Value>,
}

impl Spec {
    pub fn new(inputs: Map<String, Value>) -> Self {
        Self {
            inputs,
            outputs: Map::new(),
        }
    }

    /// Builds a spec from a JSON object of inputs.
    pub fn from_value(inputs: Value) -> Result<Self, SpecError> {
        match inputs {
            Value::Object(map) => Ok(Self::new(map)),
            _ => Err(SpecError::NotAnObject),
        }
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(key.into(), value.into());
        self
    }

    pub fn inputs(&self) -> &Map<String, Value> {
        &self.inputs
    }

    pub fn input(&self, key: &str) -> Option<&Value> {
        self.inputs.get(key)
    }

    /// Returns a string input, treating blank strings as absent.
    pub fn input_str(&self, key: &str) -> Option<&str> {
        self.inputs
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Deserializes all inputs into a typed schema.
    pub fn inputs_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.inputs.clone()))
    }

    pub fn outputs(&self) -> &Map<String, Value> {
        &self.outputs
    }

    pub fn output(&self, key: &str) -> Option<&Value> {
        self.outputs.get(key)
    }

    pub fn set_output(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), SpecError> {
        let key = key.into();
        if self.outputs.contains_key(&key) {
            return Err(SpecError::OutputAlreadySet(key));
        }
        self.outputs.insert(key, value.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outputs_are_write_once() {
        let mut spec = Spec::default();
        spec.set_output("job_name", "a").unwrap();

        let err = spec.set_output("job_name", "b").unwrap_err();
        assert_eq!(err, SpecError::OutputAlreadySet("job_name".into()));
        assert_eq!(spec.output("job_name"), Some(&json!("a")));
    }

    #[test]
    fn inputs_keep_insertion_order() {
        let spec = Spec::from_value(json!({ "zeta": 1, "alpha": 2, "mid": 3 })).unwrap();
        let keys: Vec<&str> = spec.inputs().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn from_value_requires_an_object() {
        assert_eq!(
            Spec::from_value(json!(["channels"])).unwrap_err(),
            SpecError::NotAnObject
        );
    }

    #[test]
    fn input_str_ignores_blank_and_non_string_values() {
        let spec = Spec::default()
            .with_input("blank", "   ")
            .with_input("number", 3)
            .with_input("name", " job ");

        assert_eq!(spec.input_str("blank"), None);
        assert_eq!(spec.input_str("number"), None);
        assert_eq!(spec.input_str("missing"), None);
        assert_eq!(spec.input_str("name"), Some("job"));
    }
}
