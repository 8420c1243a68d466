use osprey_core::prelude::*;

use anyhow::Context;
use std::path::Path;

/// Writes every output into its own file named after the key.
///
/// Strings are written verbatim, anything else as JSON.
pub async fn write_outputs(dir: &Path, outputs: &Map<String, Value>) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    for (key, value) in outputs {
        let contents = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let path = dir.join(key);
        tokio::fs::write(&path, contents)
            .await
            .with_context(|| format!("Failed to write output {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn one_file_per_output() {
        let dir = std::env::temp_dir().join(format!("osprey-outputs-{}", std::process::id()));
        let mut outputs = Map::new();
        outputs.insert("job_name".into(), json!("my-job"));
        outputs.insert("extra".into(), json!({ "a": 1 }));

        write_outputs(&dir, &outputs).await.unwrap();

        assert_eq!(std::fs::read_to_string(dir.join("job_name")).unwrap(), "my-job");
        assert_eq!(std::fs::read_to_string(dir.join("extra")).unwrap(), r#"{"a":1}"#);
        std::fs::remove_dir_all(dir).unwrap();
    }
}
