//! JSON Schema loading shared by the surface and expectation loaders.
//!
//! Schemas carry their own `schema_version` const; the loader extracts it so
//! callers can reject documents written for a different version before the
//! full validation pass runs.

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const SCHEMA_VERSION_POINTER: &str = "/properties/schema_version/const";

/// Result of loading and compiling a JSON Schema.
pub(crate) struct SchemaLoadResult {
    pub schema_version: String,
    pub compiled: JSONSchema,
}

pub(crate) fn load_json_schema(
    path: &Path,
    allowed_versions: Option<&BTreeSet<String>>,
) -> Result<SchemaLoadResult> {
    let file = File::open(path).with_context(|| format!("opening schema {}", path.display()))?;
    let schema_value: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing schema {}", path.display()))?;

    let schema_version = schema_value
        .pointer(SCHEMA_VERSION_POINTER)
        .and_then(Value::as_str)
        .ok_or_else(|| {
            anyhow!(
                "schema {} does not pin schema_version at {}",
                path.display(),
                SCHEMA_VERSION_POINTER
            )
        })?
        .to_string();

    if let Some(allowed) = allowed_versions {
        if !allowed.contains(&schema_version) {
            bail!(
                "schema {} declares version '{}' outside allowed set {:?}",
                path.display(),
                schema_version,
                allowed
            );
        }
    }

    let compiled = JSONSchema::compile(&schema_value)
        .map_err(|err| anyhow!("compiling schema {}: {err}", path.display()))?;

    Ok(SchemaLoadResult {
        schema_version,
        compiled,
    })
}

/// Validate `instance` and fold every schema violation into one error.
pub(crate) fn validate_instance(
    schema: &SchemaLoadResult,
    instance: &Value,
    instance_path: &Path,
) -> Result<()> {
    if let Err(errors) = schema.compiled.validate(instance) {
        let details = errors
            .map(|err| err.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        bail!(
            "{} failed schema validation:\n{}",
            instance_path.display(),
            details
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn write_schema(value: &Value) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        serde_json::to_writer(&mut file, value).unwrap();
        file
    }

    #[test]
    fn extracts_version_and_validates() {
        let schema = write_schema(&json!({
            "type": "object",
            "required": ["schema_version"],
            "properties": {"schema_version": {"const": "demo_v1"}}
        }));
        let loaded = load_json_schema(schema.path(), None).expect("load schema");
        assert_eq!(loaded.schema_version, "demo_v1");

        let ok = json!({"schema_version": "demo_v1"});
        assert!(validate_instance(&loaded, &ok, Path::new("ok.json")).is_ok());

        let bad = json!({"schema_version": "demo_v2"});
        let err = validate_instance(&loaded, &bad, Path::new("bad.json")).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn rejects_schema_without_version_const() {
        let schema = write_schema(&json!({"type": "object"}));
        let err = load_json_schema(schema.path(), None)
            .err()
            .expect("missing const must fail");
        assert!(err.to_string().contains("schema_version"));
    }

    #[test]
    fn rejects_disallowed_version() {
        let schema = write_schema(&json!({
            "properties": {"schema_version": {"const": "demo_v9"}}
        }));
        let allowed = BTreeSet::from_iter(["demo_v1".to_string()]);
        assert!(load_json_schema(schema.path(), Some(&allowed)).is_err());
    }
}
