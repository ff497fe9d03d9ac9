//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides.
//! 4. The CLI applies its own flags last.
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `METADDL_DIALECT` | `dialect` |
//! | `METADDL_SCHEMA_VERSION` | `schema_version` |
//! | `METADDL_VERSION_TABLE` | `version_table` |
//! | `METADDL_VERSION_COLUMN` | `version_column` |
//! | `METADDL_ENSURE_VERSION_TABLE` | `ensure_version_table` |
//! | `METADDL_TRANSACTIONAL` | `transactional` |
//! | `METADDL_LOG_LEVEL` | `log_level` |
//! | `METADDL_DEBUG` | `debug` |
//!
//! ## Examples
//!
//! ```rust,no_run
//! use metaddl_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_file_with_env("metaddl.toml").unwrap();
//! ```

use std::path::Path;

use crate::error::MetaddlError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Keys missing from the TOML keep their default values.
///
/// # Errors
///
/// Returns a `ConfigurationError` if the TOML is malformed or has values of
/// the wrong type.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, MetaddlError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| MetaddlError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    let json_value = toml_to_json(toml_value);
    merge_into_defaults(json_value, "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, MetaddlError> {
    let content = read_config(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, MetaddlError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns a `ConfigurationError` if the JSON is malformed.
pub fn from_json_str(json_str: &str) -> Result<Settings, MetaddlError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| MetaddlError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;
    merge_into_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, MetaddlError> {
    let content = read_config(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from a file, choosing the format by extension
/// (`.json` is JSON, anything else TOML), then applies environment overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, MetaddlError> {
    let path = path.as_ref();
    let mut settings = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => from_json_file(path)?,
        _ => from_toml_file(path)?,
    };
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies environment variable overrides to a settings struct.
///
/// Boolean variables accept "true"/"1"/"yes"; anything else is false.
/// A `METADDL_SCHEMA_VERSION` that is not a number is ignored.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("METADDL_DIALECT") {
        settings.dialect = val;
    }

    if let Ok(val) = std::env::var("METADDL_SCHEMA_VERSION") {
        if let Ok(version) = val.trim().parse::<u32>() {
            settings.schema_version = Some(version);
        }
    }

    if let Ok(val) = std::env::var("METADDL_VERSION_TABLE") {
        settings.version_table = val;
    }

    if let Ok(val) = std::env::var("METADDL_VERSION_COLUMN") {
        settings.version_column = val;
    }

    if let Ok(val) = std::env::var("METADDL_ENSURE_VERSION_TABLE") {
        settings.ensure_version_table = is_truthy(&val);
    }

    if let Ok(val) = std::env::var("METADDL_TRANSACTIONAL") {
        settings.transactional = is_truthy(&val);
    }

    if let Ok(val) = std::env::var("METADDL_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("METADDL_DEBUG") {
        settings.debug = is_truthy(&val);
    }
}

// ============================================================
// Helpers
// ============================================================

fn is_truthy(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn read_config(path: &Path, format: &str) -> Result<String, MetaddlError> {
    std::fs::read_to_string(path).map_err(|e| {
        MetaddlError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

/// Deep-merges `value` over the serialized defaults and deserializes the result.
fn merge_into_defaults(value: serde_json::Value, format: &str) -> Result<Settings, MetaddlError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        MetaddlError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    serde_json::from_value(merged).map_err(|e| {
        MetaddlError::ConfigurationError(format!(
            "Failed to deserialize settings from {format}: {e}"
        ))
    })
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
