//! Page data files.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use tracing::debug;

/// Load page data from a JSON or YAML file.
///
/// Without a path the data is an empty object. The top level must be a map.
pub fn load_data(path: Option<&Path>) -> Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Object(Map::new()));
    };

    debug!("Loading page data from {:?}", path);
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read data file {:?}", path))?;

    let value: Value = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {:?}", path))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {:?}", path))?,
    };

    if !value.is_object() {
        bail!("Data file {:?} must contain a map at the top level", path);
    }

    Ok(value)
}
