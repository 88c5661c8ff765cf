//! Layer Reader: TOML files into raw trees

use crate::layer::Tree;
use crate::{Error, Result};
use serde_json::{Number, Value};
use strata_fs::{NormalizedPath, io};

/// Parse TOML `content` into a raw tree. `path` is only used for errors.
///
/// # Example
///
/// ```
/// use strata_fs::NormalizedPath;
/// use strata_meta::parse_layer;
///
/// let tree = parse_layer("[model]\ndefault = \"sonnet\"\n", &NormalizedPath::new("config.toml")).unwrap();
/// assert_eq!(tree["model"]["default"], "sonnet");
/// ```
pub fn parse_layer(content: &str, path: &NormalizedPath) -> Result<Tree> {
    let table: toml::Table = toml::from_str(content).map_err(|e| Error::Parse {
        path: path.to_native(),
        message: e.to_string(),
    })?;

    Ok(table_to_tree(table))
}

/// Read and parse a layer file; `Ok(None)` when the file does not exist.
pub async fn read_layer(path: &NormalizedPath) -> Result<Option<Tree>> {
    match io::read_optional_text_async(path).await? {
        Some(content) => {
            tracing::debug!(%path, "Parsing layer file");
            parse_layer(&content, path).map(Some)
        }
        None => {
            tracing::debug!(%path, "Layer file absent");
            Ok(None)
        }
    }
}

fn table_to_tree(table: toml::Table) -> Tree {
    table
        .into_iter()
        .map(|(key, value)| (key, toml_to_json(value)))
        .collect()
}

/// Convert a TOML value into the JSON value model used for trees.
///
/// Datetimes become their RFC 3339 string form; non-finite floats, which
/// JSON cannot represent, become `null` and are thus ignored by merging.
pub fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(table_to_tree(table)),
    }
}
