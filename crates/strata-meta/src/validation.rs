//! Schema validation for raw layer trees

use crate::layer::{LayerKind, Tree};
use crate::schema::{FieldSpec, FieldType, LayerSchema};
use crate::{Error, Result};
use serde_json::Value;
use strata_fs::NormalizedPath;

/// Check `tree` against the schema for `kind`.
///
/// Unknown keys and mistyped values are rejected with the dotted path of the
/// offending field. Entries of map-shaped groups (`agents.*`,
/// `mcp.servers.*`) receive their declared defaults. The returned tree is
/// otherwise unchanged.
pub fn validate_layer(kind: LayerKind, tree: Tree, source: &NormalizedPath) -> Result<Tree> {
    let schema = LayerSchema::for_kind(kind);
    let ctx = Context { source };
    let validated = ctx.table(tree, &schema.fields, "", false)?;
    tracing::trace!(%kind, %source, "Layer validated");
    Ok(validated)
}

struct Context<'a> {
    source: &'a NormalizedPath,
}

impl Context<'_> {
    fn error(&self, field: &str, message: impl Into<String>) -> Error {
        Error::Validation {
            path: self.source.to_native(),
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Validate a fixed-shape table. `apply_defaults` is set for map entries.
    fn table(
        &self,
        mut table: Tree,
        fields: &[FieldSpec],
        prefix: &str,
        apply_defaults: bool,
    ) -> Result<Tree> {
        if let Some(unknown) = table
            .keys()
            .find(|key| !fields.iter().any(|f| f.name == key.as_str()))
        {
            return Err(self.error(&join(prefix, unknown), "unknown key"));
        }

        for field_spec in fields {
            let path = join(prefix, field_spec.name);
            match table.remove(field_spec.name) {
                Some(value) => {
                    let value = self.value(value, field_spec, &path)?;
                    table.insert(field_spec.name.to_string(), value);
                }
                None if field_spec.required => {
                    return Err(self.error(&path, "missing required key"));
                }
                None => {
                    if apply_defaults && let Some(default) = field_spec.default {
                        table.insert(field_spec.name.to_string(), default.to_value());
                    }
                }
            }
        }

        Ok(table)
    }

    fn value(&self, value: Value, field_spec: &FieldSpec, path: &str) -> Result<Value> {
        let mismatch = || self.error(path, format!("expected {}", field_spec.ty.describe()));

        match field_spec.ty {
            FieldType::String => {
                let Value::String(s) = &value else {
                    return Err(mismatch());
                };
                if let Some(allowed) = field_spec.allowed
                    && !allowed.contains(&s.as_str())
                {
                    return Err(self.error(
                        path,
                        format!("`{}` is not one of {}", s, allowed.join(", ")),
                    ));
                }
                Ok(value)
            }
            FieldType::Bool => value.is_boolean().then_some(value).ok_or_else(mismatch),
            FieldType::Count => value.is_u64().then_some(value).ok_or_else(mismatch),
            FieldType::Number => value.is_number().then_some(value).ok_or_else(mismatch),
            FieldType::StringList => {
                let Value::Array(items) = &value else {
                    return Err(mismatch());
                };
                if let Some(index) = items.iter().position(|item| !item.is_string()) {
                    return Err(self.error(&format!("{path}[{index}]"), "expected a string"));
                }
                Ok(value)
            }
            FieldType::StringMap => {
                let Value::Object(map) = &value else {
                    return Err(mismatch());
                };
                if let Some((key, _)) = map.iter().find(|(_, v)| !v.is_string()) {
                    return Err(self.error(&join(path, key), "expected a string"));
                }
                Ok(value)
            }
            FieldType::Table(fields) => {
                let Value::Object(table) = value else {
                    return Err(mismatch());
                };
                self.table(table, fields, path, false).map(Value::Object)
            }
            FieldType::MapOf(fields) => {
                let Value::Object(map) = value else {
                    return Err(mismatch());
                };
                let mut out = Tree::new();
                for (key, entry) in map {
                    let entry_path = join(path, &key);
                    let Value::Object(entry) = entry else {
                        return Err(self.error(&entry_path, "expected a table"));
                    };
                    let entry = self.table(entry, fields, &entry_path, true)?;
                    out.insert(key, Value::Object(entry));
                }
                Ok(Value::Object(out))
            }
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}
