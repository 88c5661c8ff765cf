//! Declarative schema for configuration layers
//!
//! Each layer kind accepts the shared configuration groups plus a few
//! kind-specific keys:
//!
//! | kind    | extra keys                          |
//! |---------|-------------------------------------|
//! | global  | none                                |
//! | profile | `extends` (profile name), `[profile]` |
//! | project | `extends` (path or URL), `profile`  |
//! | local   | none                                |
//!
//! Defaults are declared only on fields of map entries (for example
//! `agents.<name>.priority`), so every entry a layer defines is complete and
//! a later layer's entry never inherits half of an earlier one's fields.

mod sections;

pub use sections::{
    AGENT_FIELDS, COMMON_FIELDS, COST_FIELDS, MCP_FIELDS, MCP_SERVER_FIELDS, MODEL_FIELDS,
    PACKAGE_MANAGERS, PROFILE_META_FIELDS, SKILLS_FIELDS, SYNC_FIELDS, TEAM_FIELDS,
};

use crate::layer::LayerKind;
use serde_json::Value;

/// The shape a field's value must have.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    String,
    Bool,
    /// A non-negative integer
    Count,
    /// Any number; integers are accepted
    Number,
    StringList,
    /// A table of string values with free-form keys
    StringMap,
    /// A nested table with a fixed set of fields
    Table(&'static [FieldSpec]),
    /// A table of free-form keys whose values are all tables of one shape
    MapOf(&'static [FieldSpec]),
}

impl FieldType {
    /// Human-readable name used in validation messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Bool => "a boolean",
            Self::Count => "a non-negative integer",
            Self::Number => "a number",
            Self::StringList => "an array of strings",
            Self::StringMap => "a table of strings",
            Self::Table(_) | Self::MapOf(_) => "a table",
        }
    }
}

/// A default value declared by the schema.
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Int(i64),
    EmptyList,
    EmptyMap,
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            Self::Int(i) => Value::from(i),
            Self::EmptyList => Value::Array(Vec::new()),
            Self::EmptyMap => Value::Object(serde_json::Map::new()),
        }
    }
}

/// One field of a table.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    /// Required fields must be present in every table of this shape.
    pub required: bool,
    pub default: Option<DefaultValue>,
    /// For string fields, the accepted values.
    pub allowed: Option<&'static [&'static str]>,
}

impl FieldSpec {
    pub const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: false,
            default: None,
            allowed: None,
        }
    }

    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
            default: None,
            allowed: None,
        }
    }

    pub const fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }
}

/// The top-level schema for a layer kind.
#[derive(Debug, Clone)]
pub struct LayerSchema {
    pub kind: LayerKind,
    pub fields: Vec<FieldSpec>,
}

impl LayerSchema {
    /// Build the schema for `kind`.
    pub fn for_kind(kind: LayerKind) -> Self {
        let mut fields: Vec<FieldSpec> = COMMON_FIELDS.to_vec();
        match kind {
            LayerKind::Profile => {
                fields.push(FieldSpec::optional("extends", FieldType::String));
                fields.push(FieldSpec::optional(
                    "profile",
                    FieldType::Table(PROFILE_META_FIELDS),
                ));
            }
            LayerKind::Project => {
                fields.push(FieldSpec::optional("extends", FieldType::String));
                fields.push(FieldSpec::optional("profile", FieldType::String));
            }
            LayerKind::Default | LayerKind::Global | LayerKind::Local => {}
        }
        Self { kind, fields }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }
}
