//! Field tables for each configuration group

use super::{DefaultValue, FieldSpec, FieldType};

/// Accepted `package_manager` values.
pub const PACKAGE_MANAGERS: &[&str] = &["npm", "pnpm", "yarn", "bun"];

pub const MODEL_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("default", FieldType::String),
    FieldSpec::optional("overrides", FieldType::StringMap),
];

pub const COST_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("daily_budget", FieldType::Number),
    FieldSpec::optional("monthly_budget", FieldType::Number),
    FieldSpec::optional("warn_threshold", FieldType::Number),
];

pub const SYNC_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("target_dir", FieldType::String),
    FieldSpec::optional("backup", FieldType::Bool),
    FieldSpec::optional("preserve_user_content", FieldType::Bool),
    FieldSpec::optional("backup_retention", FieldType::Count),
];

pub const TEAM_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("name", FieldType::String),
    FieldSpec::optional("members", FieldType::StringList),
];

pub const SKILLS_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("enabled", FieldType::StringList),
    FieldSpec::optional("disabled", FieldType::StringList),
];

pub const AGENT_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("model", FieldType::String),
    FieldSpec::optional("priority", FieldType::Count).with_default(DefaultValue::Int(0)),
];

pub const MCP_SERVER_FIELDS: &[FieldSpec] = &[
    FieldSpec::required("command", FieldType::String),
    FieldSpec::optional("args", FieldType::StringList).with_default(DefaultValue::EmptyList),
    FieldSpec::optional("env", FieldType::StringMap).with_default(DefaultValue::EmptyMap),
];

pub const MCP_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("enabled", FieldType::StringList),
    FieldSpec::optional("disabled", FieldType::StringList),
    FieldSpec::optional("servers", FieldType::MapOf(MCP_SERVER_FIELDS)),
];

/// The `[profile]` table inside a profile layer.
pub const PROFILE_META_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("name", FieldType::String),
    FieldSpec::optional("description", FieldType::String),
];

/// Groups accepted by every layer kind.
pub const COMMON_FIELDS: &[FieldSpec] = &[
    FieldSpec::optional("model", FieldType::Table(MODEL_FIELDS)),
    FieldSpec::optional("cost", FieldType::Table(COST_FIELDS)),
    FieldSpec::optional("sync", FieldType::Table(SYNC_FIELDS)),
    FieldSpec::optional("team", FieldType::Table(TEAM_FIELDS)),
    FieldSpec::optional("skills", FieldType::Table(SKILLS_FIELDS)),
    FieldSpec::optional("agents", FieldType::MapOf(AGENT_FIELDS)),
    FieldSpec::optional("mcp", FieldType::Table(MCP_FIELDS)),
    FieldSpec::optional("package_manager", FieldType::String).one_of(PACKAGE_MANAGERS),
    FieldSpec::optional("content", FieldType::String),
];
