//! Workspace scenarios crossing every Strata crate
//!
//! Layers on disk -> resolution with inheritance -> rendering -> sync into
//! the managed directory -> snapshot and restore.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use strata_blocks::ManagedRegionEditor;
use strata_core::{
    ConfigResolver, DiffKind, JsonFileCapabilities, ProfileSource, SyncEngine, SyncOptions,
};
use strata_fs::NormalizedPath;
use strata_meta::LayerKind;
use strata_test_utils::TestWorkspace;
use strata_test_utils::fixtures::{CAPABILITIES_JSON, GLOBAL_LAYER, SCENARIO_PROJECT};

fn engine(ws: &TestWorkspace) -> SyncEngine {
    let resolver = ConfigResolver::new(
        NormalizedPath::new(ws.root()),
        NormalizedPath::new(ws.global_dir()),
    );
    let capabilities =
        JsonFileCapabilities::new(NormalizedPath::new(ws.root()).join(".strata/capabilities.json"));
    SyncEngine::new(resolver, Arc::new(capabilities))
}

fn settings(ws: &TestWorkspace, dir: &str) -> serde_json::Value {
    serde_json::from_str(&ws.read_file(&format!("{dir}/settings.json"))).unwrap()
}

/// A team setup touching every layer: global defaults, an active profile
/// inheriting from a company profile, project servers and local opt-outs.
fn team_workspace() -> TestWorkspace {
    let ws = TestWorkspace::new();
    ws.write_global(GLOBAL_LAYER);
    ws.write_profile(
        "company",
        "[model]\ndefault = \"opus\"\n[skills]\nenabled = [\"lint\"]\n",
    );
    ws.write_profile(
        "work",
        "extends = \"company\"\n[profile]\ndescription = \"Day job\"\n[cost]\nwarn_threshold = 0.5\n",
    );
    ws.set_active_profile("work");
    ws.write_project(
        "content = \"# Team rules\\n\\nReview before merge.\"\n\n[mcp]\nenabled = [\"git\"]\n\n[mcp.servers.git]\ncommand = \"mcp-git\"\n",
    );
    ws.write_local("[skills]\ndisabled = [\"web\"]\n");
    ws.write_capabilities(CAPABILITIES_JSON);
    ws
}

#[tokio::test]
async fn test_team_setup_resolves_and_renders() {
    let ws = team_workspace();
    let engine = engine(&ws);

    let resolved = engine
        .resolver()
        .resolve_with_provenance(None, None)
        .await
        .unwrap();
    let config = &resolved.config;

    assert_eq!(config.profile.name, "work");
    assert_eq!(config.profile.source, ProfileSource::Global);
    assert_eq!(config.profile.description.as_deref(), Some("Day job"));
    assert_eq!(config.model.default.as_deref(), Some("opus"));
    assert_eq!(config.cost.warn_threshold, 0.5);
    assert_eq!(config.cost.daily_budget, Some(10.0));
    assert!(config.skills.enabled.contains("lint"));
    assert!(config.skills.enabled.contains("git"));
    assert!(!config.skills.enabled.contains("web"));
    assert_eq!(resolved.layers[2].kind, LayerKind::Profile);
    assert_eq!(resolved.layers[2].chain, vec!["company"]);

    let result = engine.sync(SyncOptions::default()).await.unwrap();
    assert!(result.success);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    let settings = settings(&ws, ".agent");
    assert_eq!(settings["model"], "opus");
    assert_eq!(settings["metadata"]["profile"], "work");
    assert_eq!(settings["metadata"]["profileSource"], "global");
    assert_eq!(settings["metadata"]["profileDescription"], "Day job");
    assert_eq!(settings["metadata"]["generatedBy"], "strata");
    // `git` is enabled by the project, `files` is pulled in by the lint capability
    let servers: Vec<&String> = settings["mcpServers"].as_object().unwrap().keys().collect();
    assert_eq!(servers, vec!["files", "git"]);
    assert_eq!(settings["hooks"]["PostToolUse"][0]["capability"], "lint");

    let instructions = ws.read_file(".agent/INSTRUCTIONS.md");
    let editor = ManagedRegionEditor::default();
    assert_eq!(
        editor.extract(&instructions),
        Some("# Team rules\n\nReview before merge.\n")
    );
}

#[tokio::test]
async fn test_edit_resync_and_restore_cycle() {
    let ws = TestWorkspace::new();
    ws.write_project(SCENARIO_PROJECT);
    let engine = engine(&ws);
    engine.sync(SyncOptions::default()).await.unwrap();

    // The user annotates the generated file
    let generated = ws.read_file(".agent/INSTRUCTIONS.md");
    let annotated = format!("Personal notes\n\n{generated}");
    ws.write_file(".agent/INSTRUCTIONS.md", &annotated);
    assert!(engine.diff().await.unwrap().iter().all(|e| !e.is_change()));

    // Configuration moves on
    ws.write_project("content = \"# Notes v2\"\n\n[model]\ndefault = \"haiku\"\n");
    let diff = engine.diff().await.unwrap();
    assert_eq!(
        diff.iter().map(|e| e.kind).collect::<Vec<_>>(),
        vec![DiffKind::Modify, DiffKind::Modify]
    );

    let result = engine.sync(SyncOptions::default()).await.unwrap();
    let backup_path = result.backup_path.clone().unwrap();
    assert!(
        ws.read_file(".agent/INSTRUCTIONS.md")
            .starts_with("Personal notes\n\n<!-- strata:managed:start -->\n# Notes v2\n")
    );
    assert_eq!(settings(&ws, ".agent")["model"], "haiku");

    // Roll back to the snapshot taken just before that sync
    let config = engine.resolve().await.unwrap();
    let manager = engine.backup_manager(&config);
    let id = backup_path.rsplit('/').next().unwrap();
    manager.restore(id).unwrap();

    assert_eq!(ws.read_file(".agent/INSTRUCTIONS.md"), annotated);
    assert_eq!(settings(&ws, ".agent")["model"], "sonnet");
}

#[tokio::test]
async fn test_custom_target_dir() {
    let ws = TestWorkspace::new();
    ws.write_project("content = \"x\"\n\n[sync]\ntarget_dir = \"build/agent\"\n");
    let engine = engine(&ws);

    let result = engine.sync(SyncOptions::default()).await.unwrap();

    assert_eq!(
        result.modified_files,
        vec!["build/agent/settings.json", "build/agent/INSTRUCTIONS.md"]
    );
    ws.assert_file_exists("build/agent/INSTRUCTIONS.md");
    ws.assert_file_not_exists(".agent");
}

#[tokio::test]
async fn test_project_pins_profile_over_pointer() {
    let ws = team_workspace();
    ws.write_profile("oss", "[model]\ndefault = \"haiku\"\n");
    ws.write_project("profile = \"oss\"\ncontent = \"open source\"\n");

    let result = engine(&ws).sync(SyncOptions::default()).await.unwrap();
    assert!(result.success);

    let settings = settings(&ws, ".agent");
    assert_eq!(settings["metadata"]["profile"], "oss");
    assert_eq!(settings["metadata"]["profileSource"], "project");
    assert_eq!(settings["model"], "haiku");
}
