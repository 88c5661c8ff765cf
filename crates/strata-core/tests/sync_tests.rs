//! End-to-end behaviour of the SyncEngine against a real directory

use pretty_assertions::assert_eq;
use std::fs;
use std::sync::Arc;
use strata_core::config::ConfigResolver;
use strata_core::{
    CapabilityDescriptor, DiffKind, Error, JsonFileCapabilities, StaticCapabilities, SyncEngine,
    SyncOptions, ValidationFinding,
};
use strata_fs::NormalizedPath;
use strata_test_utils::TestWorkspace;
use strata_test_utils::fixtures::{CAPABILITIES_JSON, GLOBAL_LAYER, SCENARIO_PROJECT};

const SETTINGS: &str = ".agent/settings.json";
const INSTRUCTIONS: &str = ".agent/INSTRUCTIONS.md";

fn engine(ws: &TestWorkspace) -> SyncEngine {
    engine_with(ws, Vec::new())
}

fn engine_with(ws: &TestWorkspace, descriptors: Vec<CapabilityDescriptor>) -> SyncEngine {
    let resolver = ConfigResolver::new(
        NormalizedPath::new(ws.root()),
        NormalizedPath::new(ws.global_dir()),
    );
    SyncEngine::new(resolver, Arc::new(StaticCapabilities(descriptors)))
}

fn file_engine(ws: &TestWorkspace) -> SyncEngine {
    let resolver = ConfigResolver::new(
        NormalizedPath::new(ws.root()),
        NormalizedPath::new(ws.global_dir()),
    );
    let source = JsonFileCapabilities::new(
        NormalizedPath::new(ws.root()).join(".strata/capabilities.json"),
    );
    SyncEngine::new(resolver, Arc::new(source))
}

fn kinds(entries: &[strata_core::DiffEntry]) -> Vec<DiffKind> {
    entries.iter().map(|e| e.kind).collect()
}

#[tokio::test]
async fn test_scenario_creates_two_files_then_settles() {
    let ws = TestWorkspace::new();
    ws.write_project(SCENARIO_PROJECT);
    let engine = engine(&ws);

    let before = engine.diff().await.unwrap();
    assert_eq!(kinds(&before), vec![DiffKind::Create, DiffKind::Create]);

    let result = engine.sync(SyncOptions::default()).await.unwrap();
    assert!(result.success);
    assert_eq!(result.modified_files, vec![SETTINGS, INSTRUCTIONS]);
    assert!(result.backup_path.is_none(), "nothing to snapshot on first sync");

    let after = engine.diff().await.unwrap();
    assert_eq!(kinds(&after), vec![DiffKind::Unchanged, DiffKind::Unchanged]);

    let settings: serde_json::Value = serde_json::from_str(&ws.read_file(SETTINGS)).unwrap();
    assert_eq!(settings["model"], "sonnet");
    assert_eq!(settings["metadata"]["profile"], "default");
    assert_eq!(
        ws.read_file(INSTRUCTIONS),
        "<!-- strata:managed:start -->\n# Notes\n<!-- strata:managed:end -->\n"
    );
}

#[tokio::test]
async fn test_second_sync_writes_nothing() {
    let ws = TestWorkspace::new();
    ws.write_project(SCENARIO_PROJECT);
    let engine = engine(&ws);

    engine.sync(SyncOptions::default()).await.unwrap();
    let mtime = fs::metadata(ws.root().join(SETTINGS)).unwrap().modified().unwrap();

    let second = engine.sync(SyncOptions::default()).await.unwrap();
    assert!(second.success);
    assert!(second.modified_files.is_empty());
    assert!(second.backup_path.is_none());
    assert!(ws.backup_ids().is_empty());
    assert_eq!(
        fs::metadata(ws.root().join(SETTINGS)).unwrap().modified().unwrap(),
        mtime
    );
}

#[tokio::test]
async fn test_user_text_around_managed_region_survives() {
    let ws = TestWorkspace::new();
    ws.write_project(SCENARIO_PROJECT);
    let engine = engine(&ws);
    engine.sync(SyncOptions::default()).await.unwrap();

    let generated = ws.read_file(INSTRUCTIONS);
    ws.write_file(
        INSTRUCTIONS,
        &format!("# My header\n\n{generated}\nMy footer\n"),
    );
    ws.write_project("content = \"# Updated\"\n");

    let result = engine.sync(SyncOptions::default()).await.unwrap();
    assert_eq!(result.modified_files, vec![SETTINGS, INSTRUCTIONS]);

    let merged = ws.read_file(INSTRUCTIONS);
    assert_eq!(
        merged,
        "# My header\n\n<!-- strata:managed:start -->\n# Updated\n<!-- strata:managed:end -->\n\nMy footer\n"
    );

    // idempotent with user content present
    let again = engine.sync(SyncOptions::default()).await.unwrap();
    assert!(again.modified_files.is_empty());
}

#[tokio::test]
async fn test_no_preserve_replaces_whole_file() {
    let ws = TestWorkspace::new();
    ws.write_project(SCENARIO_PROJECT);
    ws.write_file(INSTRUCTIONS, "hand written\n<!-- strata:managed:start -->\nold\n<!-- strata:managed:end -->\n");

    let result = engine(&ws)
        .sync(SyncOptions {
            preserve_user_content: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(
        ws.read_file(INSTRUCTIONS),
        "<!-- strata:managed:start -->\n# Notes\n<!-- strata:managed:end -->\n"
    );
}

#[tokio::test]
async fn test_dry_run_reports_without_writing() {
    let ws = TestWorkspace::new();
    ws.write_project(SCENARIO_PROJECT);

    let result = engine(&ws)
        .sync(SyncOptions {
            dry_run: true,
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.dry_run);
    assert_eq!(result.modified_files, vec![SETTINGS, INSTRUCTIONS]);
    ws.assert_file_not_exists(".agent");
}

#[tokio::test]
async fn test_changes_are_snapshotted_first() {
    let ws = TestWorkspace::new();
    ws.write_project(SCENARIO_PROJECT);
    let engine = engine(&ws);
    engine.sync(SyncOptions::default()).await.unwrap();
    let original = ws.read_file(INSTRUCTIONS);

    ws.write_project("content = \"# Changed\"\n");
    let result = engine.sync(SyncOptions::default()).await.unwrap();

    let backup_path = result.backup_path.expect("backup taken");
    let snapshot = fs::read_to_string(format!("{backup_path}/files/INSTRUCTIONS.md")).unwrap();
    assert_eq!(snapshot, original);
    assert_eq!(ws.backup_ids().len(), 1);
}

#[tokio::test]
async fn test_backup_can_be_disabled() {
    let ws = TestWorkspace::new();
    ws.write_project(SCENARIO_PROJECT);
    let engine = engine(&ws);
    engine.sync(SyncOptions::default()).await.unwrap();

    ws.write_project("content = \"# Changed\"\n");
    let result = engine
        .sync(SyncOptions {
            backup: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(result.success);
    assert!(result.backup_path.is_none());
    assert!(ws.backup_ids().is_empty());
}

#[tokio::test]
async fn test_failed_backup_blocks_writes_unless_forced() {
    let ws = TestWorkspace::new();
    ws.write_project(SCENARIO_PROJECT);
    let engine = engine(&ws);
    engine.sync(SyncOptions::default()).await.unwrap();

    // A regular file where the backups directory should be
    ws.write_file(".strata/backups", "not a directory");
    ws.write_project("content = \"# Changed\"\n");

    let blocked = engine.sync(SyncOptions::default()).await.unwrap();
    assert!(!blocked.success);
    assert!(blocked.modified_files.is_empty());
    assert!(blocked.warnings.iter().any(|w| w.contains("Backup failed")));
    ws.assert_file_contains(INSTRUCTIONS, "# Notes");

    let forced = engine
        .sync(SyncOptions {
            force: true,
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(forced.success);
    assert!(forced.warnings.iter().any(|w| w.contains("--force")));
    ws.assert_file_contains(INSTRUCTIONS, "# Changed");
}

#[tokio::test]
async fn test_snapshots_are_pruned_to_retention() {
    let ws = TestWorkspace::new();
    let engine = engine(&ws);

    for i in 0..5 {
        ws.write_project(&format!("content = \"rev {i}\"\n[sync]\nbackup_retention = 2\n"));
        engine.sync(SyncOptions::default()).await.unwrap();
    }

    // first sync had nothing to snapshot; the remaining four were pruned to two
    assert_eq!(ws.backup_ids().len(), 2);
}

#[tokio::test]
async fn test_unwritable_target_is_sync_io() {
    let ws = TestWorkspace::new();
    ws.write_project(SCENARIO_PROJECT);
    ws.write_file(".agent", "a file, not a directory");

    let err = engine(&ws).sync(SyncOptions::default()).await.unwrap_err();
    assert!(matches!(err, Error::SyncIo { .. }), "{err:?}");
}

#[tokio::test]
async fn test_target_dir_containing_backups_is_refused() {
    for target in [".", ".strata", "./.strata/backups/../.."] {
        let ws = TestWorkspace::new();
        ws.write_project(&format!("content = \"x\"\n\n[sync]\ntarget_dir = \"{target}\"\n"));
        let engine = engine(&ws);

        for _ in 0..2 {
            let err = engine.sync(SyncOptions::default()).await.unwrap_err();
            assert!(matches!(err, Error::InvalidTargetDir { .. }), "{target}: {err:?}");
        }
        ws.assert_file_not_exists(".strata/backups");
        ws.assert_file_not_exists("settings.json");

        let report = engine.validate().await;
        assert!(matches!(
            &report.errors[..],
            [ValidationFinding::Configuration { message }] if message.contains("overlaps")
        ));
    }
}

#[tokio::test]
async fn test_target_dir_inside_backups_is_refused() {
    let ws = TestWorkspace::new();
    ws.write_project("[sync]\ntarget_dir = \".strata/backups/agent\"\n");

    let err = engine(&ws).diff().await.unwrap_err();
    assert!(matches!(err, Error::InvalidTargetDir { .. }), "{err:?}");
}

#[tokio::test]
async fn test_content_with_marker_line_keeps_existing_file() {
    let ws = TestWorkspace::new();
    ws.write_project(SCENARIO_PROJECT);
    let engine = engine(&ws);
    engine.sync(SyncOptions::default()).await.unwrap();

    let annotated = format!("Above\n{}Below\n", ws.read_file(INSTRUCTIONS));
    ws.write_file(INSTRUCTIONS, &annotated);
    ws.write_project("content = \"# Notes\\n<!-- strata:managed:end -->\\nafter\"\n");

    let err = engine.sync(SyncOptions::default()).await.unwrap_err();
    assert!(
        matches!(err, Error::Blocks(strata_blocks::Error::MarkerInContent { line: 2 })),
        "{err:?}"
    );
    assert_eq!(ws.read_file(INSTRUCTIONS), annotated);

    let report = engine.validate().await;
    assert!(report.errors.iter().any(|f| matches!(
        f,
        ValidationFinding::Configuration { message } if message.contains("marker")
    )));
}

#[tokio::test]
async fn test_non_utf8_text_around_region_is_kept_byte_for_byte() {
    let ws = TestWorkspace::new();
    ws.write_project(SCENARIO_PROJECT);
    let engine = engine(&ws);
    engine.sync(SyncOptions::default()).await.unwrap();

    let path = ws.root().join(INSTRUCTIONS);
    let before: &[u8] = b"Notas de caf\xe9\n\n";
    let after: &[u8] = b"\nfin \xff\xfe\n";
    let mut annotated = before.to_vec();
    annotated.extend_from_slice(&fs::read(&path).unwrap());
    annotated.extend_from_slice(after);
    fs::write(&path, &annotated).unwrap();

    ws.write_project("content = \"# Updated\"\n");
    engine.sync(SyncOptions::default()).await.unwrap();

    let mut expected = before.to_vec();
    expected.extend_from_slice(b"<!-- strata:managed:start -->\n# Updated\n<!-- strata:managed:end -->\n");
    expected.extend_from_slice(after);
    assert_eq!(fs::read(&path).unwrap(), expected);
}

#[tokio::test]
async fn test_capabilities_render_and_warn() {
    let ws = TestWorkspace::new();
    ws.write_global(GLOBAL_LAYER);
    ws.write_capabilities(CAPABILITIES_JSON);
    let engine = file_engine(&ws);

    let result = engine.sync(SyncOptions::default()).await.unwrap();
    assert!(result.success);
    assert!(result.warnings.is_empty(), "{:?}", result.warnings);

    let settings: serde_json::Value = serde_json::from_str(&ws.read_file(SETTINGS)).unwrap();
    assert_eq!(settings["hooks"]["PostToolUse"][0]["handler"], "lint.sh");
    assert!(settings["hooks"].get("Stop").is_none());
    assert_eq!(settings["mcpServers"]["files"]["command"], "mcp-files");
    assert_eq!(settings["agents"]["reviewer"]["priority"], 1);
}

#[tokio::test]
async fn test_missing_capability_is_a_warning_not_an_error() {
    let ws = TestWorkspace::new();
    ws.write_project(SCENARIO_PROJECT);
    let engine = engine_with(&ws, vec![CapabilityDescriptor::new("review").requires("ghost")]);

    let result = engine.sync(SyncOptions::default()).await.unwrap();
    assert!(result.success);
    assert_eq!(result.modified_files.len(), 2);
    assert!(result.warnings.iter().any(|w| w.contains("ghost")));

    let report = engine.validate().await;
    assert!(!report.valid);
    assert_eq!(
        report.errors,
        vec![ValidationFinding::MissingCapability {
            capability: "ghost".into(),
            required_by: "review".into(),
        }]
    );
}

#[tokio::test]
async fn test_validate_never_fails_on_broken_configuration() {
    let ws = TestWorkspace::new();
    ws.write_project("colour = \"red\"\n");

    let report = engine(&ws).validate().await;
    assert!(!report.valid);
    assert!(matches!(
        &report.errors[..],
        [ValidationFinding::Configuration { message }] if message.contains("colour")
    ));
}
