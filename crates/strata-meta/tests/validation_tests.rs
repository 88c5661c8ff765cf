//! Validation behaviour across layer kinds

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use strata_fs::NormalizedPath;
use strata_meta::{Error, LayerKind, parse_layer, validate_layer};

fn check(kind: LayerKind, toml: &str) -> strata_meta::Result<strata_meta::Tree> {
    let path = NormalizedPath::new("/work/.strata/config.toml");
    let tree = parse_layer(toml, &path)?;
    validate_layer(kind, tree, &path)
}

fn failing_field(kind: LayerKind, toml: &str) -> String {
    match check(kind, toml) {
        Err(Error::Validation { field, .. }) => field,
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_full_project_layer_is_accepted() {
    let tree = check(
        LayerKind::Project,
        r#"
extends = "../shared/team.toml"
profile = "work"
package_manager = "pnpm"
content = "Use the house style."

[model]
default = "opus"
overrides = { review = "haiku" }

[cost]
daily_budget = 5
monthly_budget = 120.5
warn_threshold = 0.9

[sync]
target_dir = ".agent"
backup = true
preserve_user_content = false
backup_retention = 3

[team]
name = "platform"
members = ["ana", "li"]

[skills]
enabled = ["git"]
disabled = ["web"]

[mcp]
enabled = ["files"]

[mcp.servers.files]
command = "mcp-files"
"#,
    )
    .unwrap();

    assert_eq!(tree["profile"], "work");
    assert_eq!(
        tree["mcp"]["servers"]["files"],
        json!({"command": "mcp-files", "args": [], "env": {}})
    );
    assert_eq!(tree["cost"]["daily_budget"], 5);
}

#[test]
fn test_profile_layer_accepts_profile_table() {
    let tree = check(
        LayerKind::Profile,
        "extends = \"base\"\n[profile]\nname = \"work\"\ndescription = \"Work setup\"\n",
    )
    .unwrap();
    assert_eq!(tree["profile"]["description"], "Work setup");
}

#[rstest]
#[case::unknown_top_level(LayerKind::Global, "colour = \"red\"\n", "colour")]
#[case::unknown_nested(LayerKind::Local, "[sync]\ntarget = \"x\"\n", "sync.target")]
#[case::bad_priority(
    LayerKind::Global,
    "[agents.reviewer]\npriority = \"high\"\n",
    "agents.reviewer.priority"
)]
#[case::negative_priority(
    LayerKind::Global,
    "[agents.reviewer]\npriority = -1\n",
    "agents.reviewer.priority"
)]
#[case::extends_on_global(LayerKind::Global, "extends = \"base\"\n", "extends")]
#[case::extends_on_local(LayerKind::Local, "extends = \"base\"\n", "extends")]
#[case::profile_pointer_on_global(LayerKind::Global, "profile = \"work\"\n", "profile")]
#[case::profile_string_on_profile(LayerKind::Profile, "profile = \"work\"\n", "profile")]
#[case::list_item(LayerKind::Project, "[skills]\nenabled = [\"a\", 2]\n", "skills.enabled[1]")]
#[case::server_without_command(
    LayerKind::Global,
    "[mcp.servers.files]\nargs = []\n",
    "mcp.servers.files.command"
)]
#[case::env_value(
    LayerKind::Global,
    "[mcp.servers.files]\ncommand = \"x\"\nenv = { TOKEN = 1 }\n",
    "mcp.servers.files.env.TOKEN"
)]
#[case::package_manager(LayerKind::Project, "package_manager = \"pip\"\n", "package_manager")]
#[case::budget_type(LayerKind::Global, "[cost]\ndaily_budget = \"ten\"\n", "cost.daily_budget")]
fn test_rejections_name_the_field(
    #[case] kind: LayerKind,
    #[case] toml: &str,
    #[case] expected: &str,
) {
    assert_eq!(failing_field(kind, toml), expected);
}

#[test]
fn test_validation_error_names_the_file() {
    let err = check(LayerKind::Global, "colour = 1\n").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("config.toml"), "{message}");
    assert!(message.contains("colour"), "{message}");
}

#[test]
fn test_explicit_entry_values_beat_defaults() {
    let tree = check(
        LayerKind::Global,
        "[agents.reviewer]\npriority = 7\n[agents.writer]\nmodel = \"haiku\"\n",
    )
    .unwrap();
    assert_eq!(tree["agents"]["reviewer"]["priority"], 7);
    assert_eq!(tree["agents"]["writer"]["priority"], 0);
}
