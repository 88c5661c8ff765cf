//! [`TestWorkspace`] builder for Strata test scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary project directory and a separate temporary global directory,
/// with helpers to write layers and inspect the managed directory.
///
/// # Example
///
/// ```rust,no_run
/// use strata_test_utils::TestWorkspace;
///
/// let ws = TestWorkspace::new();
/// ws.write_project("content = \"# Notes\"\n");
/// ws.write_profile("work", "[model]\ndefault = \"opus\"\n");
/// ws.set_active_profile("work");
/// ws.assert_file_exists(".strata/config.toml");
/// ```
pub struct TestWorkspace {
    project: TempDir,
    global: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create empty project and global directories.
    pub fn new() -> Self {
        Self {
            project: TempDir::new().unwrap(),
            global: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.project.path()
    }

    pub fn global_dir(&self) -> &Path {
        self.global.path()
    }

    /// `<root>/.strata`
    pub fn strata_dir(&self) -> PathBuf {
        self.root().join(".strata")
    }

    /// The default managed directory, `<root>/.agent`.
    pub fn managed_dir(&self) -> PathBuf {
        self.root().join(".agent")
    }

    fn write(path: PathBuf, content: &str) -> PathBuf {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", path.display()));
        path
    }

    /// Write `.strata/config.toml`.
    pub fn write_project(&self, toml: &str) -> PathBuf {
        Self::write(self.strata_dir().join("config.toml"), toml)
    }

    /// Write `.strata/config.local.toml`.
    pub fn write_local(&self, toml: &str) -> PathBuf {
        Self::write(self.strata_dir().join("config.local.toml"), toml)
    }

    /// Write `<global>/config.toml`.
    pub fn write_global(&self, toml: &str) -> PathBuf {
        Self::write(self.global_dir().join("config.toml"), toml)
    }

    /// Write `<global>/profiles/<name>.toml`.
    pub fn write_profile(&self, name: &str, toml: &str) -> PathBuf {
        Self::write(
            self.global_dir().join("profiles").join(format!("{name}.toml")),
            toml,
        )
    }

    /// Point `<global>/active-profile` at `name`.
    pub fn set_active_profile(&self, name: &str) -> PathBuf {
        Self::write(self.global_dir().join("active-profile"), &format!("{name}\n"))
    }

    /// Write `.strata/capabilities.json`.
    pub fn write_capabilities(&self, json: &str) -> PathBuf {
        Self::write(self.strata_dir().join("capabilities.json"), json)
    }

    /// Write any file relative to the project root.
    pub fn write_file(&self, rel: &str, content: &str) -> PathBuf {
        Self::write(self.root().join(rel), content)
    }

    /// Read a file relative to the project root.
    pub fn read_file(&self, rel: &str) -> String {
        let path = self.root().join(rel);
        fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Could not read {}: {e}", path.display()))
    }

    /// Names of the snapshot directories under `.strata/backups`.
    pub fn backup_ids(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.strata_dir().join("backups")) else {
            return Vec::new();
        };
        let mut ids: Vec<String> = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        ids.sort();
        ids
    }

    /// Assert that `path` (relative to the project root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `path` (relative to the project root) does **not** exist.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read_file(path);
        assert!(
            file_content.contains(content),
            "File {path} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }
}
