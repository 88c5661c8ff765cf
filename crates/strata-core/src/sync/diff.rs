//! Byte-level comparison of rendered artifacts against disk

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

/// How an artifact differs from what is on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Create,
    Modify,
    Unchanged,
}

impl std::fmt::Display for DiffKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Modify => "modify",
            Self::Unchanged => "unchanged",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub file: String,
    #[serde(rename = "type")]
    pub kind: DiffKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl DiffEntry {
    pub fn is_change(&self) -> bool {
        self.kind != DiffKind::Unchanged
    }
}

/// Classify `rendered` against the `current` bytes on disk, if any.
pub fn diff_artifact(file: impl Into<String>, rendered: &[u8], current: Option<&[u8]>) -> DiffEntry {
    let (kind, summary) = match current {
        None => (
            DiffKind::Create,
            Some(format!("new file ({} bytes)", rendered.len())),
        ),
        Some(current) if current == rendered => (DiffKind::Unchanged, None),
        Some(current) => (DiffKind::Modify, Some(line_summary(current, rendered))),
    };
    DiffEntry {
        file: file.into(),
        kind,
        summary,
    }
}

/// `+N -M lines` between two versions of a file.
fn line_summary(old: &[u8], new: &[u8]) -> String {
    let old = String::from_utf8_lossy(old);
    let new = String::from_utf8_lossy(new);
    let diff = TextDiff::from_lines(old.as_ref(), new.as_ref());

    let (mut added, mut removed) = (0usize, 0usize);
    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => added += 1,
            ChangeTag::Delete => removed += 1,
            ChangeTag::Equal => {}
        }
    }
    format!("+{added} -{removed} lines")
}
