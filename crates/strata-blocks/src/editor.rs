//! Splicing freshly rendered managed content into existing files.

use std::ops::Range;

use crate::error::{Error, Result};
use crate::markers::ManagedMarkers;
use crate::parser::{RegionScan, scan, scan_bytes};

/// Rewrites the managed region of a file while leaving foreign content alone.
///
/// ```
/// use strata_blocks::ManagedRegionEditor;
///
/// let editor = ManagedRegionEditor::default();
/// let block = editor.wrap("# Notes");
/// let existing = format!("mine\n{}theirs\n", editor.wrap("old"));
///
/// let merged = editor.apply(Some(&existing), &block);
/// assert_eq!(merged, format!("mine\n{}theirs\n", block));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManagedRegionEditor {
    markers: ManagedMarkers,
}

impl ManagedRegionEditor {
    /// Create an editor using the markers for `tool`.
    pub fn new(tool: &str) -> Result<Self> {
        Ok(Self {
            markers: ManagedMarkers::new(tool)?,
        })
    }

    pub fn markers(&self) -> &ManagedMarkers {
        &self.markers
    }

    /// Fail if any line of `body` would be read back as a marker line.
    ///
    /// A body like that would leave the wrapped block unbalanced, and the
    /// next splice would discard the text around it.
    pub fn check_content(&self, body: &str) -> Result<()> {
        match body
            .lines()
            .position(|line| self.markers.is_marker_line(line))
        {
            Some(index) => Err(Error::MarkerInContent { line: index + 1 }),
            None => Ok(()),
        }
    }

    /// Wrap `body` in marker lines, producing a complete managed block.
    ///
    /// The body is embedded verbatim; a newline is only added before the end
    /// marker when the body does not already end with one.
    pub fn wrap(&self, body: &str) -> String {
        let mut out = String::with_capacity(body.len() + 64);
        out.push_str(self.markers.start());
        out.push('\n');
        out.push_str(body);
        if !body.is_empty() && !body.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(self.markers.end());
        out.push('\n');
        out
    }

    /// The span `new_block` replaces, or `None` when it becomes the whole file.
    fn replaced_span(&self, scanned: RegionScan) -> Option<Range<usize>> {
        match scanned {
            RegionScan::WellFormed(region) => Some(region.span),
            RegionScan::Absent => None,
            RegionScan::Malformed { starts, ends } => {
                tracing::warn!(
                    starts,
                    ends,
                    "Unbalanced managed markers; regenerating file from the managed block"
                );
                None
            }
        }
    }

    /// Merge `new_block` (markers included) into `existing` content.
    ///
    /// - no existing content: the block alone
    /// - one well-formed region: bytes outside the region are kept verbatim
    ///   and the region, markers included, is replaced by `new_block`
    /// - no markers, or unbalanced markers: the block becomes the whole file
    pub fn apply(&self, existing: Option<&str>, new_block: &str) -> String {
        let Some(existing) = existing.filter(|c| !c.is_empty()) else {
            return new_block.to_string();
        };

        match self.replaced_span(scan(&self.markers, existing)) {
            Some(span) => {
                let mut out = String::with_capacity(existing.len() - span.len() + new_block.len());
                out.push_str(&existing[..span.start]);
                out.push_str(new_block);
                out.push_str(&existing[span.end..]);
                out
            }
            None => new_block.to_string(),
        }
    }

    /// [`apply`](Self::apply) over raw bytes.
    ///
    /// Foreign bytes are copied as they are, whether or not they are UTF-8.
    pub fn apply_bytes(&self, existing: Option<&[u8]>, new_block: &[u8]) -> Vec<u8> {
        let Some(existing) = existing.filter(|c| !c.is_empty()) else {
            return new_block.to_vec();
        };

        match self.replaced_span(scan_bytes(&self.markers, existing)) {
            Some(span) => {
                let mut out = Vec::with_capacity(existing.len() - span.len() + new_block.len());
                out.extend_from_slice(&existing[..span.start]);
                out.extend_from_slice(new_block);
                out.extend_from_slice(&existing[span.end..]);
                out
            }
            None => new_block.to_vec(),
        }
    }

    /// Return the interior of the managed region, if well-formed.
    pub fn extract<'a>(&self, content: &'a str) -> Option<&'a str> {
        scan(&self.markers, content)
            .region()
            .map(|region| &content[region.interior.clone()])
    }

    /// Whether `content` has a well-formed managed region.
    pub fn has_region(&self, content: &str) -> bool {
        matches!(scan(&self.markers, content), RegionScan::WellFormed(_))
    }
}
