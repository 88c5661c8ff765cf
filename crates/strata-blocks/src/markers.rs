//! Marker line construction and recognition.

use crate::error::{Error, Result};
use regex::bytes::Regex;
use strata_fs::validate_path_identifier;

/// Tool name used in markers when none is configured.
pub const DEFAULT_TOOL: &str = "strata";

/// The start/end marker pair for one tool.
#[derive(Debug, Clone)]
pub struct ManagedMarkers {
    tool: String,
    start: String,
    end: String,
    start_line: Regex,
    end_line: Regex,
}

impl ManagedMarkers {
    /// Build the marker pair for `tool`.
    ///
    /// The tool name must be a plain identifier since it is embedded in
    /// files users edit.
    pub fn new(tool: &str) -> Result<Self> {
        validate_path_identifier(tool, "Tool name")
            .map_err(|reason| Error::InvalidTool { reason })?;

        let start = format!("<!-- {}:managed:start -->", tool);
        let end = format!("<!-- {}:managed:end -->", tool);
        // Surrounding whitespace and a trailing CR are tolerated so that an
        // indented or CRLF marker line is still recognised.
        let start_line = Regex::new(&format!(
            r"^\s*<!--\s*{}:managed:start\s*-->\s*$",
            regex::escape(tool)
        ))?;
        let end_line = Regex::new(&format!(
            r"^\s*<!--\s*{}:managed:end\s*-->\s*$",
            regex::escape(tool)
        ))?;

        Ok(Self {
            tool: tool.to_string(),
            start,
            end,
            start_line,
            end_line,
        })
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// The literal start marker line (without newline).
    pub fn start(&self) -> &str {
        &self.start
    }

    /// The literal end marker line (without newline).
    pub fn end(&self) -> &str {
        &self.end
    }

    /// Lines are matched as bytes, so text around them need not be UTF-8.
    pub fn is_start_line(&self, line: impl AsRef<[u8]>) -> bool {
        self.start_line.is_match(line.as_ref())
    }

    pub fn is_end_line(&self, line: impl AsRef<[u8]>) -> bool {
        self.end_line.is_match(line.as_ref())
    }

    pub fn is_marker_line(&self, line: impl AsRef<[u8]>) -> bool {
        let line = line.as_ref();
        self.is_start_line(line) || self.is_end_line(line)
    }
}

impl Default for ManagedMarkers {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL).expect("Invalid default marker tool")
    }
}
