//! Locating the managed region inside existing file content.

use crate::markers::ManagedMarkers;
use std::ops::Range;

/// A well-formed managed region, as byte ranges into the scanned content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// From the first byte of the start marker line through the end of the
    /// end marker line, including its newline when present.
    pub span: Range<usize>,
    /// The bytes strictly between the two marker lines.
    pub interior: Range<usize>,
}

/// Outcome of scanning content for a managed region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionScan {
    /// No marker lines at all.
    Absent,
    /// Exactly one start line followed by exactly one end line.
    WellFormed(Region),
    /// Markers present but unbalanced, duplicated, or out of order.
    Malformed { starts: usize, ends: usize },
}

impl RegionScan {
    pub fn region(&self) -> Option<&Region> {
        match self {
            Self::WellFormed(region) => Some(region),
            _ => None,
        }
    }
}

/// Scan `content` for the managed region delimited by `markers`.
///
/// # Example
/// ```
/// use strata_blocks::{ManagedMarkers, RegionScan, parser::scan};
///
/// let markers = ManagedMarkers::default();
/// let content = "intro\n<!-- strata:managed:start -->\nbody\n<!-- strata:managed:end -->\n";
/// let RegionScan::WellFormed(region) = scan(&markers, content) else { panic!() };
/// assert_eq!(&content[region.interior], "body\n");
/// ```
pub fn scan(markers: &ManagedMarkers, content: &str) -> RegionScan {
    // Marker lines are ASCII and ranges end on newlines, so they are valid
    // char boundaries in `content`
    scan_bytes(markers, content.as_bytes())
}

/// [`scan`] over raw bytes, for files that are not valid UTF-8.
pub fn scan_bytes(markers: &ManagedMarkers, content: &[u8]) -> RegionScan {
    // (line start, line end including newline)
    let mut starts: Vec<(usize, usize)> = Vec::new();
    let mut ends: Vec<(usize, usize)> = Vec::new();

    let mut offset = 0;
    for line in content.split_inclusive(|b| *b == b'\n') {
        let line_start = offset;
        offset += line.len();
        let text = line.strip_suffix(b"\n".as_slice()).unwrap_or(line);

        if markers.is_start_line(text) {
            starts.push((line_start, offset));
        } else if markers.is_end_line(text) {
            ends.push((line_start, offset));
        }
    }

    match (starts.as_slice(), ends.as_slice()) {
        ([], []) => RegionScan::Absent,
        ([(start_begin, start_end)], [(end_begin, end_end)]) if start_end <= end_begin => {
            RegionScan::WellFormed(Region {
                span: *start_begin..*end_end,
                interior: *start_end..*end_begin,
            })
        }
        _ => {
            tracing::debug!(
                starts = starts.len(),
                ends = ends.len(),
                "Managed markers are unbalanced; treating as absent"
            );
            RegionScan::Malformed {
                starts: starts.len(),
                ends: ends.len(),
            }
        }
    }
}
