// crates/resilient-proxy-gen/src/compare.rs
// ============================================================================
// Module: Generated File Comparison
// Description: Line-by-line comparison that ignores the tool-version line.
// Purpose: Detect drift between on-disk and freshly generated output.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`compare_generated`] compares two rendered files line by line, skipping
//! [`IGNORED_LINE`], and reports the first difference.

use std::fmt;

/// One-based line number that carries the tool version.
pub const IGNORED_LINE: usize = 4;

/// First difference between two generated files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratedDiff {
    /// A line present in both files differs.
    Line {
        /// One-based line number.
        line: usize,
        /// Expected line text.
        expected: String,
        /// Actual line text.
        actual: String,
    },
    /// Every shared line matches but the line counts differ.
    Length {
        /// Expected line count.
        expected: usize,
        /// Actual line count.
        actual: usize,
    },
}

impl fmt::Display for GeneratedDiff {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Line {
                line,
                expected,
                actual,
            } => write!(
                formatter,
                "first difference is at line {line}: expected '{expected}', found '{actual}'"
            ),
            Self::Length {
                expected,
                actual,
            } => write!(formatter, "expected {expected} lines, found {actual}"),
        }
    }
}

/// Compares two generated files, ignoring line [`IGNORED_LINE`].
///
/// Lines end at `\n` or `\r\n`, so files checked out with either line
/// ending compare equal. A missing final line terminator is not a
/// difference.
///
/// # Examples
/// ```
/// use resilient_proxy_gen::compare_generated;
///
/// let expected = "a\nb\nc\nversion 1\ne\n";
/// let actual = "a\nb\nc\nversion 2\ne\n";
/// assert!(compare_generated(expected, actual).is_none());
/// ```
#[must_use]
pub fn compare_generated(expected: &str, actual: &str) -> Option<GeneratedDiff> {
    let expected_lines: Vec<&str> = expected.lines().collect();
    let actual_lines: Vec<&str> = actual.lines().collect();
    let mismatch = expected_lines
        .iter()
        .zip(&actual_lines)
        .enumerate()
        .map(|(index, pair)| (index + 1, pair))
        .find(|(line, (left, right))| *line != IGNORED_LINE && left != right);
    if let Some((line, (left, right))) = mismatch {
        return Some(GeneratedDiff::Line {
            line,
            expected: (*left).to_string(),
            actual: (*right).to_string(),
        });
    }
    if expected_lines.len() == actual_lines.len() {
        None
    } else {
        Some(GeneratedDiff::Length {
            expected: expected_lines.len(),
            actual: actual_lines.len(),
        })
    }
}
