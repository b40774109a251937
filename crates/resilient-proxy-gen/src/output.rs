// crates/resilient-proxy-gen/src/output.rs
// ============================================================================
// Module: Generated Output Files
// Description: Staged writes and drift checks for generated proxy sources.
// Purpose: Never leave a partially written proxy source file behind.
// Dependencies: crate::{compare, error}, tempfile
// ============================================================================

//! ## Overview
//! [`write_output`] stages a proxy source in a hidden temporary file next to
//! its destination, syncs it, and renames it over the destination. The
//! staging file is owned by a [`tempfile::NamedTempFile`], so every failure
//! path deletes it. The destination is never removed before its replacement
//! is in place: a failed rename leaves the previous output untouched.
//!
//! [`check_output`] reads the destination back and compares it with freshly
//! rendered contents through [`compare_generated`].

use std::ffi::OsStr;
use std::fmt::Display;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use tempfile::Builder;

use crate::compare::compare_generated;
use crate::error::GenerateError;

// ============================================================================
// SECTION: Write
// ============================================================================

/// Writes `contents` to `path` and returns the written path.
///
/// Parent directories are created when missing.
///
/// # Errors
///
/// Returns [`GenerateError::Io`] naming the step and path that failed. The
/// staging file is removed and any previous file at `path` is left as it was.
pub fn write_output(path: &Path, contents: &str) -> Result<PathBuf, GenerateError> {
    let file_name = path
        .file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(|| {
            GenerateError::Io(format!("output path {} does not name a file", path.display()))
        })?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| io_error("creating", parent, err))?;

    let mut staged = Builder::new()
        .prefix(&format!(".{file_name}."))
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|err| io_error("staging", path, err))?;
    staged.write_all(contents.as_bytes()).map_err(|err| io_error("writing", path, err))?;
    staged.as_file().sync_all().map_err(|err| io_error("syncing", path, err))?;
    // A failed persist hands the staging file back inside the error; dropping it deletes it.
    staged.persist(path).map_err(|err| io_error("replacing", path, err.error))?;
    Ok(path.to_path_buf())
}

/// Builds an IO error naming the failed step and path.
fn io_error(step: &str, path: &Path, err: impl Display) -> GenerateError {
    GenerateError::Io(format!("{step} {}: {err}", path.display()))
}

// ============================================================================
// SECTION: Check
// ============================================================================

/// Compares the on-disk file at `path` with freshly generated `contents` and
/// returns the verified path.
///
/// # Errors
///
/// Returns [`GenerateError::Drift`] when the file is missing, unreadable, or
/// differs outside the ignored version line.
pub fn check_output(path: &Path, contents: &str) -> Result<PathBuf, GenerateError> {
    let drift = |detail: String| GenerateError::Drift {
        path: path.display().to_string(),
        detail,
    };
    let existing = fs::read_to_string(path)
        .map_err(|err| drift(format!("unable to read existing output: {err}")))?;
    match compare_generated(contents, &existing) {
        None => Ok(path.to_path_buf()),
        Some(diff) => Err(drift(diff.to_string())),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::panic,
        clippy::use_debug,
        reason = "Test-only panic-based assertions are permitted."
    )]

    use std::fs;
    use std::path::Path;

    use super::check_output;
    use super::write_output;
    use crate::error::GenerateError;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn write_returns_destination_and_leaves_no_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("RestartableThing.cs");

        let first = write_output(&target, "class A\n").unwrap();
        let second = write_output(&target, "class B\n").unwrap();

        assert_eq!(first, target);
        assert_eq!(second, target);
        assert_eq!(fs::read_to_string(&target).unwrap(), "class B\n");
        assert_eq!(entries(&dir.path().join("nested")), vec!["RestartableThing.cs"]);
    }

    #[test]
    fn failed_replace_keeps_destination_and_removes_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("RestartableThing.cs");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "previous").unwrap();

        let result = write_output(&target, "class A\n");

        match result {
            Err(GenerateError::Io(message)) => assert!(message.starts_with("replacing")),
            other => panic!("expected replace failure, got {other:?}"),
        }
        assert_eq!(entries(dir.path()), vec!["RestartableThing.cs"]);
        assert_eq!(fs::read_to_string(target.join("keep")).unwrap(), "previous");
    }

    #[test]
    fn check_reports_missing_output_as_drift() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("RestartableThing.cs");

        assert!(matches!(check_output(&target, "class A\n"), Err(GenerateError::Drift { .. })));
        write_output(&target, "class A\n").unwrap();
        assert_eq!(check_output(&target, "class A\n").unwrap(), target);
    }
}
