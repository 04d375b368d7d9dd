// crates/tfstage-terraform/src/stager.rs
// ============================================================================
// Module: Module Stager
// Description: Copies a module tree into a fresh temporary directory.
// Purpose: Give every case its own working copy, never the module source.
// Dependencies: tempfile, walkdir, tfstage-core
// ============================================================================

//! ## Overview
//! The whole root folder is copied so relative module sources (for example
//! `source = "../../"`) keep resolving inside the copy. The returned working
//! directory is `<tmp>/<root name>/<example folder>`.
//!
//! Skipped while copying: `.terraform/` directories, `terraform.tfstate*`
//! files, and hidden entries other than `.terraform-version` and
//! `.terraform.lock.hcl`. An example folder that is absolute or contains
//! `..` is rejected, so the working directory always lies inside the copy.
//! The temporary directory is kept after the copy;
//! removing it is left to external cleanup so stages can resume.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tfstage_core::CaseName;
use tfstage_core::ModuleStager;
use tfstage_core::ToolError;
use tfstage_core::is_contained_relative;
use walkdir::DirEntry;
use walkdir::WalkDir;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Hidden files that are copied anyway.
const KEPT_HIDDEN_FILES: &[&str] = &[".terraform-version", ".terraform.lock.hcl"];

// ============================================================================
// SECTION: Stager
// ============================================================================

/// Copies modules under a run root (the system temp dir by default).
#[derive(Debug, Clone, Default)]
pub struct TempModuleStager {
    /// Parent directory for temporary copies.
    run_root: Option<PathBuf>,
}

impl TempModuleStager {
    /// Creates a stager that copies under the system temp directory.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            run_root: None,
        }
    }

    /// Creates a stager that copies under `run_root`.
    #[must_use]
    pub fn with_run_root(run_root: impl Into<PathBuf>) -> Self {
        Self {
            run_root: Some(run_root.into()),
        }
    }
}

impl ModuleStager for TempModuleStager {
    fn copy_module_to_temp(
        &self,
        case: &CaseName,
        root_folder: &Path,
        example_folder: &str,
    ) -> Result<PathBuf, ToolError> {
        if !is_contained_relative(example_folder) {
            return Err(ToolError::Copy(format!(
                "example folder {example_folder} must be relative to the root folder"
            )));
        }
        let root = root_folder.canonicalize().map_err(|err| {
            ToolError::Copy(format!("root folder {}: {err}", root_folder.display()))
        })?;
        let root_name = root
            .file_name()
            .ok_or_else(|| ToolError::Copy(format!("root folder {} has no name", root.display())))?;
        let source_example = root.join(example_folder);
        if !source_example.is_dir() {
            return Err(ToolError::Copy(format!(
                "example folder {} not found",
                source_example.display()
            )));
        }

        let parent = match &self.run_root {
            Some(run_root) => {
                fs::create_dir_all(run_root).map_err(|err| {
                    ToolError::Copy(format!("run root {}: {err}", run_root.display()))
                })?;
                run_root.clone()
            }
            None => std::env::temp_dir(),
        };
        let temp = tempfile::Builder::new()
            .prefix(&temp_prefix(case))
            .tempdir_in(&parent)
            .map_err(|err| ToolError::Copy(format!("temp dir in {}: {err}", parent.display())))?
            .keep();
        let temp = temp.canonicalize().unwrap_or(temp);
        let destination = temp.join(root_name);
        copy_tree(&root, &destination, &temp)?;
        let working_dir = destination.join(example_folder);
        if !working_dir.starts_with(&destination) {
            return Err(ToolError::Copy(format!(
                "working dir {} escapes the copy at {}",
                working_dir.display(),
                destination.display()
            )));
        }
        Ok(working_dir)
    }
}

// ============================================================================
// SECTION: Copy
// ============================================================================

/// Builds a file-name-safe temp directory prefix from a case name.
fn temp_prefix(case: &CaseName) -> String {
    let mut prefix: String = case
        .as_str()
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' { ch } else { '-' })
        .collect();
    prefix.push('-');
    prefix
}

/// Returns true when an entry below the root must not be copied.
fn is_excluded(entry: &DirEntry) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    if name.starts_with("terraform.tfstate") {
        return true;
    }
    name.starts_with('.') && !KEPT_HIDDEN_FILES.contains(&name.as_ref())
}

/// Copies `source` to `destination`, skipping excluded entries and anything
/// under `temp` (a run root inside the module).
fn copy_tree(source: &Path, destination: &Path, temp: &Path) -> Result<(), ToolError> {
    let walker = WalkDir::new(source)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry) && !entry.path().starts_with(temp));
    for entry in walker {
        let entry = entry.map_err(|err| ToolError::Copy(err.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|err| ToolError::Copy(err.to_string()))?;
        let target = destination.join(relative);
        let file_type = entry.file_type();
        let copied = if file_type.is_dir() {
            fs::create_dir_all(&target)
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)
        } else {
            fs::copy(entry.path(), &target).map(|_| ())
        };
        copied.map_err(|err| ToolError::Copy(format!("{}: {err}", entry.path().display())))?;
    }
    Ok(())
}

/// Recreates a symlink at `target`.
#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> std::io::Result<()> {
    let pointee = fs::read_link(link)?;
    std::os::unix::fs::symlink(pointee, target)
}

/// Copies the file a symlink points to.
#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> std::io::Result<()> {
    if fs::metadata(link)?.is_file() {
        fs::copy(link, target)?;
    }
    Ok(())
}
