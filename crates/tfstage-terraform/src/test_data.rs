// crates/tfstage-terraform/src/test_data.rs
// ============================================================================
// Module: Test Data Stores
// Description: File-backed stage ledger and options store.
// Purpose: Persist stage markers and options inside the working directory.
// Dependencies: serde, serde_json, tempfile, tfstage-core
// ============================================================================

//! ## Overview
//! State lives under `<working_dir>/.test-data/`:
//! - `TerraformOptions.json` holds the provisioning options saved by `apply`.
//! - `stages/<stage>.json` is the completion marker for one stage.
//!
//! Writes go to a temporary file in the same directory and are renamed into
//! place, so a reader never sees a half-written file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Deserialize;
use serde::Serialize;
use tfstage_core::OptionsStore;
use tfstage_core::ProvisioningOptions;
use tfstage_core::Stage;
use tfstage_core::StageLedger;
use tfstage_core::StoreError;

// ============================================================================
// SECTION: Layout
// ============================================================================

/// Directory inside the working directory that holds harness state.
pub const TEST_DATA_DIR: &str = ".test-data";
/// File name of the persisted provisioning options.
pub const OPTIONS_FILE: &str = "TerraformOptions.json";
/// Subdirectory holding stage markers.
const STAGES_DIR: &str = "stages";

/// Returns the state directory for a working directory.
fn test_data_dir(working_dir: &Path) -> PathBuf {
    working_dir.join(TEST_DATA_DIR)
}

/// Returns the marker path for a stage.
fn marker_path(working_dir: &Path, stage: Stage) -> PathBuf {
    test_data_dir(working_dir).join(STAGES_DIR).join(format!("{}.json", stage.as_str()))
}

/// Reads a file, mapping "not found" to `None`.
fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(StoreError::Io(format!("{}: {err}", path.display()))),
    }
}

/// Writes `bytes` to `path` through a temporary sibling file.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let io_err = |err: std::io::Error| StoreError::Io(format!("{}: {err}", path.display()));
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::Io(format!("{} has no parent", path.display())))?;
    fs::create_dir_all(parent).map_err(io_err)?;
    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    temp.write_all(bytes).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|err| io_err(err.error))?;
    Ok(())
}

// ============================================================================
// SECTION: Stage Ledger
// ============================================================================

/// Contents of a stage completion marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageMarker {
    /// Completed stage.
    pub stage: Stage,
    /// Completion time in milliseconds since the Unix epoch.
    pub completed_at_ms: u64,
}

/// Stage ledger that writes markers into the working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStageLedger;

impl FileStageLedger {
    /// Reads the marker for `stage`, if present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the marker exists but cannot be read or
    /// decoded.
    pub fn marker(&self, working_dir: &Path, stage: Stage) -> Result<Option<StageMarker>, StoreError> {
        let path = marker_path(working_dir, stage);
        let Some(bytes) = read_optional(&path)? else {
            return Ok(None);
        };
        let marker: StageMarker = serde_json::from_slice(&bytes)
            .map_err(|err| StoreError::Corrupt(format!("{}: {err}", path.display())))?;
        if marker.stage != stage {
            return Err(StoreError::Corrupt(format!(
                "{}: marker records stage {}",
                path.display(),
                marker.stage
            )));
        }
        Ok(Some(marker))
    }
}

impl StageLedger for FileStageLedger {
    fn is_complete(&self, working_dir: &Path, stage: Stage) -> Result<bool, StoreError> {
        Ok(self.marker(working_dir, stage)?.is_some())
    }

    fn mark_complete(&self, working_dir: &Path, stage: Stage) -> Result<(), StoreError> {
        let marker = StageMarker {
            stage,
            completed_at_ms: u64::try_from(
                SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis(),
            )
            .unwrap_or(u64::MAX),
        };
        let bytes = serde_json::to_vec(&marker).map_err(|err| StoreError::Store(err.to_string()))?;
        write_atomic(&marker_path(working_dir, stage), &bytes)
    }
}

// ============================================================================
// SECTION: Options Store
// ============================================================================

/// Options store that writes `TerraformOptions.json` into the working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOptionsStore;

impl OptionsStore for FileOptionsStore {
    fn save(&self, working_dir: &Path, options: &ProvisioningOptions) -> Result<(), StoreError> {
        let bytes =
            serde_json::to_vec_pretty(options).map_err(|err| StoreError::Store(err.to_string()))?;
        write_atomic(&test_data_dir(working_dir).join(OPTIONS_FILE), &bytes)
    }

    fn load(&self, working_dir: &Path) -> Result<ProvisioningOptions, StoreError> {
        let path = test_data_dir(working_dir).join(OPTIONS_FILE);
        let bytes = read_optional(&path)?.ok_or_else(|| StoreError::Missing(path.display().to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|err| StoreError::Corrupt(format!("{}: {err}", path.display())))
    }
}
