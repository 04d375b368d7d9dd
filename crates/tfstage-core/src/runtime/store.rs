// crates/tfstage-core/src/runtime/store.rs
// ============================================================================
// Module: tfstage In-Memory Stores
// Description: Process-local stage ledger and options store.
// Purpose: Back the stage runner in tests and single-process runs.
// Dependencies: crate::interfaces, crate::model
// ============================================================================

//! ## Overview
//! In-memory implementations of [`StageLedger`] and [`OptionsStore`]. State
//! is keyed by working directory and lost when the process exits; use the
//! file-backed stores from the Terraform driver for resumable runs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use crate::interfaces::OptionsStore;
use crate::interfaces::StageLedger;
use crate::interfaces::StoreError;
use crate::model::ProvisioningOptions;
use crate::model::Stage;

// ============================================================================
// SECTION: Stage Ledger
// ============================================================================

/// In-memory stage ledger for tests and single-process runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStageLedger {
    /// Completed (working dir, stage) pairs protected by a mutex.
    markers: Arc<Mutex<BTreeSet<(PathBuf, Stage)>>>,
}

impl InMemoryStageLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StageLedger for InMemoryStageLedger {
    fn is_complete(&self, working_dir: &Path, stage: Stage) -> Result<bool, StoreError> {
        let guard = self
            .markers
            .lock()
            .map_err(|_| StoreError::Store("stage ledger mutex poisoned".to_string()))?;
        Ok(guard.contains(&(working_dir.to_path_buf(), stage)))
    }

    fn mark_complete(&self, working_dir: &Path, stage: Stage) -> Result<(), StoreError> {
        self.markers
            .lock()
            .map_err(|_| StoreError::Store("stage ledger mutex poisoned".to_string()))?
            .insert((working_dir.to_path_buf(), stage));
        Ok(())
    }
}

// ============================================================================
// SECTION: Options Store
// ============================================================================

/// In-memory provisioning options store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOptionsStore {
    /// Saved options keyed by working directory.
    options: Arc<Mutex<BTreeMap<PathBuf, ProvisioningOptions>>>,
}

impl InMemoryOptionsStore {
    /// Creates an empty options store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OptionsStore for InMemoryOptionsStore {
    fn save(&self, working_dir: &Path, options: &ProvisioningOptions) -> Result<(), StoreError> {
        self.options
            .lock()
            .map_err(|_| StoreError::Store("options store mutex poisoned".to_string()))?
            .insert(working_dir.to_path_buf(), options.clone());
        Ok(())
    }

    fn load(&self, working_dir: &Path) -> Result<ProvisioningOptions, StoreError> {
        let guard = self
            .options
            .lock()
            .map_err(|_| StoreError::Store("options store mutex poisoned".to_string()))?;
        guard
            .get(working_dir)
            .cloned()
            .ok_or_else(|| StoreError::Missing(working_dir.display().to_string()))
    }
}
