// crates/tfstage-core/src/interfaces/mod.rs
// ============================================================================
// Module: tfstage Interfaces
// Description: Tool-agnostic contracts for provisioning, staging, and state.
// Purpose: Define the seams between stage orchestration and external systems.
// Dependencies: crate::model, thiserror
// ============================================================================

//! ## Overview
//! The harness treats the infrastructure tool as an opaque protocol of a few
//! verbs: copy a module, init+apply, plan, destroy, read an output, and
//! save/load options. Stage completion markers live behind [`StageLedger`].
//! Implementations must surface tool errors unchanged rather than swallowing
//! them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::CaseName;
use crate::model::ProvisioningOptions;
use crate::model::Stage;

// ============================================================================
// SECTION: Infrastructure Tool
// ============================================================================

/// Infrastructure tool errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// The tool process could not be started.
    #[error("failed to launch {program}: {message}")]
    Launch {
        /// Program that failed to start.
        program: String,
        /// Launch error message.
        message: String,
    },
    /// The tool exited unsuccessfully.
    #[error("{verb} failed ({}): {}", exit_label(.exit_code), .stderr.trim())]
    CommandFailed {
        /// Tool verb that failed.
        verb: String,
        /// Exit code when the process exited normally.
        exit_code: Option<i32>,
        /// Captured stdout.
        stdout: String,
        /// Captured stderr.
        stderr: String,
    },
    /// The requested output is not declared by the stack.
    #[error("output {name} not found: {message}")]
    OutputMissing {
        /// Requested output name.
        name: String,
        /// Tool-provided detail.
        message: String,
    },
    /// The tool produced output that could not be interpreted.
    #[error("invalid tool output: {0}")]
    InvalidOutput(String),
    /// Copying the module into a working directory failed.
    #[error("module copy failed: {0}")]
    Copy(String),
    /// The tool configuration is invalid (for example a bad retry pattern).
    #[error("invalid tool configuration: {0}")]
    Config(String),
}

/// Renders an exit code for error messages.
fn exit_label(exit_code: &Option<i32>) -> String {
    exit_code.map_or_else(|| "terminated by signal".to_string(), |code| format!("exit code {code}"))
}

/// Infrastructure-as-code tool driven through a fixed set of verbs.
pub trait InfraTool: Send + Sync {
    /// Initializes the working directory and applies it.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when init or apply fails after retries.
    fn init_and_apply(&self, options: &ProvisioningOptions) -> Result<String, ToolError>;

    /// Produces a plan for the working directory and returns its text.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when planning fails after retries.
    fn plan(&self, options: &ProvisioningOptions) -> Result<String, ToolError>;

    /// Destroys everything the working directory provisioned.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when destroy fails after retries.
    fn destroy(&self, options: &ProvisioningOptions) -> Result<String, ToolError>;

    /// Reads a named output as a rendered string.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the output is missing or cannot be read.
    fn output(&self, options: &ProvisioningOptions, name: &str) -> Result<String, ToolError>;
}

/// Copies a module into an isolated working directory.
pub trait ModuleStager: Send + Sync {
    /// Copies `root_folder` into a fresh directory and returns the path of
    /// `example_folder` inside the copy.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Copy`] when the copy cannot be created.
    fn copy_module_to_temp(
        &self,
        case: &CaseName,
        root_folder: &Path,
        example_folder: &str,
    ) -> Result<PathBuf, ToolError>;
}

// ============================================================================
// SECTION: Stage State
// ============================================================================

/// Stage state persistence errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// I/O failure while reading or writing state.
    #[error("stage state io error: {0}")]
    Io(String),
    /// Persisted state could not be decoded.
    #[error("stage state is corrupt: {0}")]
    Corrupt(String),
    /// Requested state does not exist.
    #[error("stage state not found: {0}")]
    Missing(String),
    /// Store-internal failure.
    #[error("stage state store error: {0}")]
    Store(String),
}

/// Persistent record of which stages completed for a working directory.
pub trait StageLedger: Send + Sync {
    /// Returns true when `stage` already completed for `working_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the marker cannot be read.
    fn is_complete(&self, working_dir: &Path, stage: Stage) -> Result<bool, StoreError>;

    /// Records that `stage` completed for `working_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the marker cannot be written.
    fn mark_complete(&self, working_dir: &Path, stage: Stage) -> Result<(), StoreError>;
}

/// Persistence for provisioning options shared between stages.
pub trait OptionsStore: Send + Sync {
    /// Saves options for a working directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the options cannot be written.
    fn save(&self, working_dir: &Path, options: &ProvisioningOptions) -> Result<(), StoreError>;

    /// Loads previously saved options for a working directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Missing`] when nothing was saved, or another
    /// [`StoreError`] when the saved options cannot be read.
    fn load(&self, working_dir: &Path) -> Result<ProvisioningOptions, StoreError>;
}
