// crates/tfstage-terraform/src/lib.rs
// ============================================================================
// Module: tfstage Terraform Driver
// Description: Terraform CLI implementation of the tfstage tool interfaces.
// Purpose: Run init/apply/plan/destroy/output and persist stage state on disk.
// Dependencies: tfstage-core, regex, serde_json, tempfile, walkdir
// ============================================================================

//! ## Overview
//! [`TerraformCli`] shells out to the `terraform` binary with the flags a
//! non-interactive test run needs, retrying failures that match the
//! configured retryable patterns. [`TempModuleStager`] copies a module tree
//! into a fresh temporary directory. [`FileStageLedger`] and
//! [`FileOptionsStore`] keep stage markers and options under
//! `<working_dir>/.test-data/` so stages can resume across processes.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod args;
pub mod cli;
pub mod render;
pub mod retry;
pub mod stager;
pub mod test_data;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cli::DEFAULT_TERRAFORM_BINARY;
pub use cli::TerraformCli;
pub use render::render_output;
pub use retry::RetryClassifier;
pub use stager::TempModuleStager;
pub use test_data::FileOptionsStore;
pub use test_data::FileStageLedger;
pub use test_data::OPTIONS_FILE;
pub use test_data::StageMarker;
pub use test_data::TEST_DATA_DIR;
