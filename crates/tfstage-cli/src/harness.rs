// crates/tfstage-cli/src/harness.rs
// ============================================================================
// Module: tfstage Harness Wiring
// Description: Builds harness services from suite configuration.
// Purpose: Keep the concrete service choices in one place for every command.
// Dependencies: tfstage-config, tfstage-core, tfstage-terraform, thiserror
// ============================================================================

//! ## Overview
//! The CLI always runs against real adapters: the Terraform binary, temporary
//! working copies, and file-backed stage markers and options under each
//! working copy's `.test-data` directory. Events go to the configured event
//! log, or to stderr when none is set.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tfstage_config::SuiteConfig;
use tfstage_core::CaseLifecycle;
use tfstage_core::FileAuditSink;
use tfstage_core::HarnessAuditSink;
use tfstage_core::HarnessServices;
use tfstage_core::SkipOverrides;
use tfstage_core::StderrAuditSink;
use tfstage_terraform::FileOptionsStore;
use tfstage_terraform::FileStageLedger;
use tfstage_terraform::TempModuleStager;
use tfstage_terraform::TerraformCli;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while wiring harness services.
#[derive(Debug, Error)]
pub enum HarnessBuildError {
    /// The event log could not be opened.
    #[error("failed to open event log {path}: {source}")]
    EventLog {
        /// Configured event log path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// SECTION: Wiring
// ============================================================================

/// Opens the configured event sink.
///
/// # Errors
///
/// Returns [`HarnessBuildError::EventLog`] when the log file cannot be opened.
pub fn open_audit_sink(
    event_log: Option<&str>,
) -> Result<Arc<dyn HarnessAuditSink>, HarnessBuildError> {
    match event_log {
        Some(path) => {
            let sink = FileAuditSink::new(Path::new(path)).map_err(|source| {
                HarnessBuildError::EventLog {
                    path: path.to_string(),
                    source,
                }
            })?;
            Ok(Arc::new(sink))
        }
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

/// Builds the real service set for `config`.
///
/// # Errors
///
/// Returns [`HarnessBuildError`] when a service cannot be created.
pub fn build_services(
    config: &SuiteConfig,
    skip: SkipOverrides,
) -> Result<HarnessServices, HarnessBuildError> {
    let audit = open_audit_sink(config.workspace.event_log.as_deref())?;
    let stager = config
        .workspace
        .run_root
        .as_ref()
        .map_or_else(TempModuleStager::new, TempModuleStager::with_run_root);
    Ok(HarnessServices {
        tool: Arc::new(TerraformCli::new(&config.terraform.binary, Arc::clone(&audit))),
        stager: Arc::new(stager),
        ledger: Arc::new(FileStageLedger),
        options_store: Arc::new(FileOptionsStore),
        audit,
        skip,
    })
}

/// Builds a lifecycle for `config` with operator overrides from the
/// environment.
///
/// # Errors
///
/// Returns [`HarnessBuildError`] when a service cannot be created.
pub fn build_lifecycle(config: &SuiteConfig) -> Result<CaseLifecycle, HarnessBuildError> {
    let services = build_services(config, SkipOverrides::from_env())?;
    Ok(CaseLifecycle::new(services, config.case_settings()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
