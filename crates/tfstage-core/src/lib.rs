// crates/tfstage-core/src/lib.rs
// ============================================================================
// Module: tfstage Core Library
// Description: Public API surface for the tfstage harness core.
// Purpose: Expose case tables, tool interfaces, and stage orchestration.
// Dependencies: crate::{audit, model, interfaces, runtime}
// ============================================================================

//! ## Overview
//! tfstage core drives an infrastructure module through named, resumable
//! lifecycle stages (`apply`, `plan`, `outputs_validation`, `destroy`) and
//! checks the provisioned stack's outputs against a declarative expectation
//! table. The infrastructure tool itself is reached only through the
//! [`InfraTool`] interface; this crate never shells out.
//!
//! Teardown is guaranteed: once a working directory exists, the `destroy`
//! stage runs exactly once on every exit path, panics included.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod interfaces;
pub mod model;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::HarnessAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use interfaces::InfraTool;
pub use interfaces::ModuleStager;
pub use interfaces::OptionsStore;
pub use interfaces::StageLedger;
pub use interfaces::StoreError;
pub use interfaces::ToolError;
pub use model::*;
pub use runtime::CaseLifecycle;
pub use runtime::CaseReport;
pub use runtime::CaseSettings;
pub use runtime::DEFAULT_NO_CHANGES_MARKER;
pub use runtime::HarnessServices;
pub use runtime::InMemoryOptionsStore;
pub use runtime::InMemoryStageLedger;
pub use runtime::OutputAssertionEngine;
pub use runtime::OutputCheck;
pub use runtime::OutputCheckStatus;
pub use runtime::OutputReport;
pub use runtime::OutputsStage;
pub use runtime::SkipOverrides;
pub use runtime::SkipReason;
pub use runtime::StageError;
pub use runtime::StageFault;
pub use runtime::StageOutcome;
pub use runtime::StageRecord;
pub use runtime::StageRunner;
pub use runtime::StageStatus;
pub use runtime::SuiteReport;
pub use runtime::run_suite;
