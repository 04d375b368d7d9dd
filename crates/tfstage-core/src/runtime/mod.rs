// crates/tfstage-core/src/runtime/mod.rs
// ============================================================================
// Module: tfstage Runtime
// Description: Stage execution, output assertions, and case orchestration.
// Purpose: Group the runtime pieces that drive cases through their stages.
// Dependencies: crate::{audit, interfaces, model}
// ============================================================================

//! ## Overview
//! Runtime building blocks, from the bottom up: the comparator, the
//! skip-if-complete [`StageRunner`], the [`OutputAssertionEngine`], the
//! per-case [`CaseLifecycle`] with its destroy guard, and [`run_suite`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod assertions;
pub mod comparator;
pub mod lifecycle;
pub mod stage;
pub mod store;
pub mod suite;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use assertions::OutputAssertionEngine;
pub use assertions::OutputCheck;
pub use assertions::OutputCheckStatus;
pub use assertions::OutputReport;
pub use comparator::AssertionOutcome;
pub use comparator::evaluate_assertion;
pub use lifecycle::CaseLifecycle;
pub use lifecycle::CaseReport;
pub use lifecycle::CaseSettings;
pub use lifecycle::DEFAULT_NO_CHANGES_MARKER;
pub use lifecycle::DestroyGuard;
pub use lifecycle::HarnessServices;
pub use lifecycle::OutputsStage;
pub use lifecycle::StageRecord;
pub use lifecycle::StageStatus;
pub use stage::SkipOverrides;
pub use stage::SkipReason;
pub use stage::StageContext;
pub use stage::StageError;
pub use stage::StageFault;
pub use stage::StageOutcome;
pub use stage::StageRunner;
pub use store::InMemoryOptionsStore;
pub use store::InMemoryStageLedger;
pub use suite::SuiteReport;
pub use suite::run_suite;
