// crates/tfstage-core/src/runtime/stage.rs
// ============================================================================
// Module: tfstage Stage Runner
// Description: Skip-if-complete execution of named lifecycle stages.
// Purpose: Make each stage resumable across harness invocations.
// Dependencies: crate::{audit, interfaces, model}, thiserror
// ============================================================================

//! ## Overview
//! [`StageRunner::run_stage`] consults the [`StageLedger`] before running a
//! stage body. A completed stage is skipped; a successful body writes its
//! marker; a failed body leaves no marker so the next run retries it. Operators
//! may force a skip with `SKIP_<stage>`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;

use crate::audit::HarnessAuditSink;
use crate::audit::StageAuditEvent;
use crate::audit::StageAuditEventParams;
use crate::audit::StageAuditStatus;
use crate::interfaces::StageLedger;
use crate::interfaces::StoreError;
use crate::interfaces::ToolError;
use crate::model::CaseName;
use crate::model::Stage;
use crate::model::TestCaseError;

// ============================================================================
// SECTION: Outcomes and Errors
// ============================================================================

/// Why a stage body did not run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// A completion marker already exists for the working directory.
    AlreadyComplete,
    /// The operator set `SKIP_<stage>`.
    OperatorOverride,
}

impl SkipReason {
    /// Returns a stable label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AlreadyComplete => "already_complete",
            Self::OperatorOverride => "operator_override",
        }
    }
}

/// Successful result of [`StageRunner::run_stage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum StageOutcome {
    /// The body ran and the marker was written.
    Ran,
    /// The body did not run.
    Skipped(SkipReason),
}

/// Failure raised inside a stage body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageFault {
    /// The infrastructure tool failed.
    #[error(transparent)]
    Tool(#[from] ToolError),
    /// Stage state or options could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The test case row is invalid.
    #[error(transparent)]
    Case(#[from] TestCaseError),
    /// The re-plan found changes.
    #[error("plan output does not contain {marker:?}")]
    PlanDrift {
        /// Marker the plan text was expected to contain.
        marker: String,
    },
    /// One or more output checks failed.
    #[error("{failed} of {total} output checks failed")]
    OutputChecks {
        /// Failed checks.
        failed: usize,
        /// Total checks.
        total: usize,
    },
}

impl StageFault {
    /// Returns true for assertion failures, which do not stop later stages.
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::PlanDrift { .. } | Self::OutputChecks { .. })
    }
}

/// Error returned by [`StageRunner::run_stage`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stage {stage} failed: {fault}")]
pub struct StageError {
    /// Stage that failed.
    pub stage: Stage,
    /// Underlying failure.
    #[source]
    pub fault: StageFault,
}

// ============================================================================
// SECTION: Skip Overrides
// ============================================================================

/// Stages the operator asked to skip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipOverrides {
    /// Stages forced to skip.
    stages: BTreeSet<Stage>,
}

impl SkipOverrides {
    /// Returns overrides that skip nothing.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds overrides from an explicit stage list.
    #[must_use]
    pub fn from_stages(stages: impl IntoIterator<Item = Stage>) -> Self {
        Self {
            stages: stages.into_iter().collect(),
        }
    }

    /// Builds overrides from a variable lookup; any non-empty `SKIP_<stage>`
    /// value skips that stage.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self::from_stages(Stage::ALL.into_iter().filter(|stage| {
            lookup(&stage.skip_env_var()).is_some_and(|value| !value.is_empty())
        }))
    }

    /// Builds overrides from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| {
            std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
        })
    }

    /// Returns true when `stage` is forced to skip.
    #[must_use]
    pub fn skips(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }
}

// ============================================================================
// SECTION: Stage Runner
// ============================================================================

/// Identifies the case and working directory a stage runs against.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    /// Test case name.
    pub case: &'a CaseName,
    /// Working directory the markers are keyed by.
    pub working_dir: &'a Path,
}

/// Executes stages with skip-if-complete semantics.
#[derive(Clone)]
pub struct StageRunner {
    /// Completion marker store.
    ledger: Arc<dyn StageLedger>,
    /// Event sink.
    audit: Arc<dyn HarnessAuditSink>,
    /// Operator skip overrides.
    overrides: SkipOverrides,
}

impl StageRunner {
    /// Creates a stage runner.
    #[must_use]
    pub fn new(
        ledger: Arc<dyn StageLedger>,
        audit: Arc<dyn HarnessAuditSink>,
        overrides: SkipOverrides,
    ) -> Self {
        Self {
            ledger,
            audit,
            overrides,
        }
    }

    /// Runs `body` unless `stage` is already complete or overridden.
    ///
    /// # Errors
    ///
    /// Returns [`StageError`] when the body fails or the ledger cannot be
    /// read or written. A failed body never writes a marker.
    pub fn run_stage<F>(
        &self,
        ctx: StageContext<'_>,
        stage: Stage,
        body: F,
    ) -> Result<StageOutcome, StageError>
    where
        F: FnOnce() -> Result<(), StageFault>,
    {
        if self.overrides.skips(stage) {
            return Ok(self.skipped(ctx, stage, SkipReason::OperatorOverride));
        }
        let complete = self.ledger.is_complete(ctx.working_dir, stage).map_err(|err| {
            StageError {
                stage,
                fault: err.into(),
            }
        })?;
        if complete {
            return Ok(self.skipped(ctx, stage, SkipReason::AlreadyComplete));
        }

        self.record(ctx, stage, StageAuditStatus::Started, None, None);
        let started = Instant::now();
        let result = body().and_then(|()| {
            self.ledger.mark_complete(ctx.working_dir, stage).map_err(StageFault::from)
        });
        let elapsed = Some(started.elapsed().as_millis());
        match result {
            Ok(()) => {
                self.record(ctx, stage, StageAuditStatus::Completed, None, elapsed);
                Ok(StageOutcome::Ran)
            }
            Err(fault) => {
                self.record(ctx, stage, StageAuditStatus::Failed, Some(fault.to_string()), elapsed);
                Err(StageError {
                    stage,
                    fault,
                })
            }
        }
    }

    /// Records a skip and returns the matching outcome.
    fn skipped(&self, ctx: StageContext<'_>, stage: Stage, reason: SkipReason) -> StageOutcome {
        self.record(ctx, stage, StageAuditStatus::Skipped, Some(reason.as_str().to_string()), None);
        StageOutcome::Skipped(reason)
    }

    /// Emits a stage audit event.
    fn record(
        &self,
        ctx: StageContext<'_>,
        stage: Stage,
        status: StageAuditStatus,
        detail: Option<String>,
        duration_ms: Option<u128>,
    ) {
        self.audit.record_stage(&StageAuditEvent::new(StageAuditEventParams {
            case: ctx.case.to_string(),
            stage,
            working_dir: ctx.working_dir.display().to_string(),
            status,
            detail,
            duration_ms,
        }));
    }
}
