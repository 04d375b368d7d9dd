// crates/tfstage-core/src/runtime/lifecycle.rs
// ============================================================================
// Module: tfstage Case Lifecycle
// Description: Copy, apply, plan, outputs, and guaranteed destroy per case.
// Purpose: Drive one test case through its stages in a fixed order.
// Dependencies: crate::{audit, interfaces, model, runtime}, serde
// ============================================================================

//! ## Overview
//! A case runs in a fixed order: copy the module to a temporary working
//! directory, `apply`, `plan` (asserting no drift), `outputs_validation`,
//! and finally `destroy`. Once the working directory exists a
//! [`DestroyGuard`] is armed; it runs `destroy` exactly once on every exit
//! path, including unwinding after a panic.
//!
//! Each stage is also exposed on its own so an operator can drive stages as
//! separate steps against an existing working directory.
//!
//! Failure handling:
//! - `apply` failure stops `plan` and `outputs_validation`.
//! - Plan drift is an assertion failure; `outputs_validation` still runs.
//! - A `plan` tool error stops `outputs_validation`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::audit::HarnessAuditSink;
use crate::interfaces::InfraTool;
use crate::interfaces::ModuleStager;
use crate::interfaces::OptionsStore;
use crate::interfaces::StageLedger;
use crate::model::CaseName;
use crate::model::OutputExpectation;
use crate::model::ProvisioningOptions;
use crate::model::RetryPolicy;
use crate::model::Stage;
use crate::model::TestCase;
use crate::runtime::assertions::OutputAssertionEngine;
use crate::runtime::assertions::OutputReport;
use crate::runtime::stage::SkipOverrides;
use crate::runtime::stage::SkipReason;
use crate::runtime::stage::StageContext;
use crate::runtime::stage::StageError;
use crate::runtime::stage::StageFault;
use crate::runtime::stage::StageOutcome;
use crate::runtime::stage::StageRunner;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Text a plan must contain to count as drift-free.
pub const DEFAULT_NO_CHANGES_MARKER: &str = "No changes.";

// ============================================================================
// SECTION: Services and Settings
// ============================================================================

/// External collaborators a case lifecycle depends on.
#[derive(Clone)]
pub struct HarnessServices {
    /// Infrastructure tool driver.
    pub tool: Arc<dyn InfraTool>,
    /// Module copier.
    pub stager: Arc<dyn ModuleStager>,
    /// Stage completion markers.
    pub ledger: Arc<dyn StageLedger>,
    /// Persisted provisioning options.
    pub options_store: Arc<dyn OptionsStore>,
    /// Event sink.
    pub audit: Arc<dyn HarnessAuditSink>,
    /// Operator stage overrides.
    pub skip: SkipOverrides,
}

/// Per-suite settings used to build each case's provisioning options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseSettings {
    /// Disable colored tool output.
    pub no_color: bool,
    /// Upgrade modules and providers during init.
    pub upgrade: bool,
    /// Retry policy for every tool invocation.
    pub retry: RetryPolicy,
    /// Inline variables passed to apply, plan, and destroy.
    pub vars: BTreeMap<String, String>,
    /// Extra environment for the tool process.
    pub env_vars: BTreeMap<String, String>,
    /// Text a drift-free plan must contain.
    pub no_changes_marker: String,
    /// Base directory relative `rootFolder` values are resolved against.
    pub module_base: Option<PathBuf>,
}

impl Default for CaseSettings {
    fn default() -> Self {
        Self {
            no_color: true,
            upgrade: false,
            retry: RetryPolicy::with_default_retryable_errors(),
            vars: BTreeMap::new(),
            env_vars: BTreeMap::new(),
            no_changes_marker: DEFAULT_NO_CHANGES_MARKER.to_string(),
            module_base: None,
        }
    }
}

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Reported status of one stage within a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    /// The stage body ran and succeeded.
    Ran,
    /// The stage body did not run.
    Skipped {
        /// Why the stage was skipped.
        reason: SkipReason,
    },
    /// The stage failed.
    Failed {
        /// Failure message.
        message: String,
        /// True for assertion failures (drift or output mismatches).
        assertion: bool,
    },
    /// The stage was not attempted because an earlier stage failed.
    NotRun,
}

/// One stage entry of a [`CaseReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageRecord {
    /// Stage name.
    pub stage: Stage,
    /// Stage status.
    #[serde(flatten)]
    pub status: StageStatus,
}

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseReport {
    /// Test case name.
    pub case: CaseName,
    /// Temporary working directory, once created.
    pub working_dir: Option<PathBuf>,
    /// Failure before any stage ran (invalid case, copy failure, panic).
    pub setup_error: Option<String>,
    /// Stage statuses in execution order.
    pub stages: Vec<StageRecord>,
    /// Output sub-check results when `outputs_validation` ran.
    pub outputs: Option<OutputReport>,
}

impl CaseReport {
    /// Creates an empty report for a case.
    #[must_use]
    pub const fn new(case: CaseName) -> Self {
        Self {
            case,
            working_dir: None,
            setup_error: None,
            stages: Vec::new(),
            outputs: None,
        }
    }

    /// Creates a report for a case whose setup failed.
    #[must_use]
    pub fn setup_failed(case: CaseName, message: impl Into<String>) -> Self {
        let mut report = Self::new(case);
        report.setup_error = Some(message.into());
        for stage in Stage::ALL {
            report.push(stage, StageStatus::NotRun);
        }
        report
    }

    /// Returns the status recorded for `stage`.
    #[must_use]
    pub fn stage(&self, stage: Stage) -> Option<&StageStatus> {
        self.stages.iter().find(|record| record.stage == stage).map(|record| &record.status)
    }

    /// Returns true when setup succeeded and no stage failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.setup_error.is_none()
            && self.stages.iter().all(|record| !matches!(record.status, StageStatus::Failed { .. }))
    }

    /// Appends a stage status.
    fn push(&mut self, stage: Stage, status: StageStatus) {
        self.stages.push(StageRecord {
            stage,
            status,
        });
    }

    /// Appends the status derived from a stage result.
    fn record(&mut self, stage: Stage, result: &Result<StageOutcome, StageError>) {
        let status = match result {
            Ok(StageOutcome::Ran) => StageStatus::Ran,
            Ok(StageOutcome::Skipped(reason)) => StageStatus::Skipped {
                reason: *reason,
            },
            Err(err) => StageStatus::Failed {
                message: err.fault.to_string(),
                assertion: err.fault.is_assertion(),
            },
        };
        self.push(stage, status);
    }
}

/// Result of the `outputs_validation` stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputsStage {
    /// Stage result.
    pub result: Result<StageOutcome, StageError>,
    /// Sub-check results when the stage body ran far enough to check outputs.
    pub report: Option<OutputReport>,
}

// ============================================================================
// SECTION: Lifecycle
// ============================================================================

/// Drives test cases through their stages.
#[derive(Clone)]
pub struct CaseLifecycle {
    /// External collaborators.
    services: HarnessServices,
    /// Options template.
    settings: CaseSettings,
    /// Skip-if-complete stage executor.
    runner: StageRunner,
    /// Output checker.
    engine: OutputAssertionEngine,
}

impl CaseLifecycle {
    /// Creates a lifecycle over the given services and settings.
    #[must_use]
    pub fn new(services: HarnessServices, settings: CaseSettings) -> Self {
        let runner = StageRunner::new(
            Arc::clone(&services.ledger),
            Arc::clone(&services.audit),
            services.skip.clone(),
        );
        let engine = OutputAssertionEngine::new(Arc::clone(&services.tool), Arc::clone(&services.audit));
        Self {
            services,
            settings,
            runner,
            engine,
        }
    }

    /// Returns the settings used to build provisioning options.
    #[must_use]
    pub const fn settings(&self) -> &CaseSettings {
        &self.settings
    }

    /// Validates the case, copies its module, and builds its options.
    ///
    /// # Errors
    ///
    /// Returns [`StageFault::Case`] for an invalid case row or
    /// [`StageFault::Tool`] when the copy fails.
    pub fn prepare(&self, case: &TestCase) -> Result<ProvisioningOptions, StageFault> {
        case.validate()?;
        let root_folder = self.resolve_root(case.root_folder()?);
        let working_dir = self.services.stager.copy_module_to_temp(
            &case.name,
            &root_folder,
            case.example_folder_path()?,
        )?;
        Ok(self.build_options(case, working_dir))
    }

    /// Builds provisioning options for a case in `working_dir`.
    #[must_use]
    pub fn build_options(&self, case: &TestCase, working_dir: PathBuf) -> ProvisioningOptions {
        ProvisioningOptions {
            working_dir,
            var_files: vec![case.var_file()],
            vars: self.settings.vars.clone(),
            env_vars: self.settings.env_vars.clone(),
            no_color: self.settings.no_color,
            upgrade: self.settings.upgrade,
            retry: self.settings.retry.clone(),
        }
    }

    /// Loads the options a previous `apply` persisted for `working_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`StageFault::Store`] when nothing usable was saved.
    pub fn load_options(&self, working_dir: &Path) -> Result<ProvisioningOptions, StageFault> {
        Ok(self.services.options_store.load(working_dir)?)
    }

    /// Runs the `apply` stage: init and apply, then persist options.
    ///
    /// # Errors
    ///
    /// Returns [`StageError`] when the tool or the options store fails.
    pub fn apply(
        &self,
        case: &CaseName,
        options: &ProvisioningOptions,
    ) -> Result<StageOutcome, StageError> {
        let ctx = StageContext {
            case,
            working_dir: &options.working_dir,
        };
        self.runner.run_stage(ctx, Stage::Apply, || {
            self.services.tool.init_and_apply(options)?;
            self.services.options_store.save(&options.working_dir, options)?;
            Ok(())
        })
    }

    /// Runs the `plan` stage: reload options, plan, and assert no drift.
    ///
    /// # Errors
    ///
    /// Returns [`StageError`] on tool failure or when the plan reports changes.
    pub fn plan(&self, case: &CaseName, working_dir: &Path) -> Result<StageOutcome, StageError> {
        let ctx = StageContext {
            case,
            working_dir,
        };
        self.runner.run_stage(ctx, Stage::Plan, || {
            let options = self.load_options(working_dir)?;
            let plan = self.services.tool.plan(&options)?;
            if plan.contains(&self.settings.no_changes_marker) {
                Ok(())
            } else {
                Err(StageFault::PlanDrift {
                    marker: self.settings.no_changes_marker.clone(),
                })
            }
        })
    }

    /// Runs the `outputs_validation` stage over an expectation table.
    #[must_use]
    pub fn outputs(
        &self,
        case: &CaseName,
        working_dir: &Path,
        expectations: &[OutputExpectation],
    ) -> OutputsStage {
        let ctx = StageContext {
            case,
            working_dir,
        };
        let mut report = None;
        let result = self.runner.run_stage(ctx, Stage::OutputsValidation, || {
            let options = self.load_options(working_dir)?;
            let checked = self.engine.validate(case, &options, expectations);
            let failed = checked.failed();
            let total = checked.checks.len();
            report = Some(checked);
            if failed == 0 {
                Ok(())
            } else {
                Err(StageFault::OutputChecks {
                    failed,
                    total,
                })
            }
        });
        OutputsStage {
            result,
            report,
        }
    }

    /// Runs the `destroy` stage with the given options.
    ///
    /// # Errors
    ///
    /// Returns [`StageError`] when the tool fails to destroy.
    pub fn destroy(
        &self,
        case: &CaseName,
        options: &ProvisioningOptions,
    ) -> Result<StageOutcome, StageError> {
        let ctx = StageContext {
            case,
            working_dir: &options.working_dir,
        };
        self.runner.run_stage(ctx, Stage::Destroy, || {
            self.services.tool.destroy(options)?;
            Ok(())
        })
    }

    /// Runs a whole case and reports every stage.
    #[must_use]
    pub fn run(&self, case: &TestCase, expectations: &[OutputExpectation]) -> CaseReport {
        let options = match self.prepare(case) {
            Ok(options) => options,
            Err(fault) => return CaseReport::setup_failed(case.name.clone(), fault.to_string()),
        };
        let mut report = CaseReport::new(case.name.clone());
        report.working_dir = Some(options.working_dir.clone());
        let guard = DestroyGuard::arm(self, &case.name, &options);

        let apply = self.apply(&case.name, &options);
        report.record(Stage::Apply, &apply);
        if apply.is_ok() {
            let plan = self.plan(&case.name, &options.working_dir);
            let continue_to_outputs = match &plan {
                Ok(_) => true,
                Err(err) => err.fault.is_assertion(),
            };
            report.record(Stage::Plan, &plan);
            if continue_to_outputs {
                let outputs = self.outputs(&case.name, &options.working_dir, expectations);
                report.record(Stage::OutputsValidation, &outputs.result);
                report.outputs = outputs.report;
            } else {
                report.push(Stage::OutputsValidation, StageStatus::NotRun);
            }
        } else {
            report.push(Stage::Plan, StageStatus::NotRun);
            report.push(Stage::OutputsValidation, StageStatus::NotRun);
        }

        let destroy = guard.finish();
        report.record(Stage::Destroy, &destroy);
        report
    }

    /// Resolves a relative `rootFolder` against the configured base.
    fn resolve_root(&self, root_folder: &str) -> PathBuf {
        let root = Path::new(root_folder);
        match &self.settings.module_base {
            Some(base) if root.is_relative() => base.join(root),
            _ => root.to_path_buf(),
        }
    }
}

// ============================================================================
// SECTION: Destroy Guard
// ============================================================================

/// Runs `destroy` exactly once, either explicitly or when dropped.
pub struct DestroyGuard<'a> {
    /// Lifecycle that owns the destroy stage.
    lifecycle: &'a CaseLifecycle,
    /// Case being torn down.
    case: &'a CaseName,
    /// Options for the destroy invocation.
    options: &'a ProvisioningOptions,
    /// False once destroy has been attempted.
    armed: bool,
}

impl<'a> DestroyGuard<'a> {
    /// Arms a guard for a working directory.
    #[must_use]
    pub const fn arm(
        lifecycle: &'a CaseLifecycle,
        case: &'a CaseName,
        options: &'a ProvisioningOptions,
    ) -> Self {
        Self {
            lifecycle,
            case,
            options,
            armed: true,
        }
    }

    /// Disarms the guard and runs destroy now.
    ///
    /// # Errors
    ///
    /// Returns [`StageError`] when the tool fails to destroy.
    pub fn finish(mut self) -> Result<StageOutcome, StageError> {
        self.armed = false;
        self.lifecycle.destroy(self.case, self.options)
    }
}

impl Drop for DestroyGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.armed = false;
            // The stage runner records the failure; there is no caller left to
            // hand the error to.
            let _ = self.lifecycle.destroy(self.case, self.options);
        }
    }
}
