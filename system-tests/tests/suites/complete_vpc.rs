// system-tests/tests/suites/complete_vpc.rs
// ============================================================================
// Module: Complete VPC Tests
// Description: Live run of the built-in complete-vpc case.
// Purpose: Check a clean apply, an empty re-plan, and the output table.
// Dependencies: system-tests helpers, tfstage-core, tfstage-terraform
// ============================================================================

//! Live `complete-vpc` coverage for tfstage system-tests.

use std::error::Error;

use helpers::artifacts::RunArtifacts;
use helpers::artifacts::Verdict;
use helpers::harness::live_lifecycle;
use helpers::harness::live_suite;
use system_tests::SystemTestEnv;
use system_tests::SystemTestSettings;
use tfstage_core::Stage;
use tfstage_core::StageLedger;
use tfstage_core::StageStatus;
use tfstage_core::run_suite;
use tfstage_terraform::FileStageLedger;

use crate::helpers;

/// Returns an error carrying `message` unless `condition` holds.
fn ensure(condition: bool, message: impl Into<String>) -> Result<(), Box<dyn Error>> {
    if condition { Ok(()) } else { Err(message.into().into()) }
}

#[test]
fn complete_vpc_passes_every_stage() -> Result<(), Box<dyn Error>> {
    let settings = SystemTestSettings::from_env()?;
    let mut artifacts = RunArtifacts::open("complete_vpc_passes_every_stage", &settings)?;
    let Some(module_root) = settings.module_root.clone() else {
        artifacts.skip(format!("{} not set", SystemTestEnv::ModuleRoot.var()))?;
        return Ok(());
    };
    let suite = live_suite(&settings, &module_root, &artifacts)?;
    let lifecycle = live_lifecycle(&suite)?;

    let report = run_suite(&lifecycle, &suite.cases, &suite.outputs);
    let case = report.cases.first().cloned().ok_or("suite report has no cases")?;
    let verdict = artifacts.record_suite(report)?;
    artifacts.close(verdict)?;

    for stage in Stage::ALL {
        let status = serde_json::to_string(&case.stage(stage))?;
        ensure(case.stage(stage) == Some(&StageStatus::Ran), format!("{stage} did not run cleanly: {status}"))?;
    }
    let outputs = case.outputs.as_ref().ok_or("missing output report")?;
    ensure(outputs.checks.len() == suite.outputs.len(), "output checks do not cover the table")?;
    for check in &outputs.checks {
        let status = serde_json::to_string(check)?;
        ensure(check.passed(), format!("{} failed: {status}", check.output_variable))?;
    }
    let workdir = case.working_dir.as_ref().ok_or("missing working dir")?;
    ensure(workdir.starts_with(artifacts.workspaces_dir()?), "working copy is outside the run directory")?;
    for stage in Stage::ALL {
        ensure(FileStageLedger.is_complete(workdir, stage)?, format!("{stage} marker missing"))?;
    }
    ensure(verdict == Verdict::Pass, "suite verdict is not pass")
}
