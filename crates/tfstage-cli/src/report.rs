// crates/tfstage-cli/src/report.rs
// ============================================================================
// Module: tfstage Report Rendering
// Description: Plain-text rendering of case and suite reports.
// Purpose: Give operators a readable per-stage summary of each case.
// Dependencies: tfstage-core
// ============================================================================

//! ## Overview
//! One block per case: a header with the verdict and working copy, one line
//! per stage, and one line per failed output check. A final line counts
//! passed and failed cases.

use std::fmt::Write;

use tfstage_core::CaseReport;
use tfstage_core::OutputCheckStatus;
use tfstage_core::Stage;
use tfstage_core::StageStatus;
use tfstage_core::SuiteReport;

/// Renders a whole suite report.
#[must_use]
pub fn render_suite(report: &SuiteReport) -> String {
    let mut out = String::new();
    for case in &report.cases {
        out.push_str(&render_case(case));
    }
    let failed = report.failed_cases().len();
    let passed = report.cases.len() - failed;
    let _ = write!(out, "suite: {passed} passed, {failed} failed");
    out
}

/// Renders one case report, ending with a newline.
#[must_use]
pub fn render_case(report: &CaseReport) -> String {
    let mut out = String::new();
    let verdict = if report.is_success() { "PASS" } else { "FAIL" };
    let _ = write!(out, "case {}: {verdict}", report.case);
    if let Some(dir) = &report.working_dir {
        let _ = write!(out, " ({})", dir.display());
    }
    out.push('\n');
    if let Some(error) = &report.setup_error {
        let _ = writeln!(out, "  setup: {error}");
    }
    for record in &report.stages {
        let _ = writeln!(out, "  {}: {}", record.stage, stage_status_text(&record.status));
        if record.stage == Stage::OutputsValidation {
            render_checks(&mut out, report);
        }
    }
    out
}

/// Returns the one-line form of a stage status.
fn stage_status_text(status: &StageStatus) -> String {
    match status {
        StageStatus::Ran => "ran".to_string(),
        StageStatus::Skipped {
            reason,
        } => format!("skipped ({})", reason.as_str()),
        StageStatus::Failed {
            message,
            assertion: true,
        } => format!("assertion failed: {message}"),
        StageStatus::Failed {
            message,
            assertion: false,
        } => format!("error: {message}"),
        StageStatus::NotRun => "not run".to_string(),
    }
}

/// Appends one line per failed output check.
fn render_checks(out: &mut String, report: &CaseReport) {
    let Some(outputs) = &report.outputs else {
        return;
    };
    for check in &outputs.checks {
        match &check.status {
            OutputCheckStatus::Passed => {}
            OutputCheckStatus::Mismatch {
                message,
            }
            | OutputCheckStatus::FetchFailed {
                message,
            } => {
                let _ = writeln!(
                    out,
                    "    {} [{}]: {message}",
                    check.output_variable, check.assert_type
                );
            }
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
