// crates/tfstage-core/src/runtime/suite.rs
// ============================================================================
// Module: tfstage Suite Runner
// Description: Runs every case of a table concurrently.
// Purpose: One scoped thread per case; results reported in table order.
// Dependencies: crate::{model, runtime::lifecycle}, serde
// ============================================================================

//! ## Overview
//! Cases are independent: each owns its working directory, so they run on
//! their own scoped threads with no shared locks. A case thread that panics
//! is reported as a setup failure; its destroy guard has already run during
//! unwinding.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::thread;

use serde::Serialize;

use crate::model::OutputExpectation;
use crate::model::TestCase;
use crate::runtime::lifecycle::CaseLifecycle;
use crate::runtime::lifecycle::CaseReport;

// ============================================================================
// SECTION: Report
// ============================================================================

/// Outcome of a whole case table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    /// Per-case reports in table order.
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    /// Returns true when every case succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.cases.iter().all(CaseReport::is_success)
    }

    /// Returns the reports of failed cases.
    #[must_use]
    pub fn failed_cases(&self) -> Vec<&CaseReport> {
        self.cases.iter().filter(|report| !report.is_success()).collect()
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Runs every case concurrently and collects the reports.
#[must_use]
pub fn run_suite(
    lifecycle: &CaseLifecycle,
    cases: &[TestCase],
    expectations: &[OutputExpectation],
) -> SuiteReport {
    let cases = thread::scope(|scope| {
        let handles: Vec<_> = cases
            .iter()
            .map(|case| (case, scope.spawn(move || lifecycle.run(case, expectations))))
            .collect();
        handles
            .into_iter()
            .map(|(case, handle)| {
                handle.join().unwrap_or_else(|payload| {
                    CaseReport::setup_failed(
                        case.name.clone(),
                        format!("case panicked: {}", panic_message(payload.as_ref())),
                    )
                })
            })
            .collect()
    });
    SuiteReport {
        cases,
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string())
}
