// crates/tfstage-core/src/runtime/assertions.rs
// ============================================================================
// Module: tfstage Output Assertion Engine
// Description: Fetches declared outputs and checks them against expectations.
// Purpose: Report every output check independently.
// Dependencies: crate::{audit, interfaces, model, runtime::comparator}, serde
// ============================================================================

//! ## Overview
//! [`OutputAssertionEngine::validate`] walks the expectation table in order.
//! Each row is its own named sub-check: a fetch error or a mismatch is
//! recorded for that row and the walk continues with the next one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde::Serialize;

use crate::audit::HarnessAuditSink;
use crate::audit::OutputAuditEvent;
use crate::audit::OutputAuditEventParams;
use crate::audit::OutputAuditStatus;
use crate::interfaces::InfraTool;
use crate::model::AssertType;
use crate::model::CaseName;
use crate::model::OutputExpectation;
use crate::model::ProvisioningOptions;
use crate::runtime::comparator::AssertionOutcome;
use crate::runtime::comparator::evaluate_assertion;

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Result of one output sub-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutputCheckStatus {
    /// The output satisfied its expectation.
    Passed,
    /// The output was read but did not satisfy its expectation.
    Mismatch {
        /// Mismatch description.
        message: String,
    },
    /// The output could not be read.
    FetchFailed {
        /// Tool error message.
        message: String,
    },
}

/// One named output sub-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputCheck {
    /// Output name, also the sub-check name.
    pub output_variable: String,
    /// Comparison applied.
    pub assert_type: AssertType,
    /// Check result.
    #[serde(flatten)]
    pub status: OutputCheckStatus,
}

impl OutputCheck {
    /// Returns true when the check passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        matches!(self.status, OutputCheckStatus::Passed)
    }
}

/// All sub-check results for one case, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OutputReport {
    /// Sub-check results.
    pub checks: Vec<OutputCheck>,
}

impl OutputReport {
    /// Returns the number of failed checks.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.checks.iter().filter(|check| !check.passed()).count()
    }

    /// Returns true when every check passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }

    /// Returns the check for `output_variable`, if present.
    #[must_use]
    pub fn check(&self, output_variable: &str) -> Option<&OutputCheck> {
        self.checks.iter().find(|check| check.output_variable == output_variable)
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Checks live outputs against an expectation table.
#[derive(Clone)]
pub struct OutputAssertionEngine {
    /// Tool used to read outputs.
    tool: Arc<dyn InfraTool>,
    /// Event sink.
    audit: Arc<dyn HarnessAuditSink>,
}

impl OutputAssertionEngine {
    /// Creates an engine over a tool and an event sink.
    #[must_use]
    pub fn new(tool: Arc<dyn InfraTool>, audit: Arc<dyn HarnessAuditSink>) -> Self {
        Self {
            tool,
            audit,
        }
    }

    /// Runs every expectation sequentially and reports each one.
    #[must_use]
    pub fn validate(
        &self,
        case: &CaseName,
        options: &ProvisioningOptions,
        expectations: &[OutputExpectation],
    ) -> OutputReport {
        let checks = expectations
            .iter()
            .map(|expectation| {
                let check = self.check_one(options, expectation);
                self.record(case, &check);
                check
            })
            .collect();
        OutputReport {
            checks,
        }
    }

    /// Fetches and compares a single output.
    fn check_one(&self, options: &ProvisioningOptions, expectation: &OutputExpectation) -> OutputCheck {
        let status = match self.tool.output(options, &expectation.output_variable) {
            Err(err) => OutputCheckStatus::FetchFailed {
                message: err.to_string(),
            },
            Ok(actual) => match evaluate_assertion(
                expectation.assert_type,
                &expectation.expected_value,
                &actual,
            ) {
                AssertionOutcome::Passed => OutputCheckStatus::Passed,
                AssertionOutcome::Failed {
                    message,
                } => OutputCheckStatus::Mismatch {
                    message,
                },
            },
        };
        OutputCheck {
            output_variable: expectation.output_variable.clone(),
            assert_type: expectation.assert_type,
            status,
        }
    }

    /// Emits an output audit event for a finished check.
    fn record(&self, case: &CaseName, check: &OutputCheck) {
        let (status, detail) = match &check.status {
            OutputCheckStatus::Passed => (OutputAuditStatus::Passed, None),
            OutputCheckStatus::Mismatch {
                message,
            } => (OutputAuditStatus::Mismatch, Some(message.clone())),
            OutputCheckStatus::FetchFailed {
                message,
            } => (OutputAuditStatus::FetchFailed, Some(message.clone())),
        };
        self.audit.record_output(&OutputAuditEvent::new(OutputAuditEventParams {
            case: case.to_string(),
            output_variable: check.output_variable.clone(),
            assert_type: check.assert_type,
            status,
            detail,
        }));
    }
}
