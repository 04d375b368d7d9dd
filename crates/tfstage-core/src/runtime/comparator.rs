// crates/tfstage-core/src/runtime/comparator.rs
// ============================================================================
// Module: tfstage Output Comparator
// Description: Comparison modes for rendered output values.
// Purpose: Decide whether a live output satisfies its expectation.
// Dependencies: crate::model
// ============================================================================

//! ## Overview
//! Comparisons are exact and case-sensitive over the rendered output string.
//! For `empty` the expected value is only echoed in the failure message; for
//! `notempty` it is ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::model::AssertType;

// ============================================================================
// SECTION: Outcome
// ============================================================================

/// Result of comparing one output against its expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssertionOutcome {
    /// The output satisfies the expectation.
    Passed,
    /// The output does not satisfy the expectation.
    Failed {
        /// Human-readable mismatch description.
        message: String,
    },
}

impl AssertionOutcome {
    /// Returns true when the comparison passed.
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Compares `actual` against `expected` using `assert_type`.
#[must_use]
pub fn evaluate_assertion(assert_type: AssertType, expected: &str, actual: &str) -> AssertionOutcome {
    let passed = match assert_type {
        AssertType::Equal => actual == expected,
        AssertType::Empty => actual.is_empty(),
        AssertType::NotEmpty => !actual.is_empty(),
        AssertType::Contains => actual.contains(expected),
    };
    if passed {
        return AssertionOutcome::Passed;
    }
    let message = match assert_type {
        AssertType::Equal => format!("expected '{expected}', got '{actual}'"),
        AssertType::Empty if expected.is_empty() => format!("expected empty value, got '{actual}'"),
        AssertType::Empty => format!("{expected}: expected empty value, got '{actual}'"),
        AssertType::NotEmpty => "expected a non-empty value".to_string(),
        AssertType::Contains => format!("expected '{actual}' to contain '{expected}'"),
    };
    AssertionOutcome::Failed {
        message,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
