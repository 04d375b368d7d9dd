// crates/tfstage-core/src/model/identifiers.rs
// ============================================================================
// Module: tfstage Identifiers
// Description: Typed names for test cases and lifecycle stages.
// Purpose: Keep stage and case names stable across markers, logs, and reports.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Stage names double as on-disk marker names and as the suffix of the
//! `SKIP_<stage>` operator override, so their string forms are stable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Case Name
// ============================================================================

/// Name of a test case row.
///
/// # Invariants
/// - Opaque UTF-8 string; emptiness is rejected by [`crate::TestCase::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaseName(String);

impl CaseName {
    /// Creates a new case name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CaseName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ============================================================================
// SECTION: Stage
// ============================================================================

/// Lifecycle stage of a single test case.
///
/// # Invariants
/// - Declaration order is the execution order.
/// - [`Stage::as_str`] values are stable marker and override names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Init and apply the working copy.
    Apply,
    /// Re-plan and require an empty diff.
    Plan,
    /// Fetch outputs and check them against the expectation table.
    OutputsValidation,
    /// Tear down everything the case provisioned.
    Destroy,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Self; 4] = [Self::Apply, Self::Plan, Self::OutputsValidation, Self::Destroy];

    /// Returns the canonical stage name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apply => "apply",
            Self::Plan => "plan",
            Self::OutputsValidation => "outputs_validation",
            Self::Destroy => "destroy",
        }
    }

    /// Returns the environment variable that forces this stage to be skipped.
    #[must_use]
    pub fn skip_env_var(self) -> String {
        format!("SKIP_{}", self.as_str())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stage name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stage: {0}")]
pub struct StageParseError(pub String);

impl FromStr for Stage {
    type Err = StageParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| StageParseError(value.to_string()))
    }
}
