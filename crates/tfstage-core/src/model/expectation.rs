// crates/tfstage-core/src/model/expectation.rs
// ============================================================================
// Module: tfstage Output Expectations
// Description: Declarative (output, expected value, comparison) triples.
// Purpose: Describe what a provisioned stack must expose after apply.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Expectations are consumed in table order, though order never affects the
//! verdict. The comparison tag is parsed case-insensitively; an unrecognized
//! tag is rejected when the table is built so malformed rows cannot pass
//! silently.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Assert Type
// ============================================================================

/// Comparison applied between the live output and the expected value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AssertType {
    /// Actual value equals the expected string byte-for-byte.
    Equal,
    /// Actual value is the empty string; the expected value is only a message.
    Empty,
    /// Actual value is non-empty; the expected value is ignored.
    NotEmpty,
    /// Actual value contains the expected string.
    Contains,
}

impl AssertType {
    /// Returns the canonical lowercase tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::Empty => "empty",
            Self::NotEmpty => "notempty",
            Self::Contains => "contains",
        }
    }
}

impl fmt::Display for AssertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognized comparison tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown assert type: {0:?}")]
pub struct AssertTypeError(pub String);

impl FromStr for AssertType {
    type Err = AssertTypeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.to_ascii_lowercase().as_str() {
            "equal" => Ok(Self::Equal),
            "empty" => Ok(Self::Empty),
            "notempty" => Ok(Self::NotEmpty),
            "contains" => Ok(Self::Contains),
            _ => Err(AssertTypeError(tag.to_string())),
        }
    }
}

impl TryFrom<String> for AssertType {
    type Error = AssertTypeError;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

impl From<AssertType> for String {
    fn from(value: AssertType) -> Self {
        value.as_str().to_string()
    }
}

// ============================================================================
// SECTION: Output Expectation
// ============================================================================

/// One row of the expectation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputExpectation {
    /// Output name exposed by the provisioned stack.
    pub output_variable: String,
    /// Expected value (meaning depends on `assert_type`).
    #[serde(default)]
    pub expected_value: String,
    /// Comparison to apply.
    pub assert_type: AssertType,
}

impl OutputExpectation {
    /// Creates an expectation row.
    #[must_use]
    pub fn new(
        output_variable: impl Into<String>,
        expected_value: impl Into<String>,
        assert_type: AssertType,
    ) -> Self {
        Self {
            output_variable: output_variable.into(),
            expected_value: expected_value.into(),
            assert_type,
        }
    }

    /// Creates an expectation row from a raw comparison tag.
    ///
    /// # Errors
    ///
    /// Returns [`AssertTypeError`] when the tag is not recognized.
    pub fn from_tag(
        output_variable: impl Into<String>,
        expected_value: impl Into<String>,
        tag: &str,
    ) -> Result<Self, AssertTypeError> {
        Ok(Self::new(output_variable, expected_value, tag.parse()?))
    }
}
