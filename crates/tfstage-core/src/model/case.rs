// crates/tfstage-core/src/model/case.rs
// ============================================================================
// Module: tfstage Test Cases
// Description: Table rows that each drive one isolated harness run.
// Purpose: Carry case name, target region, and module location values.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! A [`TestCase`] names the module to copy (`rootFolder` plus
//! `exampleFolderPath`) and the region whose `fixtures.<region>.tfvars` file is
//! handed to the tool. Rows are immutable and validated before any copy.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Component;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::model::identifiers::CaseName;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Value key naming the folder copied into the working directory.
pub const ROOT_FOLDER_KEY: &str = "rootFolder";
/// Value key naming the module path relative to the root folder.
pub const EXAMPLE_FOLDER_KEY: &str = "exampleFolderPath";

// ============================================================================
// SECTION: Types
// ============================================================================

/// One row of the case table.
///
/// # Invariants
/// - `values` contains [`ROOT_FOLDER_KEY`] and [`EXAMPLE_FOLDER_KEY`] once validated.
/// - `region` is a lowercase token usable inside a file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Case name, also the report and sub-test label.
    pub name: CaseName,
    /// Target region for the provisioned stack.
    pub region: String,
    /// Free-form case values; must include the module location keys.
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

/// Test case validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TestCaseError {
    /// The case name is empty.
    #[error("test case name must not be empty")]
    EmptyName,
    /// The region is empty or contains characters unusable in a file name.
    #[error("test case {case} has invalid region {region:?}")]
    InvalidRegion {
        /// Offending case.
        case: String,
        /// Offending region value.
        region: String,
    },
    /// A required value key is missing or blank.
    #[error("test case {case} is missing value {key}")]
    MissingValue {
        /// Offending case.
        case: String,
        /// Missing key.
        key: &'static str,
    },
    /// The example folder is absolute or climbs out of the root folder.
    #[error("test case {case} has example folder {path} outside the root folder")]
    ExampleFolderOutsideRoot {
        /// Offending case.
        case: String,
        /// Offending `exampleFolderPath` value.
        path: String,
    },
}

impl TestCase {
    /// Creates a test case from its parts.
    #[must_use]
    pub fn new(
        name: impl Into<CaseName>,
        region: impl Into<String>,
        values: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            values,
        }
    }

    /// Returns the folder copied into the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`TestCaseError::MissingValue`] when `rootFolder` is absent.
    pub fn root_folder(&self) -> Result<&str, TestCaseError> {
        self.required_value(ROOT_FOLDER_KEY)
    }

    /// Returns the module path relative to the root folder.
    ///
    /// # Errors
    ///
    /// Returns [`TestCaseError::MissingValue`] when `exampleFolderPath` is absent
    /// and [`TestCaseError::ExampleFolderOutsideRoot`] when it is absolute or
    /// contains `..`.
    pub fn example_folder_path(&self) -> Result<&str, TestCaseError> {
        let path = self.required_value(EXAMPLE_FOLDER_KEY)?;
        if !is_contained_relative(path) {
            return Err(TestCaseError::ExampleFolderOutsideRoot {
                case: self.name.to_string(),
                path: path.to_string(),
            });
        }
        Ok(path)
    }

    /// Returns the region-specific variable file name.
    #[must_use]
    pub fn var_file(&self) -> String {
        format!("fixtures.{}.tfvars", self.region)
    }

    /// Validates the row before it is used to stage a module.
    ///
    /// # Errors
    ///
    /// Returns [`TestCaseError`] when the name, region, or required values are invalid.
    pub fn validate(&self) -> Result<(), TestCaseError> {
        if self.name.as_str().trim().is_empty() {
            return Err(TestCaseError::EmptyName);
        }
        let region_ok = !self.region.is_empty()
            && self
                .region
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-');
        if !region_ok {
            return Err(TestCaseError::InvalidRegion {
                case: self.name.to_string(),
                region: self.region.clone(),
            });
        }
        self.root_folder()?;
        self.example_folder_path()?;
        Ok(())
    }

    /// Looks up a required, non-blank value.
    fn required_value(&self, key: &'static str) -> Result<&str, TestCaseError> {
        match self.values.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value.as_str()),
            _ => Err(TestCaseError::MissingValue {
                case: self.name.to_string(),
                key,
            }),
        }
    }
}

/// Returns true when `path` stays below whatever directory it is joined onto.
#[must_use]
pub fn is_contained_relative(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}
