// system-tests/src/settings.rs
// ============================================================================
// Module: Live Run Settings
// Description: `TFSTAGE_SYSTEM_TEST_*` settings for the live suites.
// Purpose: Say where the module checkout, binaries, and artifacts live.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Settings are parsed from a variable lookup, the same way stage skip
//! overrides are, so the parsing rules are tested without mutating the
//! process environment. Set values must be UTF-8 and non-blank. Only
//! `TFSTAGE_SYSTEM_TEST_MODULE_ROOT` decides whether live suites run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// SECTION: Variables
// ============================================================================

/// Variables read by the live suites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Parent of per-test artifact directories.
    RunRoot,
    /// Terraform binary for the live run.
    TerraformBin,
    /// Checkout of the module under test.
    ModuleRoot,
    /// Prebuilt `tfstage` binary for CLI suites.
    CliBin,
    /// Reuse an existing artifact directory.
    AllowOverwrite,
}

impl SystemTestEnv {
    /// Every variable, in documentation order.
    pub const ALL: [Self; 5] =
        [Self::RunRoot, Self::TerraformBin, Self::ModuleRoot, Self::CliBin, Self::AllowOverwrite];

    /// Returns the variable name.
    #[must_use]
    pub const fn var(self) -> &'static str {
        match self {
            Self::RunRoot => "TFSTAGE_SYSTEM_TEST_RUN_ROOT",
            Self::TerraformBin => "TFSTAGE_SYSTEM_TEST_TERRAFORM_BIN",
            Self::ModuleRoot => "TFSTAGE_SYSTEM_TEST_MODULE_ROOT",
            Self::CliBin => "TFSTAGE_SYSTEM_TEST_CLI_BIN",
            Self::AllowOverwrite => "TFSTAGE_SYSTEM_TEST_ALLOW_OVERWRITE",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Invalid live run settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    /// The value is not UTF-8.
    #[error("{0} must be valid UTF-8")]
    NotUtf8(&'static str),
    /// The value is set but blank.
    #[error("{0} must not be blank")]
    Blank(&'static str),
    /// The value is not a recognized flag.
    #[error("{name} must be 1, 0, true, or false, got '{value}'")]
    InvalidFlag {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
    },
    /// The module root is not a directory.
    #[error("{name} does not name a directory: {path}")]
    NotADirectory {
        /// Variable name.
        name: &'static str,
        /// Rejected path.
        path: String,
    },
}

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Parsed live run settings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestSettings {
    /// Parent of per-test artifact directories.
    pub run_root: Option<PathBuf>,
    /// Terraform binary override.
    pub terraform_bin: Option<String>,
    /// Module checkout; live suites skip when unset.
    pub module_root: Option<PathBuf>,
    /// Prebuilt `tfstage` binary override.
    pub cli_bin: Option<PathBuf>,
    /// Reuse an existing artifact directory under `run_root`.
    pub allow_overwrite: bool,
}

impl SystemTestSettings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when a set variable is invalid.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var_os(name))
    }

    /// Reads settings through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when a set variable is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Self, SettingsError> {
        let read = |key: SystemTestEnv| -> Result<Option<String>, SettingsError> {
            let name = key.var();
            let Some(raw) = lookup(name) else {
                return Ok(None);
            };
            let value = raw.into_string().map_err(|_| SettingsError::NotUtf8(name))?;
            if value.trim().is_empty() {
                return Err(SettingsError::Blank(name));
            }
            Ok(Some(value))
        };

        let module_root = read(SystemTestEnv::ModuleRoot)?.map(PathBuf::from);
        if let Some(root) = module_root.as_ref().filter(|root| !root.is_dir()) {
            return Err(SettingsError::NotADirectory {
                name: SystemTestEnv::ModuleRoot.var(),
                path: root.display().to_string(),
            });
        }
        let allow_overwrite = read(SystemTestEnv::AllowOverwrite)?
            .map(|value| parse_flag(SystemTestEnv::AllowOverwrite.var(), &value))
            .transpose()?
            .unwrap_or(false);
        Ok(Self {
            run_root: read(SystemTestEnv::RunRoot)?.map(PathBuf::from),
            terraform_bin: read(SystemTestEnv::TerraformBin)?,
            module_root,
            cli_bin: read(SystemTestEnv::CliBin)?.map(PathBuf::from),
            allow_overwrite,
        })
    }

    /// Returns the Terraform binary to drive.
    #[must_use]
    pub fn terraform_binary(&self) -> &str {
        self.terraform_bin.as_deref().unwrap_or("terraform")
    }
}

/// Parses a `1`/`0`/`true`/`false` flag.
fn parse_flag(name: &'static str, value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(SettingsError::InvalidFlag {
            name,
            value: value.to_string(),
        }),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
