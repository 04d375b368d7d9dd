// crates/tfstage-config/src/env.rs
// ============================================================================
// Module: tfstage Environment Overrides
// Description: Environment-backed overrides for suite configuration.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed strictly: invalid UTF-8 and set-but-blank
//! values fail closed instead of silently falling back to file values.

use crate::config::ConfigError;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys read by tfstage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Config file path.
    ConfigPath,
    /// Terraform binary override.
    TerraformBin,
    /// Parent directory for temporary working copies.
    RunRoot,
    /// JSON-line event log file.
    EventLog,
    /// Module root copied for every case (replaces `rootFolder`).
    ModuleRoot,
}

impl HarnessEnv {
    /// All keys that feed [`EnvOverrides`].
    pub const OVERRIDES: [Self; 4] = [Self::TerraformBin, Self::RunRoot, Self::EventLog, Self::ModuleRoot];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigPath => "TFSTAGE_CONFIG",
            Self::TerraformBin => "TFSTAGE_TERRAFORM_BIN",
            Self::RunRoot => "TFSTAGE_RUN_ROOT",
            Self::EventLog => "TFSTAGE_EVENT_LOG",
            Self::ModuleRoot => "TFSTAGE_MODULE_ROOT",
        }
    }
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Overrides read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// Terraform binary.
    pub terraform_bin: Option<String>,
    /// Run root for working copies.
    pub run_root: Option<String>,
    /// Event log file.
    pub event_log: Option<String>,
    /// Module root for every case.
    pub module_root: Option<String>,
}

impl EnvOverrides {
    /// Loads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is not valid UTF-8 or is
    /// set but blank.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_reader(read_env_strict)
    }

    /// Loads overrides through `read`, which returns the raw value of a
    /// variable or an error message.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `read` fails or a value is blank.
    pub fn from_reader(
        read: impl Fn(&str) -> Result<Option<String>, String>,
    ) -> Result<Self, ConfigError> {
        let read_nonempty = |key: HarnessEnv| -> Result<Option<String>, ConfigError> {
            let name = key.as_str();
            match read(name).map_err(ConfigError::Invalid)? {
                Some(value) if value.trim().is_empty() => {
                    Err(ConfigError::Invalid(format!("{name} must not be empty")))
                }
                other => Ok(other),
            }
        };
        Ok(Self {
            terraform_bin: read_nonempty(HarnessEnv::TerraformBin)?,
            run_root: read_nonempty(HarnessEnv::RunRoot)?,
            event_log: read_nonempty(HarnessEnv::EventLog)?,
            module_root: read_nonempty(HarnessEnv::ModuleRoot)?,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}
