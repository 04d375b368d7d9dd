// crates/tfstage-config/src/config.rs
// ============================================================================
// Module: tfstage Suite Configuration
// Description: Configuration loading and validation for tfstage suites.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: tfstage-core, regex, serde, toml
// ============================================================================

//! ## Overview
//! [`SuiteConfig::load`] resolves the config path (explicit path, then
//! `TFSTAGE_CONFIG`, then `tfstage.toml`), enforces size and UTF-8 limits,
//! parses TOML, and validates the result. Relative `rootFolder` values are
//! resolved against the directory holding the config file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use tfstage_core::CaseSettings;
use tfstage_core::DEFAULT_MAX_RETRIES;
use tfstage_core::DEFAULT_NO_CHANGES_MARKER;
use tfstage_core::DEFAULT_RETRYABLE_ERRORS;
use tfstage_core::DEFAULT_TIME_BETWEEN_RETRIES;
use tfstage_core::OutputExpectation;
use tfstage_core::ROOT_FOLDER_KEY;
use tfstage_core::RetryPolicy;
use tfstage_core::TestCase;
use thiserror::Error;

use crate::env::EnvOverrides;
use crate::env::HarnessEnv;
use crate::env::read_env_strict;

// ============================================================================
// SECTION: Limits and Defaults
// ============================================================================

/// Default config file name.
pub const DEFAULT_CONFIG_NAME: &str = "tfstage.toml";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default Terraform binary.
const DEFAULT_TERRAFORM_BINARY: &str = "terraform";

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Complete tfstage suite configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Terraform invocation settings.
    #[serde(default)]
    pub terraform: TerraformConfig,
    /// Retry policy for tool invocations.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Plan drift check settings.
    #[serde(default)]
    pub plan: PlanConfig,
    /// Working copy and event log locations.
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    /// Case table; one row per concurrent case.
    #[serde(default)]
    pub cases: Vec<TestCase>,
    /// Expectation table, checked in order for every case.
    #[serde(default)]
    pub outputs: Vec<OutputExpectation>,
    /// Directory relative `rootFolder` values resolve against (not serialized).
    #[serde(skip)]
    pub source_dir: Option<PathBuf>,
}

/// Terraform invocation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerraformConfig {
    /// Binary path or name resolved through `PATH`.
    pub binary: String,
    /// Pass `-no-color` to every verb.
    pub no_color: bool,
    /// Pass `-upgrade=true` to init.
    pub upgrade: bool,
    /// Inline variables passed as `-var key=value`.
    pub vars: BTreeMap<String, String>,
    /// Extra environment for the Terraform process.
    pub env: BTreeMap<String, String>,
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_TERRAFORM_BINARY.to_string(),
            no_color: true,
            upgrade: false,
            vars: BTreeMap::new(),
            env: BTreeMap::new(),
        }
    }
}

/// Retry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum retries after the first attempt.
    pub max_retries: u32,
    /// Pause between attempts in seconds.
    pub time_between_retries_secs: u64,
    /// Include the built-in transient error patterns.
    pub include_default_errors: bool,
    /// Extra retryable patterns mapped to descriptions.
    pub retryable_errors: BTreeMap<String, String>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            time_between_retries_secs: DEFAULT_TIME_BETWEEN_RETRIES.as_secs(),
            include_default_errors: true,
            retryable_errors: BTreeMap::new(),
        }
    }
}

impl RetryConfig {
    /// Builds the runtime retry policy.
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        let mut retryable_errors = BTreeMap::new();
        if self.include_default_errors {
            for (pattern, description) in DEFAULT_RETRYABLE_ERRORS {
                retryable_errors.insert((*pattern).to_string(), (*description).to_string());
            }
        }
        retryable_errors.extend(self.retryable_errors.clone());
        RetryPolicy {
            max_retries: self.max_retries,
            time_between_retries: Duration::from_secs(self.time_between_retries_secs),
            retryable_errors,
        }
    }

    /// Validates retry settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries > 0 && self.time_between_retries_secs == 0 {
            return Err(ConfigError::Invalid(
                "retry.time_between_retries_secs must be greater than zero when retries are enabled"
                    .to_string(),
            ));
        }
        for pattern in self.retryable_errors.keys() {
            Regex::new(pattern).map_err(|err| {
                ConfigError::Invalid(format!("retry.retryable_errors pattern '{pattern}': {err}"))
            })?;
        }
        Ok(())
    }
}

/// Plan drift check settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Text a drift-free plan must contain.
    pub no_changes_marker: String,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            no_changes_marker: DEFAULT_NO_CHANGES_MARKER.to_string(),
        }
    }
}

/// Working copy and event log locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Parent directory for temporary working copies (system temp by default).
    pub run_root: Option<String>,
    /// JSON-line event log file (stderr by default).
    pub event_log: Option<String>,
}

impl WorkspaceConfig {
    /// Validates configured paths.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(run_root) = &self.run_root {
            validate_path_string("workspace.run_root", run_root)?;
        }
        if let Some(event_log) = &self.event_log {
            validate_path_string("workspace.event_log", event_log)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Loading and Validation
// ============================================================================

impl SuiteConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        Self::load_resolved(&resolved.path)
    }

    /// Loads configuration like [`SuiteConfig::load`], falling back to the
    /// built-in `complete-vpc` tables when no path was given anywhere and the
    /// default file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        if resolved.is_default && !resolved.path.exists() {
            return Ok(Self::complete_vpc());
        }
        Self::load_resolved(&resolved.path)
    }

    /// Reads, parses, and validates a config file.
    fn load_resolved(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source_dir = path.parent().map(|parent| {
            if parent.as_os_str().is_empty() { PathBuf::from(".") } else { parent.to_path_buf() }
        });
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML (including unknown
    /// assert types) and [`ConfigError::Invalid`] when validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.terraform.binary.trim().is_empty() {
            return Err(ConfigError::Invalid("terraform.binary must be non-empty".to_string()));
        }
        self.retry.validate()?;
        if self.plan.no_changes_marker.is_empty() {
            return Err(ConfigError::Invalid("plan.no_changes_marker must be non-empty".to_string()));
        }
        self.workspace.validate()?;
        self.validate_cases()?;
        self.validate_outputs()
    }

    /// Validates the case table.
    fn validate_cases(&self) -> Result<(), ConfigError> {
        if self.cases.is_empty() {
            return Err(ConfigError::Invalid("at least one case is required".to_string()));
        }
        let mut names = BTreeSet::new();
        for case in &self.cases {
            case.validate().map_err(|err| ConfigError::Invalid(err.to_string()))?;
            if !names.insert(case.name.as_str()) {
                return Err(ConfigError::Invalid(format!("duplicate case name: {}", case.name)));
            }
        }
        Ok(())
    }

    /// Validates the expectation table.
    fn validate_outputs(&self) -> Result<(), ConfigError> {
        if self.outputs.is_empty() {
            return Err(ConfigError::Invalid("at least one output expectation is required".to_string()));
        }
        let mut names = BTreeSet::new();
        for output in &self.outputs {
            if output.output_variable.trim().is_empty() {
                return Err(ConfigError::Invalid("output_variable must be non-empty".to_string()));
            }
            if !names.insert(output.output_variable.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate output expectation: {}",
                    output.output_variable
                )));
            }
        }
        Ok(())
    }

    /// Applies environment overrides on top of the file values.
    pub fn apply_env(&mut self, overrides: &EnvOverrides) {
        if let Some(binary) = &overrides.terraform_bin {
            self.terraform.binary.clone_from(binary);
        }
        if let Some(run_root) = &overrides.run_root {
            self.workspace.run_root = Some(run_root.clone());
        }
        if let Some(event_log) = &overrides.event_log {
            self.workspace.event_log = Some(event_log.clone());
        }
        if let Some(module_root) = &overrides.module_root {
            for case in &mut self.cases {
                case.values.insert(ROOT_FOLDER_KEY.to_string(), module_root.clone());
            }
            self.source_dir = None;
        }
    }

    /// Returns the case named `name`.
    #[must_use]
    pub fn find_case(&self, name: &str) -> Option<&TestCase> {
        self.cases.iter().find(|case| case.name.as_str() == name)
    }

    /// Builds the lifecycle settings for this suite.
    #[must_use]
    pub fn case_settings(&self) -> CaseSettings {
        CaseSettings {
            no_color: self.terraform.no_color,
            upgrade: self.terraform.upgrade,
            retry: self.retry.policy(),
            vars: self.terraform.vars.clone(),
            env_vars: self.terraform.env.clone(),
            no_changes_marker: self.plan.no_changes_marker.clone(),
            module_base: self.source_dir.clone(),
        }
    }
}

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Config path with its resolution source.
struct ResolvedPath {
    /// Resolved path.
    path: PathBuf,
    /// True when neither an explicit path nor the env var was given.
    is_default: bool,
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<ResolvedPath, ConfigError> {
    if let Some(path) = path {
        return Ok(ResolvedPath {
            path: path.to_path_buf(),
            is_default: false,
        });
    }
    let env_path = read_env_strict(HarnessEnv::ConfigPath.as_str())
        .map_err(ConfigError::Invalid)?
        .filter(|value| !value.trim().is_empty());
    if let Some(env_path) = env_path {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(ResolvedPath {
            path: PathBuf::from(env_path),
            is_default: false,
        });
    }
    Ok(ResolvedPath {
        path: PathBuf::from(DEFAULT_CONFIG_NAME),
        is_default: true,
    })
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    validate_path(Path::new(value)).map_err(|err| ConfigError::Invalid(format!("{field}: {err}")))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
