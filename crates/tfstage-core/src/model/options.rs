// crates/tfstage-core/src/model/options.rs
// ============================================================================
// Module: tfstage Provisioning Options
// Description: Tool invocation options persisted between lifecycle stages.
// Purpose: Let later stages reload an equivalent configuration from disk.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`ProvisioningOptions`] are built once per case, persisted by the `apply`
//! stage, and reloaded by `plan` and `outputs_validation` so each stage can run
//! as an independent step. [`RetryPolicy`] lists the tool failures that are
//! known to be transient; classification happens in the tool driver.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default pause between attempts.
pub const DEFAULT_TIME_BETWEEN_RETRIES: Duration = Duration::from_secs(5);

/// Tool failures that usually clear up on retry (pattern, description).
pub const DEFAULT_RETRYABLE_ERRORS: &[(&str, &str)] = &[
    (".*read: connection reset by peer.*", "Failed to reach helm charts repository."),
    (".*transport is closing.*", "Failed to reach Kubernetes API."),
    (
        ".*unable to verify signature.*",
        "Failed to retrieve plugin due to transient network error.",
    ),
    (".*unable to verify checksum.*", "Failed to retrieve plugin due to transient network error."),
    (
        ".*no provider exists with the given name.*",
        "Failed to retrieve plugin due to transient network error.",
    ),
    (
        ".*registry service is unreachable.*",
        "Failed to retrieve plugin due to transient network error.",
    ),
    (".*Error installing provider.*", "Failed to retrieve plugin due to transient network error."),
    (
        ".*Failed to query available provider packages.*",
        "Failed to retrieve plugin due to transient network error.",
    ),
    (
        ".*timeout while waiting for plugin to start.*",
        "Failed to retrieve plugin due to transient network error.",
    ),
    (
        ".*timed out waiting for server handshake.*",
        "Failed to retrieve plugin due to transient network error.",
    ),
    (
        "could not query provider registry for",
        "Failed to retrieve plugin due to transient network error.",
    ),
    (
        ".*Provider produced inconsistent result after apply.*",
        "Provider eventual consistency error.",
    ),
    (
        ".*Could not download module.*The requested URL returned error: 429.*",
        "Failed to download module due to rate limiting.",
    ),
];

// ============================================================================
// SECTION: Retry Policy
// ============================================================================

/// Retry policy applied to every tool invocation.
///
/// # Invariants
/// - `retryable_errors` keys are regular expressions matched against the
///   combined stdout/stderr of a failed invocation.
/// - `max_retries` counts retries, not attempts (0 means a single attempt).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum retries after the first attempt.
    pub max_retries: u32,
    /// Pause between attempts.
    pub time_between_retries: Duration,
    /// Retryable error patterns mapped to human-readable descriptions.
    #[serde(default)]
    pub retryable_errors: BTreeMap<String, String>,
}

impl RetryPolicy {
    /// Returns a policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            time_between_retries: Duration::ZERO,
            retryable_errors: BTreeMap::new(),
        }
    }

    /// Returns the default policy for the well-known transient tool failures.
    #[must_use]
    pub fn with_default_retryable_errors() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            time_between_retries: DEFAULT_TIME_BETWEEN_RETRIES,
            retryable_errors: DEFAULT_RETRYABLE_ERRORS
                .iter()
                .map(|(pattern, description)| ((*pattern).to_string(), (*description).to_string()))
                .collect(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::with_default_retryable_errors()
    }
}

// ============================================================================
// SECTION: Provisioning Options
// ============================================================================

/// Options handed to every tool verb for one working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningOptions {
    /// Temporary working copy of the module.
    pub working_dir: PathBuf,
    /// Variable files, passed to the tool in order and unmodified.
    #[serde(default)]
    pub var_files: Vec<String>,
    /// Inline variables passed as `-var key=value`.
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
    /// Extra environment for the tool process.
    #[serde(default)]
    pub env_vars: BTreeMap<String, String>,
    /// Disable colored tool output.
    #[serde(default)]
    pub no_color: bool,
    /// Upgrade modules and providers during init.
    #[serde(default)]
    pub upgrade: bool,
    /// Retry policy for tool invocations.
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl ProvisioningOptions {
    /// Creates options for a working directory with no variables and no retries.
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            var_files: Vec::new(),
            vars: BTreeMap::new(),
            env_vars: BTreeMap::new(),
            no_color: false,
            upgrade: false,
            retry: RetryPolicy::none(),
        }
    }
}
