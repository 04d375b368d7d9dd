// crates/tfstage-terraform/src/retry.rs
// ============================================================================
// Module: Retry Classification
// Description: Matches failed invocations against retryable error patterns.
// Purpose: Retry only the failures a retry policy names as transient.
// Dependencies: regex, tfstage-core
// ============================================================================

//! ## Overview
//! A [`RetryClassifier`] compiles the patterns of a [`RetryPolicy`] once per
//! invocation. Only [`ToolError::CommandFailed`] is retryable, and only when
//! its combined stdout and stderr match one of the patterns.

use regex::Regex;
use tfstage_core::RetryPolicy;
use tfstage_core::ToolError;

/// Compiled retryable error patterns.
#[derive(Debug, Clone)]
pub struct RetryClassifier {
    /// Pattern and description pairs.
    patterns: Vec<(Regex, String)>,
}

impl RetryClassifier {
    /// Compiles the patterns of `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Config`] when a pattern is not a valid regex.
    pub fn new(policy: &RetryPolicy) -> Result<Self, ToolError> {
        let patterns = policy
            .retryable_errors
            .iter()
            .map(|(pattern, description)| {
                Regex::new(pattern)
                    .map(|regex| (regex, description.clone()))
                    .map_err(|err| ToolError::Config(format!("retryable error pattern '{pattern}': {err}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            patterns,
        })
    }

    /// Returns the description of the first pattern matching `error`, if the
    /// error is retryable.
    #[must_use]
    pub fn classify(&self, error: &ToolError) -> Option<&str> {
        let ToolError::CommandFailed {
            stdout,
            stderr,
            ..
        } = error
        else {
            return None;
        };
        self.patterns
            .iter()
            .find(|(regex, _)| regex.is_match(stdout) || regex.is_match(stderr))
            .map(|(_, description)| description.as_str())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test fixtures use unwraps for clarity.")]

    use tfstage_core::RetryPolicy;
    use tfstage_core::ToolError;

    use super::RetryClassifier;

    fn failed(stderr: &str) -> ToolError {
        ToolError::CommandFailed {
            verb: "init".to_string(),
            exit_code: Some(1),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    #[test]
    fn default_policy_retries_registry_outages() {
        let classifier = RetryClassifier::new(&RetryPolicy::with_default_retryable_errors()).unwrap();
        let description = classifier
            .classify(&failed("Error: Failed to query available provider packages\n\nregistry"))
            .unwrap();
        assert!(description.contains("transient network error"));
        assert!(classifier.classify(&failed("Error: Unsupported argument")).is_none());
    }

    #[test]
    fn launch_errors_are_never_retried() {
        let classifier = RetryClassifier::new(&RetryPolicy::with_default_retryable_errors()).unwrap();
        let error = ToolError::Launch {
            program: "terraform".to_string(),
            message: "registry service is unreachable".to_string(),
        };
        assert!(classifier.classify(&error).is_none());
    }

    #[test]
    fn invalid_patterns_are_configuration_errors() {
        let mut policy = RetryPolicy::none();
        policy.retryable_errors.insert("(unclosed".to_string(), "bad".to_string());
        assert!(matches!(RetryClassifier::new(&policy), Err(ToolError::Config(_))));
    }
}
