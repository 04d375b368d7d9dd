// crates/tfstage-terraform/src/cli.rs
// ============================================================================
// Module: Terraform CLI Driver
// Description: InfraTool implementation backed by the terraform binary.
// Purpose: Run each verb in the case working directory with retries.
// Dependencies: crate::{args, render, retry}, tfstage-core, serde_json
// ============================================================================

//! ## Overview
//! Each verb is one child process started in the options' working directory
//! with the options' extra environment. A failed invocation is retried while
//! its output matches a retryable pattern and retries remain; every attempt is
//! reported to the audit sink.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use serde_json::Value;
use tfstage_core::HarnessAuditSink;
use tfstage_core::InfraTool;
use tfstage_core::ProvisioningOptions;
use tfstage_core::ToolError;
use tfstage_core::audit::ToolAuditEvent;
use tfstage_core::audit::ToolAuditEventParams;
use tfstage_core::audit::ToolAuditStatus;

use crate::args;
use crate::render::render_output;
use crate::retry::RetryClassifier;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Binary name resolved through `PATH` when none is configured.
pub const DEFAULT_TERRAFORM_BINARY: &str = "terraform";

// ============================================================================
// SECTION: Driver
// ============================================================================

/// Terraform command-line driver.
#[derive(Clone)]
pub struct TerraformCli {
    /// Path or name of the terraform binary.
    binary: PathBuf,
    /// Event sink for tool invocations.
    audit: Arc<dyn HarnessAuditSink>,
}

impl TerraformCli {
    /// Creates a driver for `binary`.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, audit: Arc<dyn HarnessAuditSink>) -> Self {
        Self {
            binary: binary.into(),
            audit,
        }
    }

    /// Returns the configured binary.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Runs one verb with the options' retry policy and returns its stdout.
    fn run(&self, options: &ProvisioningOptions, verb: &str, args: &[String]) -> Result<String, ToolError> {
        let classifier = RetryClassifier::new(&options.retry)?;
        let mut attempt: u32 = 1;
        loop {
            let started = Instant::now();
            let result = self.run_once(options, verb, args);
            let event = |status, exit_code, detail| ToolAuditEventParams {
                verb: verb.to_string(),
                working_dir: options.working_dir.display().to_string(),
                attempt,
                status,
                exit_code,
                duration_ms: started.elapsed().as_millis(),
                detail,
            };
            let err = match result {
                Ok((stdout, exit_code)) => {
                    self.record(event(ToolAuditStatus::Succeeded, exit_code, None));
                    return Ok(stdout);
                }
                Err(err) => err,
            };
            let exit_code = match &err {
                ToolError::CommandFailed {
                    exit_code,
                    ..
                } => *exit_code,
                _ => None,
            };
            let retry_reason =
                if attempt <= options.retry.max_retries { classifier.classify(&err) } else { None };
            let Some(reason) = retry_reason else {
                self.record(event(ToolAuditStatus::Failed, exit_code, Some(err.to_string())));
                return Err(err);
            };
            self.record(event(ToolAuditStatus::Retrying, exit_code, Some(reason.to_string())));
            thread::sleep(options.retry.time_between_retries);
            attempt += 1;
        }
    }

    /// Runs one verb once and returns stdout and the exit code.
    fn run_once(
        &self,
        options: &ProvisioningOptions,
        verb: &str,
        args: &[String],
    ) -> Result<(String, Option<i32>), ToolError> {
        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(&options.working_dir)
            .envs(&options.env_vars)
            .output()
            .map_err(|err| ToolError::Launch {
                program: self.binary.display().to_string(),
                message: err.to_string(),
            })?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok((stdout, output.status.code()));
        }
        Err(ToolError::CommandFailed {
            verb: verb.to_string(),
            exit_code: output.status.code(),
            stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Emits a tool audit event.
    fn record(&self, params: ToolAuditEventParams) {
        self.audit.record_tool(&ToolAuditEvent::new(params));
    }
}

impl InfraTool for TerraformCli {
    fn init_and_apply(&self, options: &ProvisioningOptions) -> Result<String, ToolError> {
        let init = self.run(options, "init", &args::init_args(options))?;
        let apply = self.run(options, "apply", &args::apply_args(options))?;
        Ok(format!("{init}{apply}"))
    }

    fn plan(&self, options: &ProvisioningOptions) -> Result<String, ToolError> {
        self.run(options, "plan", &args::plan_args(options))
    }

    fn destroy(&self, options: &ProvisioningOptions) -> Result<String, ToolError> {
        self.run(options, "destroy", &args::destroy_args(options))
    }

    fn output(&self, options: &ProvisioningOptions, name: &str) -> Result<String, ToolError> {
        let stdout = self.run(options, "output", &args::output_args(name)).map_err(|err| match err {
            ToolError::CommandFailed {
                stderr,
                ..
            } if stderr.contains("not found") => ToolError::OutputMissing {
                name: name.to_string(),
                message: stderr.trim().to_string(),
            },
            other => other,
        })?;
        let value: Value = serde_json::from_str(stdout.trim())
            .map_err(|err| ToolError::InvalidOutput(format!("output {name}: {err}")))?;
        Ok(render_output(&value))
    }
}
