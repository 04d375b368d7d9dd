// crates/tfstage-core/src/audit.rs
// ============================================================================
// Module: tfstage Audit Logging
// Description: Structured events for stage, tool, and output-check activity.
// Purpose: Emit JSON-line logs without a hard logging-framework dependency.
// Dependencies: crate::model, serde, serde_json
// ============================================================================

//! ## Overview
//! Every stage transition, tool invocation, and output check is reported to a
//! [`HarnessAuditSink`] as a serializable event. Sinks write one JSON object
//! per line so CI logs can be filtered with ordinary tooling.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::model::AssertType;
use crate::model::Stage;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Stage transition status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageAuditStatus {
    /// Stage body is about to run.
    Started,
    /// Stage was skipped (marker present or operator override).
    Skipped,
    /// Stage body succeeded and the marker was written.
    Completed,
    /// Stage body failed; no marker was written.
    Failed,
}

/// Tool invocation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolAuditStatus {
    /// The invocation succeeded.
    Succeeded,
    /// The invocation failed with a retryable error and will be retried.
    Retrying,
    /// The invocation failed for good.
    Failed,
}

/// Output check status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputAuditStatus {
    /// The output matched its expectation.
    Passed,
    /// The output was read but did not match.
    Mismatch,
    /// The output could not be read.
    FetchFailed,
}

/// Stage audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct StageAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Test case name.
    pub case: String,
    /// Stage name.
    pub stage: Stage,
    /// Working directory of the case.
    pub working_dir: String,
    /// Transition status.
    pub status: StageAuditStatus,
    /// Skip reason or failure message.
    pub detail: Option<String>,
    /// Stage body duration when it ran.
    pub duration_ms: Option<u128>,
}

/// Inputs required to construct a stage audit event.
pub struct StageAuditEventParams {
    /// Test case name.
    pub case: String,
    /// Stage name.
    pub stage: Stage,
    /// Working directory of the case.
    pub working_dir: String,
    /// Transition status.
    pub status: StageAuditStatus,
    /// Skip reason or failure message.
    pub detail: Option<String>,
    /// Stage body duration when it ran.
    pub duration_ms: Option<u128>,
}

/// Tool invocation audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct ToolAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Tool verb (`init`, `apply`, `plan`, `destroy`, `output`).
    pub verb: String,
    /// Working directory the tool ran in.
    pub working_dir: String,
    /// 1-based attempt number.
    pub attempt: u32,
    /// Invocation status.
    pub status: ToolAuditStatus,
    /// Process exit code when available.
    pub exit_code: Option<i32>,
    /// Invocation duration.
    pub duration_ms: u128,
    /// Failure message or retry reason.
    pub detail: Option<String>,
}

/// Inputs required to construct a tool audit event.
pub struct ToolAuditEventParams {
    /// Tool verb.
    pub verb: String,
    /// Working directory the tool ran in.
    pub working_dir: String,
    /// 1-based attempt number.
    pub attempt: u32,
    /// Invocation status.
    pub status: ToolAuditStatus,
    /// Process exit code when available.
    pub exit_code: Option<i32>,
    /// Invocation duration.
    pub duration_ms: u128,
    /// Failure message or retry reason.
    pub detail: Option<String>,
}

/// Output check audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct OutputAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Test case name.
    pub case: String,
    /// Output name.
    pub output_variable: String,
    /// Comparison applied.
    pub assert_type: AssertType,
    /// Check status.
    pub status: OutputAuditStatus,
    /// Mismatch or fetch failure message.
    pub detail: Option<String>,
}

/// Inputs required to construct an output audit event.
pub struct OutputAuditEventParams {
    /// Test case name.
    pub case: String,
    /// Output name.
    pub output_variable: String,
    /// Comparison applied.
    pub assert_type: AssertType,
    /// Check status.
    pub status: OutputAuditStatus,
    /// Mismatch or fetch failure message.
    pub detail: Option<String>,
}

// ============================================================================
// SECTION: Constructors
// ============================================================================

/// Returns the current time in milliseconds since the Unix epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

impl StageAuditEvent {
    /// Creates a new stage audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: StageAuditEventParams) -> Self {
        Self {
            event: "stage_audit",
            timestamp_ms: now_millis(),
            case: params.case,
            stage: params.stage,
            working_dir: params.working_dir,
            status: params.status,
            detail: params.detail,
            duration_ms: params.duration_ms,
        }
    }
}

impl ToolAuditEvent {
    /// Creates a new tool audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ToolAuditEventParams) -> Self {
        Self {
            event: "tool_audit",
            timestamp_ms: now_millis(),
            verb: params.verb,
            working_dir: params.working_dir,
            attempt: params.attempt,
            status: params.status,
            exit_code: params.exit_code,
            duration_ms: params.duration_ms,
            detail: params.detail,
        }
    }
}

impl OutputAuditEvent {
    /// Creates a new output audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: OutputAuditEventParams) -> Self {
        Self {
            event: "output_audit",
            timestamp_ms: now_millis(),
            case: params.case,
            output_variable: params.output_variable,
            assert_type: params.assert_type,
            status: params.status,
            detail: params.detail,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for harness events.
pub trait HarnessAuditSink: Send + Sync {
    /// Record a stage transition.
    fn record_stage(&self, event: &StageAuditEvent);

    /// Record a tool invocation.
    fn record_tool(&self, _event: &ToolAuditEvent) {}

    /// Record an output check.
    fn record_output(&self, _event: &OutputAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl StderrAuditSink {
    /// Writes one event as a JSON line to stderr.
    fn emit<T: Serialize>(event: &T) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

impl HarnessAuditSink for StderrAuditSink {
    fn record_stage(&self, event: &StageAuditEvent) {
        Self::emit(event);
    }

    fn record_tool(&self, event: &ToolAuditEvent) {
        Self::emit(event);
    }

    fn record_output(&self, event: &OutputAuditEvent) {
        Self::emit(event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one event as a JSON line and flushes.
    fn emit<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl HarnessAuditSink for FileAuditSink {
    fn record_stage(&self, event: &StageAuditEvent) {
        self.emit(event);
    }

    fn record_tool(&self, event: &ToolAuditEvent) {
        self.emit(event);
    }

    fn record_output(&self, event: &OutputAuditEvent) {
        self.emit(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl HarnessAuditSink for NoopAuditSink {
    fn record_stage(&self, _event: &StageAuditEvent) {}
}
