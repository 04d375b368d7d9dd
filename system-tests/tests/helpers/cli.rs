// system-tests/tests/helpers/cli.rs
// ============================================================================
// Module: tfstage Binary Driver
// Description: Runs `tfstage prepare` and `tfstage stage` against one config.
// Purpose: Drive stages as separate processes, the way CI steps would.
// Dependencies: system-tests, tfstage-core
// ============================================================================

//! ## Overview
//! The binary comes from `TFSTAGE_SYSTEM_TEST_CLI_BIN` or sits next to the
//! running test executable (`target/<profile>/tfstage`). When neither exists
//! the CLI suites skip. Every call is kept as a [`CliRun`] so the suite can
//! write a transcript.

use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;

use system_tests::SystemTestSettings;
use tfstage_core::Stage;

/// One finished `tfstage` invocation.
#[derive(Debug, Clone)]
pub struct CliRun {
    /// Transcript label.
    pub label: String,
    /// True when the process exited with status zero.
    pub success: bool,
    /// Captured stdout.
    pub stdout: String,
    /// Captured stderr.
    pub stderr: String,
}

impl CliRun {
    /// Returns trimmed stdout, or an error carrying stderr on failure.
    pub fn stdout_ok(&self) -> Result<&str, String> {
        if self.success {
            Ok(self.stdout.trim())
        } else {
            Err(format!("{} failed: {}", self.label, self.stderr.trim()))
        }
    }

    /// Returns the transcript line for this run.
    pub fn transcript_line(&self) -> String {
        let status = if self.success { "ok" } else { "failed" };
        let output = if self.success { self.stdout.trim() } else { self.stderr.trim() };
        format!("[{status}] {}: {output}", self.label)
    }
}

/// `tfstage` bound to a suite config file.
#[derive(Debug, Clone)]
pub struct TfstageCli {
    binary: PathBuf,
    config: PathBuf,
}

impl TfstageCli {
    /// Locates the binary; `None` when it has not been built.
    pub fn locate(settings: &SystemTestSettings, config: PathBuf) -> Option<Self> {
        let binary = settings.cli_bin.clone().or_else(sibling_binary)?;
        binary.is_file().then_some(Self {
            binary,
            config,
        })
    }

    /// Runs `tfstage prepare` for `case`.
    pub fn prepare(&self, case: &str) -> io::Result<CliRun> {
        self.invoke("prepare".to_string(), &["prepare", "--case", case])
    }

    /// Runs one stage of `case` against `workdir`.
    pub fn stage(&self, stage: Stage, workdir: &Path, case: &str) -> io::Result<CliRun> {
        let workdir = workdir.to_string_lossy();
        self.invoke(
            format!("stage {stage}"),
            &["stage", stage.as_str(), "--workdir", &workdir, "--case", case],
        )
    }

    /// Runs the binary with `args` plus `--config`.
    fn invoke(&self, label: String, args: &[&str]) -> io::Result<CliRun> {
        let output = Command::new(&self.binary).args(args).arg("--config").arg(&self.config).output()?;
        Ok(CliRun {
            label,
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Returns `target/<profile>/tfstage` for the running test executable
/// (`target/<profile>/deps/<test>`).
fn sibling_binary() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let profile_dir = exe.parent()?.parent()?;
    Some(profile_dir.join(format!("tfstage{}", std::env::consts::EXE_SUFFIX)))
}
