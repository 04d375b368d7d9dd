// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Run Artifacts
// Description: Per-test run directory for live tfstage runs.
// Purpose: Keep the suite report, transcripts, and a summary next to the run.
// Dependencies: system-tests, tfstage-cli, tfstage-core, serde, serde_jcs
// ============================================================================

//! ## Overview
//! A live test owns one run directory holding its working copies, event log,
//! generated `tfstage.toml`, and a `summary.json`/`summary.md` pair. The
//! summary embeds the recorded [`SuiteReport`], so its verdict is the
//! report's verdict, and it lists whatever files the run left behind. A test
//! that panics or returns early still gets a summary with verdict `aborted`.

use std::fmt::Write;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use system_tests::SystemTestSettings;
use tfstage_cli::report::render_suite;
use tfstage_core::SuiteReport;

/// Event log file name inside the run directory.
pub const EVENT_LOG_NAME: &str = "events.jsonl";
/// Canonical JSON summary.
const SUMMARY_JSON: &str = "summary.json";
/// Markdown summary.
const SUMMARY_MD: &str = "summary.md";
/// Artifact parent when no run root is configured.
const DEFAULT_RUN_ROOT: &str = "target/system-tests";

/// Final verdict of a live test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Every case and check passed.
    Pass,
    /// At least one case failed.
    Fail,
    /// Live settings were missing; nothing was provisioned.
    Skip,
    /// The test ended without recording a verdict.
    Aborted,
}

impl Verdict {
    /// Returns the verdict a suite report implies.
    pub fn of(report: &SuiteReport) -> Self {
        if report.is_success() { Self::Pass } else { Self::Fail }
    }

    /// Returns the lowercase label.
    const fn label(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Skip => "skip",
            Self::Aborted => "aborted",
        }
    }
}

/// Serialized form of `summary.json`.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    test: &'a str,
    verdict: Verdict,
    duration_ms: u128,
    notes: &'a [String],
    files: Vec<String>,
    suite: Option<&'a SuiteReport>,
}

/// Run directory of one live test.
pub struct RunArtifacts {
    root: PathBuf,
    test: String,
    started: Instant,
    notes: Vec<String>,
    suite: Option<SuiteReport>,
    closed: bool,
}

impl RunArtifacts {
    /// Opens the run directory for `test`.
    ///
    /// With a configured run root the directory is `<run root>/<test>` and an
    /// existing one is reused only when overwriting is allowed. Otherwise a
    /// fresh `target/system-tests/<test>-<millis>` directory is used.
    pub fn open(test: &str, settings: &SystemTestSettings) -> io::Result<Self> {
        let root = match &settings.run_root {
            Some(run_root) => {
                let root = run_root.join(test);
                if root.exists() && !settings.allow_overwrite {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("{} already exists", root.display()),
                    ));
                }
                root
            }
            None => {
                let stamp =
                    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
                PathBuf::from(DEFAULT_RUN_ROOT).join(format!("{test}-{stamp}"))
            }
        };
        fs::create_dir_all(&root)?;
        Ok(Self {
            root: root.canonicalize()?,
            test: test.to_string(),
            started: Instant::now(),
            notes: Vec::new(),
            suite: None,
            closed: false,
        })
    }

    /// Returns the run directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the parent directory for working copies, creating it.
    pub fn workspaces_dir(&self) -> io::Result<PathBuf> {
        let dir = self.root.join("workspaces");
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Returns the event log path.
    pub fn event_log(&self) -> PathBuf {
        self.root.join(EVENT_LOG_NAME)
    }

    /// Writes a text file into the run directory.
    pub fn write_file(&self, name: &str, contents: &str) -> io::Result<PathBuf> {
        let path = self.root.join(name);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Adds a line to the summary notes.
    pub fn note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    /// Records the suite report and writes its text rendering.
    pub fn record_suite(&mut self, report: SuiteReport) -> io::Result<Verdict> {
        self.write_file("suite_report.txt", &render_suite(&report))?;
        let verdict = Verdict::of(&report);
        self.suite = Some(report);
        Ok(verdict)
    }

    /// Closes the run as skipped.
    pub fn skip(&mut self, reason: impl Into<String>) -> io::Result<()> {
        self.note(reason);
        self.close(Verdict::Skip)
    }

    /// Writes the summary with `verdict`.
    pub fn close(&mut self, verdict: Verdict) -> io::Result<()> {
        let summary = RunSummary {
            test: &self.test,
            verdict,
            duration_ms: self.started.elapsed().as_millis(),
            notes: &self.notes,
            files: self.listed_files()?,
            suite: self.suite.as_ref(),
        };
        let json = serde_jcs::to_vec(&summary).map_err(|err| io::Error::other(err.to_string()))?;
        fs::write(self.root.join(SUMMARY_JSON), json)?;
        fs::write(self.root.join(SUMMARY_MD), summary_markdown(&summary))?;
        self.closed = true;
        Ok(())
    }

    /// Lists top-level files in the run directory, plus the summary pair.
    fn listed_files(&self) -> io::Result<Vec<String>> {
        let mut files: Vec<String> = fs::read_dir(&self.root)?
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .chain([SUMMARY_JSON.to_string(), SUMMARY_MD.to_string()])
            .collect();
        files.sort();
        files.dedup();
        Ok(files)
    }
}

impl Drop for RunArtifacts {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let how = if std::thread::panicking() { "panicked" } else { "returned early" };
        self.note(format!("test {how} before recording a verdict"));
        let _ = self.close(Verdict::Aborted);
    }
}

/// Renders `summary.md`.
fn summary_markdown(summary: &RunSummary<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}: {}\n", summary.test, summary.verdict.label());
    let _ = writeln!(out, "Duration: {} ms\n", summary.duration_ms);
    for note in summary.notes {
        let _ = writeln!(out, "- {note}");
    }
    if let Some(report) = summary.suite {
        let _ = writeln!(out, "\n## Suite report\n\n```text\n{}\n```", render_suite(report));
    }
    out.push_str("\n## Files\n\n");
    for file in &summary.files {
        let _ = writeln!(out, "- {file}");
    }
    out
}
