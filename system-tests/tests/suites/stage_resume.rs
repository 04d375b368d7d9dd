// system-tests/tests/suites/stage_resume.rs
// ============================================================================
// Module: Stage Resume Tests
// Description: Live stage-by-stage run through the tfstage binary.
// Purpose: Check that completed stages are skipped on re-run.
// Dependencies: system-tests helpers, tfstage-config, tfstage-core
// ============================================================================

//! CLI stage resume coverage for tfstage system-tests.

use std::error::Error;
use std::path::PathBuf;

use helpers::artifacts::RunArtifacts;
use helpers::artifacts::Verdict;
use helpers::cli::CliRun;
use helpers::cli::TfstageCli;
use helpers::harness::live_suite;
use helpers::harness::write_suite_file;
use system_tests::SystemTestEnv;
use system_tests::SystemTestSettings;
use tfstage_config::builtin::COMPLETE_VPC_CASE;
use tfstage_core::Stage;

use crate::helpers;

#[test]
fn stages_resume_through_cli() -> Result<(), Box<dyn Error>> {
    let settings = SystemTestSettings::from_env()?;
    let mut artifacts = RunArtifacts::open("stages_resume_through_cli", &settings)?;
    let Some(module_root) = settings.module_root.clone() else {
        artifacts.skip(format!("{} not set", SystemTestEnv::ModuleRoot.var()))?;
        return Ok(());
    };
    let suite = live_suite(&settings, &module_root, &artifacts)?;
    let config = write_suite_file(&suite, &artifacts)?;
    let Some(cli) = TfstageCli::locate(&settings, config) else {
        artifacts.skip(format!("tfstage binary not built and {} not set", SystemTestEnv::CliBin.var()))?;
        return Ok(());
    };

    let prepared = cli.prepare(COMPLETE_VPC_CASE)?;
    let workdir = PathBuf::from(prepared.stdout_ok()?);
    let mut runs: Vec<(CliRun, &str)> = vec![(prepared, "")];
    let steps = [
        (Stage::Apply, "stage apply: ran"),
        (Stage::Apply, "stage apply: skipped (already_complete)"),
        (Stage::Plan, "stage plan: ran"),
        (Stage::OutputsValidation, "stage outputs_validation: ran"),
        (Stage::Destroy, "stage destroy: ran"),
        (Stage::Destroy, "stage destroy: skipped (already_complete)"),
    ];
    for (stage, expected) in steps {
        let run = cli.stage(stage, &workdir, COMPLETE_VPC_CASE)?;
        let failed = !run.success;
        runs.push((run, expected));
        if failed && stage != Stage::Destroy {
            // Stop stepping but still tear down what apply created.
            runs.push((cli.stage(Stage::Destroy, &workdir, COMPLETE_VPC_CASE)?, "stage destroy: ran"));
            break;
        }
    }

    let transcript: Vec<String> = runs.iter().map(|(run, _)| run.transcript_line()).collect();
    artifacts.write_file("transcript.txt", &transcript.join("\n"))?;
    let mismatch = runs.iter().find_map(|(run, expected)| match run.stdout_ok() {
        Err(err) => Some(err),
        Ok(stdout) if !stdout.contains(expected) => {
            Some(format!("{}: expected '{expected}', got '{stdout}'", run.label))
        }
        Ok(_) => None,
    });
    match mismatch {
        Some(err) => {
            artifacts.note(err.clone());
            artifacts.close(Verdict::Fail)?;
            Err(err.into())
        }
        None => {
            artifacts.note("every stage ran once and re-runs were skipped");
            artifacts.close(Verdict::Pass)?;
            Ok(())
        }
    }
}
