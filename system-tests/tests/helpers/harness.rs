// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Live Suite Harness
// Description: Builds the live `complete-vpc` suite for system-tests.
// Purpose: Point the built-in suite at a real module checkout and binary.
// Dependencies: system-tests, tfstage-cli, tfstage-config, tfstage-core, toml
// ============================================================================

//! ## Overview
//! The live suite is the built-in `complete-vpc` table with the module root,
//! Terraform binary, working copy parent, and event log replaced through the
//! same overrides the CLI reads from the environment. Paths are absolute so
//! the written `tfstage.toml` resolves from any directory.

use std::io;
use std::path::Path;
use std::path::PathBuf;

use system_tests::SystemTestSettings;
use tfstage_cli::harness::build_services;
use tfstage_config::EnvOverrides;
use tfstage_config::SuiteConfig;
use tfstage_core::CaseLifecycle;
use tfstage_core::SkipOverrides;

use super::artifacts::RunArtifacts;

/// Builds the live suite config whose outputs land in `artifacts`.
pub fn live_suite(
    settings: &SystemTestSettings,
    module_root: &Path,
    artifacts: &RunArtifacts,
) -> io::Result<SuiteConfig> {
    let module_root = module_root.canonicalize()?;
    let workspaces = artifacts.workspaces_dir()?;
    let mut suite = SuiteConfig::complete_vpc();
    suite.apply_env(&EnvOverrides {
        terraform_bin: Some(settings.terraform_binary().to_string()),
        run_root: Some(workspaces.display().to_string()),
        event_log: Some(artifacts.event_log().display().to_string()),
        module_root: Some(module_root.display().to_string()),
    });
    suite.validate().map_err(|err| io::Error::other(err.to_string()))?;
    Ok(suite)
}

/// Builds a lifecycle for `suite` with no operator overrides.
pub fn live_lifecycle(suite: &SuiteConfig) -> io::Result<CaseLifecycle> {
    let services = build_services(suite, SkipOverrides::none())
        .map_err(|err| io::Error::other(err.to_string()))?;
    Ok(CaseLifecycle::new(services, suite.case_settings()))
}

/// Writes `suite` as `tfstage.toml` into the run directory.
pub fn write_suite_file(suite: &SuiteConfig, artifacts: &RunArtifacts) -> io::Result<PathBuf> {
    let text = toml::to_string(suite).map_err(|err| io::Error::other(err.to_string()))?;
    artifacts.write_file("tfstage.toml", &text)
}
