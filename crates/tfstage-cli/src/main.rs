// crates/tfstage-cli/src/main.rs
// ============================================================================
// Module: tfstage CLI Entry Point
// Description: Command dispatcher for tfstage suite and stage workflows.
// Purpose: Run whole suites, or single stages against an existing working copy.
// Dependencies: clap, serde_json, thiserror, tfstage-cli, tfstage-config, tfstage-core
// ============================================================================

//! ## Overview
//! `tfstage run` drives every configured case through apply, plan, output
//! validation, and destroy. `tfstage prepare` and `tfstage stage` split that
//! flow so an interrupted run can be resumed stage by stage against the
//! working copy it left behind. Completed stages are skipped through the
//! markers stored in that working copy.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use thiserror::Error;
use tfstage_cli::harness::build_lifecycle;
use tfstage_cli::report::render_suite;
use tfstage_config::EnvOverrides;
use tfstage_config::SuiteConfig;
use tfstage_core::CaseLifecycle;
use tfstage_core::Stage;
use tfstage_core::StageError;
use tfstage_core::StageFault;
use tfstage_core::StageOutcome;
use tfstage_core::StoreError;
use tfstage_core::SuiteReport;
use tfstage_core::TestCase;
use tfstage_core::run_suite;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "tfstage", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run cases through every stage and report the results.
    Run(RunCommand),
    /// Copy a case's module into a fresh working copy and print its path.
    Prepare(PrepareCommand),
    /// Run one stage against an existing working copy.
    Stage(StageCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Report formats for `run`.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
enum ReportFormat {
    /// Human-readable summary.
    #[default]
    Text,
    /// Pretty-printed JSON report.
    Json,
}

/// Configuration for the `run` command.
#[derive(Args, Debug)]
struct RunCommand {
    /// Optional config file path (defaults to tfstage.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Restrict the run to these case names (repeatable).
    #[arg(long = "case", value_name = "NAME")]
    cases: Vec<String>,
    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,
}

/// Configuration for the `prepare` command.
#[derive(Args, Debug)]
struct PrepareCommand {
    /// Optional config file path (defaults to tfstage.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Case to prepare.
    #[arg(long = "case", value_name = "NAME")]
    case: String,
}

/// Configuration for the `stage` command.
#[derive(Args, Debug)]
struct StageCommand {
    /// Stage to run: apply, plan, outputs-validation, or destroy.
    #[arg(value_name = "STAGE")]
    stage: Stage,
    /// Working copy created by `prepare`.
    #[arg(long, value_name = "DIR")]
    workdir: PathBuf,
    /// Case the working copy belongs to.
    #[arg(long = "case", value_name = "NAME")]
    case: String,
    /// Optional config file path (defaults to tfstage.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the suite configuration.
    Validate(ConfigValidateCommand),
}

/// Configuration for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to tfstage.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout(&format!("tfstage {version}"))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Run(command) => command_run(&command),
        Commands::Prepare(command) => command_prepare(&command),
        Commands::Stage(command) => command_stage(&command),
        Commands::Config {
            command,
        } => match command {
            ConfigCommand::Validate(command) => command_config_validate(&command),
        },
    }
}

// ============================================================================
// SECTION: Suite Commands
// ============================================================================

/// Executes the `run` command.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let cases = select_cases(&config, &command.cases)?;
    let lifecycle = lifecycle_for(&config)?;
    let report = run_suite(&lifecycle, &cases, &config.outputs);
    write_suite_report(&report, command.format)?;
    Ok(exit_code(report.is_success()))
}

/// Executes the `prepare` command.
fn command_prepare(command: &PrepareCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let case = find_case(&config, &command.case)?;
    let lifecycle = lifecycle_for(&config)?;
    let options = lifecycle
        .prepare(case)
        .map_err(|err| CliError::new(format!("Failed to prepare case {}: {err}", case.name)))?;
    write_stdout(&options.working_dir.display().to_string())?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `stage` command.
fn command_stage(command: &StageCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let case = find_case(&config, &command.case)?;
    let lifecycle = lifecycle_for(&config)?;
    let workdir = command.workdir.as_path();
    let result = match command.stage {
        Stage::Apply => {
            let options = lifecycle.build_options(case, workdir.to_path_buf());
            lifecycle.apply(&case.name, &options)
        }
        Stage::Plan => lifecycle.plan(&case.name, workdir),
        Stage::OutputsValidation => {
            let outputs = lifecycle.outputs(&case.name, workdir, &config.outputs);
            if let Some(report) = &outputs.report {
                for check in report.checks.iter().filter(|check| !check.passed()) {
                    write_stderr(&format!("{} [{}] failed", check.output_variable, check.assert_type))?;
                }
            }
            outputs.result
        }
        Stage::Destroy => destroy_stage(&lifecycle, case, workdir),
    };
    write_stage_result(command.stage, &result)
}

/// Destroys a working copy, rebuilding its options when none were saved.
/// Unreadable or corrupt saved options fail the stage.
fn destroy_stage(
    lifecycle: &CaseLifecycle,
    case: &TestCase,
    workdir: &Path,
) -> Result<StageOutcome, StageError> {
    let options = match lifecycle.load_options(workdir) {
        Ok(options) => options,
        Err(StageFault::Store(StoreError::Missing(_))) => {
            lifecycle.build_options(case, workdir.to_path_buf())
        }
        Err(fault) => {
            return Err(StageError {
                stage: Stage::Destroy,
                fault,
            });
        }
    };
    lifecycle.destroy(&case.name, &options)
}

/// Prints a single stage result and maps it to an exit code.
fn write_stage_result(
    stage: Stage,
    result: &Result<StageOutcome, StageError>,
) -> CliResult<ExitCode> {
    match result {
        Ok(StageOutcome::Ran) => {
            write_stdout(&format!("stage {stage}: ran"))?;
            Ok(ExitCode::SUCCESS)
        }
        Ok(StageOutcome::Skipped(reason)) => {
            write_stdout(&format!("stage {stage}: skipped ({})", reason.as_str()))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Err(CliError::new(err.to_string())),
    }
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = load_config(command.config.as_deref())?;
    write_stdout("Config valid")?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads configuration, applies environment overrides, and revalidates.
fn load_config(path: Option<&Path>) -> CliResult<SuiteConfig> {
    let load_failed = |err: &dyn std::fmt::Display| CliError::new(format!("Failed to load config: {err}"));
    let mut config = SuiteConfig::load_or_builtin(path).map_err(|err| load_failed(&err))?;
    let overrides = EnvOverrides::load().map_err(|err| load_failed(&err))?;
    config.apply_env(&overrides);
    config.validate().map_err(|err| load_failed(&err))?;
    Ok(config)
}

/// Builds the lifecycle for a loaded config.
fn lifecycle_for(config: &SuiteConfig) -> CliResult<CaseLifecycle> {
    build_lifecycle(config).map_err(|err| CliError::new(err.to_string()))
}

/// Looks up a case by name.
fn find_case<'a>(config: &'a SuiteConfig, name: &str) -> CliResult<&'a TestCase> {
    config.find_case(name).ok_or_else(|| CliError::new(format!("unknown case: {name}")))
}

/// Returns the requested cases in table order, or every case when none
/// were named.
fn select_cases(config: &SuiteConfig, names: &[String]) -> CliResult<Vec<TestCase>> {
    if names.is_empty() {
        return Ok(config.cases.clone());
    }
    if let Some(unknown) = names.iter().find(|name| config.find_case(name).is_none()) {
        return Err(CliError::new(format!("unknown case: {unknown}")));
    }
    Ok(config
        .cases
        .iter()
        .filter(|case| names.iter().any(|name| name == case.name.as_str()))
        .cloned()
        .collect())
}

/// Writes a suite report in the requested format.
fn write_suite_report(report: &SuiteReport, format: ReportFormat) -> CliResult<()> {
    match format {
        ReportFormat::Text => write_stdout(&render_suite(report)),
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(report)
                .map_err(|err| CliError::new(format!("Failed to serialize report: {err}")))?;
            write_stdout(&json)
        }
    }
}

/// Maps a success flag to an exit code.
const fn exit_code(success: bool) -> ExitCode {
    if success { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let help = Cli::command().render_help().to_string();
    write_stdout(&help)
}

/// Writes a line to stdout.
fn write_stdout(message: &str) -> CliResult<()> {
    write_stdout_line(message).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stderr.
fn write_stderr(message: &str) -> CliResult<()> {
    write_stderr_line(message).map_err(|err| CliError::new(output_error("stderr", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("Failed to write to {stream}: {error}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
