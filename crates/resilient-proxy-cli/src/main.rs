// crates/resilient-proxy-cli/src/main.rs
// ============================================================================
// Module: Resilient Proxy CLI Entry Point
// Description: Command dispatcher for proxy generation workflows.
// Purpose: Generate, verify, and list resilient proxies from assembly metadata.
// Dependencies: clap, resilient-proxy-config, resilient-proxy-core, resilient-proxy-gen
// ============================================================================

//! ## Overview
//! The `resilient-proxy` binary renders one proxy source file per contract of
//! an assembly metadata document (`generate`), verifies that previously
//! generated files are current (`check`), and lists the contracts a document
//! exposes (`list`). Command-line arguments override `resilient-proxy.toml`.
//! Structured events go to stderr as JSON lines; results go to stdout.
//!
//! ### Security Posture
//! Metadata and config inputs are untrusted; both are size-limited and parse
//! failures fail closed. Nothing is written for a contract that fails its
//! preconditions.

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
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use resilient_proxy_config::ProxyGenConfig;
use resilient_proxy_core::EventSink;
use resilient_proxy_core::Level;
use resilient_proxy_core::LogSink;
use resilient_proxy_gen::AssemblyMetadata;
use resilient_proxy_gen::BatchReport;
use resilient_proxy_gen::ProxyGenerator;
use resilient_proxy_gen::Synthesizer;
use resilient_proxy_gen::csharp::is_qualified_name;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// CLI arguments for resilient proxy generation.
#[derive(Debug, Parser)]
#[command(
    name = "resilient-proxy",
    version,
    about = "Generate resilient proxy classes from assembly metadata."
)]
struct Cli {
    /// Minimum severity of events written to stderr.
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    log_level: LogLevel,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Supported CLI subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Generate one proxy source file per contract.
    Generate(GenerateArgs),
    /// Verify generated files match the current generator output.
    Check(GenerateArgs),
    /// List contract-shaped types and their generated class names.
    List(ListArgs),
}

/// Arguments shared by `generate` and `check`.
#[derive(Args, Debug, Default)]
struct GenerateArgs {
    /// Namespace for generated classes.
    #[arg(long, value_name = "NS")]
    namespace: Option<String>,
    /// Assembly metadata JSON document.
    #[arg(long, value_name = "FILE")]
    source_assembly: Option<PathBuf>,
    /// Directory generated sources are written to.
    #[arg(long, value_name = "DIR")]
    target_folder: Option<PathBuf>,
    /// Restrict generation to one fully-qualified contract name.
    #[arg(long, value_name = "FULL_NAME")]
    contract: Option<String>,
    /// Configuration file (defaults to `resilient-proxy.toml`).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Arguments for `list`.
#[derive(Args, Debug, Default)]
struct ListArgs {
    /// Assembly metadata JSON document.
    #[arg(long, value_name = "FILE")]
    source_assembly: Option<PathBuf>,
    /// Configuration file (defaults to `resilient-proxy.toml`).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Event severities selectable on the command line.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum LogLevel {
    /// Progress and results.
    Info,
    /// Recovered or degraded conditions.
    Warn,
    /// Failures only.
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Info => Self::Info,
            LogLevel::Warn => Self::Warn,
            LogLevel::Error => Self::Error,
        }
    }
}

/// Fully resolved inputs for `generate` and `check`.
#[derive(Debug)]
struct GenerationInputs {
    /// Namespace for generated classes.
    namespace: String,
    /// Assembly metadata document.
    source_assembly: PathBuf,
    /// Output directory.
    target_folder: PathBuf,
    /// Optional single-contract selection.
    contract: Option<String>,
    /// Synthesizer built from configuration.
    synthesizer: Synthesizer,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// Result alias for CLI operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let sink: Arc<dyn EventSink> =
        Arc::new(LogSink::with_min_level(std::io::stderr(), cli.log_level.into()));
    match cli.command {
        Command::Generate(args) => command_generate(args, sink),
        Command::Check(args) => command_check(args, sink),
        Command::List(args) => command_list(&args),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `generate` command.
fn command_generate(args: GenerateArgs, sink: Arc<dyn EventSink>) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let inputs = resolve_inputs(args, &config)?;
    let generator = open_generator(&inputs, sink)?;
    let report = generator
        .write_all(&inputs.target_folder)
        .map_err(|err| CliError::new(format!("generation failed: {err}")))?;
    for path in &report.outputs {
        write_stdout(&format!("generated {}", path.display()))?;
    }
    finish_report(&report, "failed to generate")
}

/// Executes the `check` command.
fn command_check(args: GenerateArgs, sink: Arc<dyn EventSink>) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let inputs = resolve_inputs(args, &config)?;
    let generator = open_generator(&inputs, sink)?;
    let report = generator.check_all(&inputs.target_folder);
    for path in &report.outputs {
        write_stdout(&format!("up to date {}", path.display()))?;
    }
    finish_report(&report, "out of date")
}

/// Executes the `list` command.
fn command_list(args: &ListArgs) -> CliResult<()> {
    let config = load_config(args.config.as_deref())?;
    let source = args
        .source_assembly
        .clone()
        .or_else(|| config.generator.source_assembly.clone())
        .ok_or_else(|| missing_argument("--source-assembly", "generator.source_assembly"))?;
    let metadata = AssemblyMetadata::read(&source)
        .map_err(|err| CliError::new(format!("failed to load {}: {err}", source.display())))?;
    let synthesizer = config.to_synthesizer();
    let mut failed = 0_usize;
    for contract in metadata.contracts() {
        let full_name = contract.full_name();
        match synthesizer.naming().generated_name(&contract.name) {
            Ok(class_name) => write_stdout(&format!("{full_name} -> {class_name}"))?,
            Err(err) => {
                failed += 1;
                write_stderr(&format!("{full_name}: {err}"))?;
            }
        }
    }
    if failed > 0 {
        return Err(CliError::new(format!("{failed} contract name(s) violate the naming rule")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Input Resolution
// ============================================================================

/// Loads configuration, mapping failures to CLI errors.
fn load_config(path: Option<&Path>) -> CliResult<ProxyGenConfig> {
    ProxyGenConfig::load(path).map_err(|err| CliError::new(err.to_string()))
}

/// Merges command-line arguments over configuration values.
fn resolve_inputs(args: GenerateArgs, config: &ProxyGenConfig) -> CliResult<GenerationInputs> {
    let namespace = args
        .namespace
        .or_else(|| config.generator.namespace.clone())
        .ok_or_else(|| missing_argument("--namespace", "generator.namespace"))?;
    if !is_qualified_name(&namespace) {
        return Err(CliError::new(format!("invalid namespace: '{namespace}'")));
    }
    let source_assembly = args
        .source_assembly
        .or_else(|| config.generator.source_assembly.clone())
        .ok_or_else(|| missing_argument("--source-assembly", "generator.source_assembly"))?;
    let target_folder = args
        .target_folder
        .or_else(|| config.output.target_folder.clone())
        .ok_or_else(|| missing_argument("--target-folder", "output.target_folder"))?;
    Ok(GenerationInputs {
        namespace,
        source_assembly,
        target_folder,
        contract: args.contract,
        synthesizer: config.to_synthesizer(),
    })
}

/// Loads the metadata document and configures the batch generator.
fn open_generator(
    inputs: &GenerationInputs,
    sink: Arc<dyn EventSink>,
) -> CliResult<ProxyGenerator> {
    let generator = ProxyGenerator::load(
        &inputs.source_assembly,
        inputs.namespace.clone(),
        inputs.synthesizer.clone(),
    )
    .map_err(|err| {
        CliError::new(format!("failed to load {}: {err}", inputs.source_assembly.display()))
    })?;
    Ok(generator.only(inputs.contract.clone()).with_sink(sink))
}

/// Builds the error for a required input supplied by neither source.
fn missing_argument(flag: &str, config_key: &str) -> CliError {
    CliError::new(format!("missing required argument {flag} (or {config_key} in config)"))
}

// ============================================================================
// SECTION: Reporting
// ============================================================================

/// Prints per-contract failures and converts them into the exit status.
fn finish_report(report: &BatchReport, verb: &str) -> CliResult<()> {
    for failure in &report.failures {
        write_stderr(&format!("{}: {}", failure.contract, failure.error))?;
    }
    if report.is_success() {
        return Ok(());
    }
    let total = report.outputs.len() + report.failures.len();
    Err(CliError::new(format!("{} of {total} contract(s) {verb}", report.failures.len())))
}

/// Writes a line to stdout, mapping failures to CLI errors.
fn write_stdout(message: &str) -> CliResult<()> {
    write_stdout_line(message)
        .map_err(|err| CliError::new(format!("failed to write to stdout: {err}")))
}

/// Writes a line to stderr, mapping failures to CLI errors.
fn write_stderr(message: &str) -> CliResult<()> {
    write_stderr_line(message)
        .map_err(|err| CliError::new(format!("failed to write to stderr: {err}")))
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

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
