// crates/toolscope-cli/src/main.rs
// ============================================================================
// Module: Tool Scope CLI
// Description: Command-line inspection of tool descriptors and schemas.
// Purpose: Summarize tool lists, generate templates, and preview forms.
// Dependencies: clap, serde_json, thiserror, time, toolscope-core, toolscope-session
// ============================================================================

//! ## Overview
//! Offline companion to the session crates: reads tool descriptors and input
//! schemas from files and prints what the engine would synthesize from them.
//! `tools` summarizes a descriptor list, `template` prints the generated
//! argument template, and `form` prints the synthesized field outline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use toolscope_core::build_form;
use toolscope_core::generate_template;
use toolscope_core::normalize_input_schema;
use toolscope_core::parse_input_schema;
use toolscope_core::populate;
use toolscope_core::render_outline;
use toolscope_session::ToolDescriptor;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Terminal error surfaced to the operator.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable failure description.
    message: String,
}

impl CliError {
    /// Creates an error from a rendered message.
    const fn new(message: String) -> Self {
        Self { message }
    }
}

/// Result alias for command handlers.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Command Definitions
// ============================================================================

/// Top-level argument parser.
#[derive(Parser, Debug)]
#[command(
    name = "toolscope",
    about = "Inspect tool descriptors, templates, and synthesized forms",
    disable_help_subcommand = true
)]
struct Cli {
    /// Selected subcommand.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize a tool descriptor list.
    Tools(ToolsCommand),
    /// Generate the argument template for an input schema.
    Template(TemplateCommand),
    /// Render the synthesized form outline for an input schema.
    Form(FormCommand),
}

/// Arguments for `tools`.
#[derive(Args, Debug)]
struct ToolsCommand {
    /// Path to a JSON array of tool descriptors.
    #[arg(long, value_name = "PATH")]
    file: PathBuf,
}

/// Arguments for `template`.
#[derive(Args, Debug)]
struct TemplateCommand {
    /// Path to an input schema JSON document.
    #[arg(long, value_name = "PATH")]
    schema: PathBuf,

    /// Instant for date and time placeholders, as Unix milliseconds.
    /// Defaults to the current time.
    #[arg(long, value_name = "UNIX_MILLIS")]
    at: Option<i64>,
}

/// Arguments for `form`.
#[derive(Args, Debug)]
struct FormCommand {
    /// Path to an input schema JSON document.
    #[arg(long, value_name = "PATH")]
    schema: PathBuf,

    /// JSON argument document merged into the form before rendering.
    #[arg(long, value_name = "JSON")]
    args: Option<String>,
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Binary entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(error) => emit_error(&error),
    }
}

/// Parses arguments and dispatches to the selected command.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Tools(command) => command_tools(&command),
        Commands::Template(command) => command_template(&command),
        Commands::Form(command) => command_form(&command),
    }
}

/// Writes a terminal error to stderr and returns the failure code.
fn emit_error(error: &CliError) -> ExitCode {
    let mut stderr = std::io::stderr().lock();
    let _ = writeln!(stderr, "error: {error}");
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Command Handlers
// ============================================================================

/// Handles `tools`: prints one summary line per descriptor.
fn command_tools(command: &ToolsCommand) -> CliResult<ExitCode> {
    let text = read_file(&command.file)?;
    let descriptors: Vec<ToolDescriptor> = serde_json::from_str(&text).map_err(|error| {
        CliError::new(format!("failed to parse {}: {error}", command.file.display()))
    })?;
    if descriptors.is_empty() {
        write_stdout_line("no tools advertised")?;
        return Ok(ExitCode::SUCCESS);
    }
    for descriptor in &descriptors {
        let schema = normalize_input_schema(&parse_input_schema(descriptor.input_schema.as_ref()));
        let parameters = schema.as_object().map_or(0, |object| object.properties.len());
        let description = descriptor.description.as_deref().unwrap_or("(no description)");
        write_stdout_line(&format!(
            "{}  parameters: {parameters}  {description}",
            descriptor.name
        ))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Handles `template`: prints the generated argument template as pretty JSON.
fn command_template(command: &TemplateCommand) -> CliResult<ExitCode> {
    let schema = load_schema(&command.schema)?;
    let now = resolve_instant(command.at)?;
    let template = generate_template(&schema, now);
    let rendered = serde_json::to_string_pretty(&template)
        .map_err(|error| CliError::new(format!("failed to render template: {error}")))?;
    write_stdout_line(&rendered)?;
    Ok(ExitCode::SUCCESS)
}

/// Handles `form`: prints the synthesized field outline.
fn command_form(command: &FormCommand) -> CliResult<ExitCode> {
    let schema = load_schema(&command.schema)?;
    let mut form = build_form(&schema);
    if let Some(args) = &command.args {
        populate(args, &mut form);
    }
    write_stdout_line(&render_outline(&form))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a file into a string with a path-bearing error.
fn read_file(path: &Path) -> CliResult<String> {
    fs::read_to_string(path)
        .map_err(|error| CliError::new(format!("failed to read {}: {error}", path.display())))
}

/// Reads and normalizes an input schema document.
fn load_schema(path: &Path) -> CliResult<toolscope_core::SchemaNode> {
    let text = read_file(path)?;
    let raw: Value = serde_json::from_str(&text)
        .map_err(|error| CliError::new(format!("failed to parse {}: {error}", path.display())))?;
    Ok(normalize_input_schema(&parse_input_schema(Some(&raw))))
}

/// Resolves the placeholder instant from an optional Unix-millisecond flag.
fn resolve_instant(at: Option<i64>) -> CliResult<OffsetDateTime> {
    match at {
        Some(millis) => {
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
                .map_err(|error| CliError::new(format!("invalid --at value {millis}: {error}")))
        }
        None => Ok(OffsetDateTime::now_utc()),
    }
}

/// Writes one line to stdout.
fn write_stdout_line(line: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{line}")
        .map_err(|error| CliError::new(format!("failed to write output: {error}")))
}
