// crates/sortkey-cli/src/main.rs
// ============================================================================
// Module: Sort Key CLI Entry Point
// Description: Command dispatcher for sort-key layout and snapshot workflows.
// Purpose: Inspect layouts, persist snapshots, and check restore compatibility.
// Dependencies: clap, sortkey-codec, sortkey-config, sortkey-types, serde, thiserror.
// ============================================================================

//! ## Overview
//! The `sortkey` CLI resolves sort-key layouts from schema and sort order
//! JSON files, writes and inspects versioned configuration snapshots, and
//! decides whether state persisted under one snapshot may be restored under
//! another. File inputs are untrusted and read with hard size limits.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;
pub(crate) mod restore_policy;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use sortkey_codec::ConfigurationSnapshot;
use sortkey_codec::FormatVersion;
use sortkey_codec::RestoredSnapshot;
use sortkey_codec::SortKeyCodec;
use sortkey_codec::plan_restore_with_limits;
use sortkey_config::SortKeyConfig;
use sortkey_types::Schema;
use sortkey_types::SortOrder;
use sortkey_types::text_to_schema;
use sortkey_types::text_to_sort_order;
use thiserror::Error;

use crate::restore_policy::RestoreDecision;
use crate::restore_policy::apply_policy;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a schema or sort order JSON input.
const MAX_DEFINITION_BYTES: usize = 1024 * 1024;
/// Maximum size of a snapshot file input.
const MAX_SNAPSHOT_BYTES: usize = 8 * 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "sortkey", version, disable_help_subcommand = true)]
struct Cli {
    /// Optional config file path (defaults to sortkey.toml or `SORTKEY_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the resolved sort-key layout.
    Layout(LayoutCommand),
    /// Configuration snapshot utilities.
    Snapshot {
        /// Selected snapshot subcommand.
        #[command(subcommand)]
        command: SnapshotCommand,
    },
    /// Decide whether persisted state may be restored.
    Resolve(ResolveCommand),
}

/// Schema and sort order inputs.
#[derive(Args, Debug)]
struct DefinitionArgs {
    /// Path to the schema JSON file.
    #[arg(long, value_name = "PATH")]
    schema: PathBuf,
    /// Path to the sort order JSON file.
    #[arg(long, value_name = "PATH")]
    sort_order: PathBuf,
}

/// Arguments for layout resolution.
#[derive(Args, Debug)]
struct LayoutCommand {
    /// Schema and sort order inputs.
    #[command(flatten)]
    definition: DefinitionArgs,
}

/// Snapshot subcommands.
#[derive(Subcommand, Debug)]
enum SnapshotCommand {
    /// Write a versioned configuration snapshot.
    Write(SnapshotWriteCommand),
    /// Print the contents of a versioned snapshot.
    Inspect(SnapshotInspectCommand),
}

/// Arguments for snapshot writing.
#[derive(Args, Debug)]
struct SnapshotWriteCommand {
    /// Schema and sort order inputs.
    #[command(flatten)]
    definition: DefinitionArgs,
    /// Output snapshot path.
    #[arg(long, value_name = "PATH")]
    out: PathBuf,
    /// Tuple format version (overrides `codec.format_version`).
    #[arg(long, value_name = "VERSION")]
    format_version: Option<u32>,
}

/// Arguments for snapshot inspection.
#[derive(Args, Debug)]
struct SnapshotInspectCommand {
    /// Snapshot path.
    #[arg(value_name = "FILE")]
    path: PathBuf,
}

/// Arguments for restore resolution.
#[derive(Args, Debug)]
struct ResolveCommand {
    /// Snapshot persisted alongside the existing state.
    #[arg(long, value_name = "PATH")]
    old: PathBuf,
    /// Snapshot of the current configuration.
    #[arg(long, value_name = "PATH")]
    new: PathBuf,
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
    let config = SortKeyConfig::load_or_default(cli.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    match cli.command {
        Commands::Layout(command) => command_layout(&command),
        Commands::Snapshot {
            command,
        } => match command {
            SnapshotCommand::Write(command) => command_snapshot_write(&command, &config),
            SnapshotCommand::Inspect(command) => command_snapshot_inspect(&command, &config),
        },
        Commands::Resolve(command) => command_resolve(&command, &config),
    }
}

// ============================================================================
// SECTION: Layout Command
// ============================================================================

/// One layout position in command output.
#[derive(Debug, Serialize)]
struct LayoutEntry {
    /// Tuple position.
    position: usize,
    /// Source field id.
    source_id: i32,
    /// Source field name.
    source_name: String,
    /// Transform label.
    transform: String,
    /// Encoded result type.
    result_type: String,
}

/// Executes the layout command.
fn command_layout(command: &LayoutCommand) -> CliResult<ExitCode> {
    let codec = build_codec(&command.definition, FormatVersion::CURRENT)?;
    let entries = layout_entries(&codec);
    write_json(&json!({
        "order_id": codec.sort_order().order_id,
        "fields": entries,
    }))?;
    Ok(ExitCode::SUCCESS)
}

/// Builds layout output entries for a codec.
fn layout_entries(codec: &SortKeyCodec) -> Vec<LayoutEntry> {
    codec
        .sort_order()
        .fields
        .iter()
        .zip(codec.layout())
        .enumerate()
        .map(|(position, (sort_field, layout_field))| LayoutEntry {
            position,
            source_id: layout_field.field_id,
            source_name: codec
                .schema()
                .find_field(layout_field.field_id)
                .map(|field| field.name.clone())
                .unwrap_or_default(),
            transform: sort_field.transform.to_string(),
            result_type: layout_field.result_type.to_string(),
        })
        .collect()
}

// ============================================================================
// SECTION: Snapshot Commands
// ============================================================================

/// Executes the snapshot write command.
fn command_snapshot_write(
    command: &SnapshotWriteCommand,
    config: &SortKeyConfig,
) -> CliResult<ExitCode> {
    let version = match command.format_version {
        Some(value) => FormatVersion::try_from(value).map_err(|err| CliError::new(err.to_string()))?,
        None => config.codec.format_version,
    };
    let codec = build_codec(&command.definition, version)?;
    let snapshot = codec.snapshot_configuration();
    let bytes = snapshot
        .to_versioned_bytes()
        .map_err(|err| CliError::new(format!("failed to write snapshot: {err}")))?;
    fs::write(&command.out, &bytes).map_err(|err| {
        CliError::new(format!("failed to write {}: {err}", command.out.display()))
    })?;
    let fingerprint = snapshot
        .fingerprint()
        .map_err(|err| CliError::new(format!("failed to fingerprint snapshot: {err}")))?;
    write_json(&json!({
        "path": command.out.display().to_string(),
        "format_version": version.as_u32(),
        "fingerprint": fingerprint.to_string(),
    }))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the snapshot inspect command.
fn command_snapshot_inspect(
    command: &SnapshotInspectCommand,
    config: &SortKeyConfig,
) -> CliResult<ExitCode> {
    let restored = read_snapshot(&command.path, config)?;
    let output = match &restored {
        RestoredSnapshot::SortKey(snapshot) => {
            let (schema, sort_order) =
                snapshot.require().map_err(|err| CliError::new(err.to_string()))?;
            let fingerprint = snapshot
                .fingerprint()
                .map_err(|err| CliError::new(format!("failed to fingerprint snapshot: {err}")))?;
            json!({
                "kind": restored.kind(),
                "version": restored.version(),
                "fingerprint": fingerprint.to_string(),
                "schema": to_json_value(schema)?,
                "sort_order": to_json_value(sort_order)?,
            })
        }
        RestoredSnapshot::Foreign {
            kind,
            version,
        } => json!({
            "kind": kind,
            "version": version,
        }),
    };
    write_json(&output)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Resolve Command
// ============================================================================

/// Executes the resolve command.
fn command_resolve(command: &ResolveCommand, config: &SortKeyConfig) -> CliResult<ExitCode> {
    let old = read_snapshot(&command.old, config)?;
    let RestoredSnapshot::SortKey(new) = read_snapshot(&command.new, config)? else {
        return Err(CliError::new(format!(
            "{} is not a sort-key snapshot",
            command.new.display()
        )));
    };
    let sink = config
        .audit
        .open_sink()
        .map_err(|err| CliError::new(format!("failed to open audit sink: {err}")))?;
    let plan = plan_restore_with_limits(&old, &new, config.codec.limits(), sink.as_ref())
        .map_err(|err| CliError::new(format!("failed to plan restore: {err}")))?;
    let decision = apply_policy(&plan, &config.restore);
    write_json(&decision_output(&decision))?;
    if decision.is_failure() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Renders a restore decision as JSON.
fn decision_output(decision: &RestoreDecision) -> Value {
    json!({
        "decision": decision.label(),
        "reason": decision.reason(),
    })
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads an input file, mapping failures to CLI errors.
fn read_input(path: &Path, kind: &str, max_bytes: usize) -> CliResult<Vec<u8>> {
    read_bytes_with_limit(path, max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(format!("failed to read {kind} {}: {err}", path.display()))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!(
            "{kind} {} exceeds size limit ({size} > {limit})",
            path.display()
        )),
    })
}

/// Reads a UTF-8 text input file.
fn read_text_input(path: &Path, kind: &str) -> CliResult<String> {
    let bytes = read_input(path, kind, MAX_DEFINITION_BYTES)?;
    String::from_utf8(bytes)
        .map_err(|_| CliError::new(format!("{kind} {} must be utf-8", path.display())))
}

/// Loads a schema and sort order and builds a codec for them.
fn build_codec(definition: &DefinitionArgs, version: FormatVersion) -> CliResult<SortKeyCodec> {
    let schema = load_schema(&definition.schema)?;
    let sort_order = load_sort_order(&definition.sort_order)?;
    let bound = sort_order.bind(&schema).map_err(|err| CliError::new(err.to_string()))?;
    SortKeyCodec::with_version(schema, bound, version).map_err(|err| CliError::new(err.to_string()))
}

/// Loads a schema JSON file.
fn load_schema(path: &Path) -> CliResult<Schema> {
    let text = read_text_input(path, "schema")?;
    text_to_schema(&text).map_err(|err| CliError::new(err.to_string()))
}

/// Loads a sort order JSON file.
fn load_sort_order(path: &Path) -> CliResult<SortOrder> {
    let text = read_text_input(path, "sort order")?;
    text_to_sort_order(&text).map_err(|err| CliError::new(err.to_string()))
}

/// Reads a versioned snapshot file.
fn read_snapshot(path: &Path, config: &SortKeyConfig) -> CliResult<RestoredSnapshot> {
    let bytes = read_input(path, "snapshot", MAX_SNAPSHOT_BYTES)?;
    ConfigurationSnapshot::read_versioned(&mut bytes.as_slice(), config.codec.max_text_bytes)
        .map_err(|err| CliError::new(format!("failed to read snapshot {}: {err}", path.display())))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Converts a serializable value to JSON.
fn to_json_value<T: Serialize>(value: &T) -> CliResult<Value> {
    serde_json::to_value(value).map_err(|err| CliError::new(format!("failed to render json: {err}")))
}

/// Writes canonical JSON to stdout followed by a newline.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(format!("failed to render json: {err}")))?;
    bytes.push(b'\n');
    let mut stdout = std::io::stdout();
    stdout
        .write_all(&bytes)
        .map_err(|err| CliError::new(format!("failed to write to stdout: {err}")))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
