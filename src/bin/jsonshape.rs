//! jsonshape CLI
//!
//! Command-line interface for inferring, diffing, validating, and
//! snapshotting JSON Schemas.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use jsonshape::{
    diff_schemas, validate_value, FormatMode, InferOptions, SchemaBuilder, SnapshotStore,
    ValidateError,
};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "jsonshape")]
#[command(about = "Infer, merge, and diff JSON Schemas from example values")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Off,
    On,
    Safe,
}

impl From<FormatArg> for FormatMode {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Off => FormatMode::Off,
            FormatArg::On => FormatMode::On,
            FormatArg::Safe => FormatMode::Safe,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Infer one merged schema from JSON example files
    Infer {
        /// Example files; all are merged into one schema
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Format detection mode
        #[arg(long, value_enum, default_value = "on")]
        format: FormatArg,

        /// Collect up to N distinct examples per path (0 disables)
        #[arg(long, default_value_t = 0)]
        examples: usize,

        /// Explicit $schema URI for the output document
        #[arg(long)]
        schema_uri: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Render a structural diff between two schema documents
    Diff {
        /// Previous schema file
        old: PathBuf,

        /// Current schema file
        new: PathBuf,

        /// Colorize the report with ANSI escapes
        #[arg(long)]
        color: bool,
    },

    /// Validate a payload against a schema
    Validate {
        /// Schema file
        schema: PathBuf,

        /// Payload file to validate
        payload: PathBuf,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Compare a JSON example against a stored schema snapshot
    Snapshot {
        /// JSON example file
        data: PathBuf,

        /// Snapshot name
        #[arg(long, short)]
        name: String,

        /// Snapshot directory
        #[arg(long, default_value = "__snapshots__")]
        dir: PathBuf,

        /// Create or rewrite the snapshot instead of checking against it
        #[arg(long)]
        update: bool,

        /// Format detection mode
        #[arg(long, value_enum, default_value = "on")]
        format: FormatArg,

        /// Collect up to N distinct examples per path (0 disables)
        #[arg(long, default_value_t = 0)]
        examples: usize,

        /// Colorize the diff report
        #[arg(long)]
        color: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Infer {
            files,
            format,
            examples,
            schema_uri,
            output,
            pretty,
        } => run_infer(&files, format, examples, schema_uri, output, pretty),

        Commands::Diff { old, new, color } => run_diff(&old, &new, color),

        Commands::Validate {
            schema,
            payload,
            json,
        } => run_validate(&schema, &payload, json),

        Commands::Snapshot {
            data,
            name,
            dir,
            update,
            format,
            examples,
            color,
        } => run_snapshot(SnapshotArgs {
            data,
            name,
            dir,
            update,
            format,
            examples,
            color,
        }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn build_options(format: FormatArg, examples: usize, schema_uri: Option<String>) -> InferOptions {
    let mut options = InferOptions::new()
        .format_mode(format.into())
        .examples(examples);
    if let Some(uri) = schema_uri {
        options = options.schema_uri(uri);
    }
    options
}

fn infer_schema(files: &[PathBuf], options: InferOptions) -> Result<Value, u8> {
    let mut builder = SchemaBuilder::new(options);
    for file in files {
        let value = read_json(file)?;
        builder.add_value(&value).map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?;
    }
    builder.to_schema().map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn run_infer(
    files: &[PathBuf],
    format: FormatArg,
    examples: usize,
    schema_uri: Option<String>,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let schema = infer_schema(files, build_options(format, examples, schema_uri))?;

    let json_output = if pretty {
        serde_json::to_string_pretty(&schema)
    } else {
        serde_json::to_string(&schema)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_diff(old_path: &Path, new_path: &Path, color: bool) -> Result<(), u8> {
    let old = read_json(old_path)?;
    let new = read_json(new_path)?;

    let diff = diff_schemas(&old, &new);
    if diff.is_empty() {
        println!("No differences.");
        Ok(())
    } else {
        println!("{}", diff.render(color));
        Err(1)
    }
}

fn run_validate(schema_path: &Path, payload_path: &Path, json_output: bool) -> Result<(), u8> {
    let schema = read_json(schema_path)?;
    let payload = read_json(payload_path)?;

    match validate_value(&schema, &payload) {
        Ok(()) => {
            if json_output {
                println!(r#"{{"valid":true}}"#);
            } else {
                println!("Valid");
            }
            Ok(())
        }
        Err(ValidateError::Invalid { errors }) => {
            if json_output {
                let output = serde_json::json!({
                    "valid": false,
                    "errors": errors
                });
                println!("{}", output);
            } else {
                eprintln!("Validation failed:");
                for error in errors {
                    eprintln!("  {}", error);
                }
            }
            Err(1)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(e.exit_code() as u8)
        }
    }
}

struct SnapshotArgs {
    data: PathBuf,
    name: String,
    dir: PathBuf,
    update: bool,
    format: FormatArg,
    examples: usize,
    color: bool,
}

fn run_snapshot(args: SnapshotArgs) -> Result<(), u8> {
    let data = read_json(&args.data)?;
    let options = build_options(args.format, args.examples, None);
    let mut builder = SchemaBuilder::new(options);
    builder.add_value(&data).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let current = builder.to_schema().map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let mut store = SnapshotStore::open(&args.dir).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let stored = store.load(&args.name).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    match stored {
        None => {
            if !args.update {
                eprintln!(
                    "Error: schema `{}` not found. Run with --update to create it.",
                    args.name
                );
                return Err(1);
            }
            store.save(&args.name, &current).map_err(|e| {
                eprintln!("Error: {}", e);
                e.exit_code() as u8
            })?;
            println!("New schema `{}` created.", args.name);
            Ok(())
        }
        Some(previous) => {
            if previous == current {
                check_payload(&previous, &data, &args.name)?;
                println!("Schema `{}` unchanged.", args.name);
                return Ok(());
            }

            let report = diff_schemas(&previous, &current).render(args.color);
            if args.update {
                store.save(&args.name, &current).map_err(|e| {
                    eprintln!("Error: {}", e);
                    e.exit_code() as u8
                })?;
                println!("Schema `{}` updated.\n\n{}", args.name, report);
                Ok(())
            } else {
                // Uncommitted drift: the payload must still satisfy the
                // stored schema, otherwise the snapshot check fails.
                match validate_value(&previous, &data) {
                    Ok(()) => {
                        println!(
                            "Schema `{}` has uncommitted changes:\n\n{}",
                            args.name, report
                        );
                        Ok(())
                    }
                    Err(ValidateError::Invalid { errors }) => {
                        eprintln!("{}\n\nValidation failed for `{}`:", report, args.name);
                        for error in errors {
                            eprintln!("  {}", error);
                        }
                        Err(1)
                    }
                    Err(e) => {
                        eprintln!("Error: {}", e);
                        Err(e.exit_code() as u8)
                    }
                }
            }
        }
    }
}

fn check_payload(schema: &Value, payload: &Value, name: &str) -> Result<(), u8> {
    match validate_value(schema, payload) {
        Ok(()) => Ok(()),
        Err(ValidateError::Invalid { errors }) => {
            eprintln!("Validation failed for `{}`:", name);
            for error in errors {
                eprintln!("  {}", error);
            }
            Err(1)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(e.exit_code() as u8)
        }
    }
}

fn read_json(path: &Path) -> Result<Value, u8> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        eprintln!("Error reading {}: {}", path.display(), e);
        3u8
    })?;
    serde_json::from_str(&text).map_err(|e| {
        eprintln!("Error: invalid JSON in {}: {}", path.display(), e);
        2u8
    })
}
