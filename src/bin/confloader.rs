use std::collections::BTreeMap;
use std::env;
use std::ffi::OsString;
#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::path::PathBuf;
use std::process::{self, Command};

use clap::{Args, Parser, Subcommand};
use confloader::{EnvLoader, Error, load_yaml, merge_first_wins};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Load `.env` and YAML configuration files.
#[derive(Debug, Parser)]
#[command(name = "confloader", version)]
struct Cli {
    /// Increase log verbosity (repeatable). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Print the merged entries of dotenv files as JSON.
    Env(EnvArgs),
    /// Print a YAML file as JSON (`null` when the file is missing).
    Yaml(YamlArgs),
    /// Run a command with dotenv variables added to its environment.
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct EnvArgs {
    /// Dotenv files, later files win. Defaults to `.env`.
    files: Vec<PathBuf>,

    /// Fail when a file is missing.
    #[arg(long)]
    required: bool,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Args)]
struct YamlArgs {
    file: PathBuf,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Dotenv file path(s). Repeat or pass comma-separated paths.
    #[arg(short, long = "file", value_delimiter = ',')]
    files: Vec<PathBuf>,

    /// Fail when a file is missing.
    #[arg(long)]
    required: bool,

    /// Command to execute followed by its arguments.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<OsString>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        CliCommand::Env(args) => execute_env(args),
        CliCommand::Yaml(args) => execute_yaml(args),
        CliCommand::Run(args) => execute_run(args),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("confloader: {err}");
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn execute_env(args: EnvArgs) -> Result<i32, String> {
    let table = EnvLoader::new()
        .paths(&args.files)
        .required(args.required)
        .parse_only()
        .map_err(format_loader_error)?;
    print_json(&table, args.pretty)?;
    Ok(0)
}

fn execute_yaml(args: YamlArgs) -> Result<i32, String> {
    let tree = load_yaml(&args.file).map_err(format_loader_error)?;
    print_json(&tree, args.pretty)?;
    Ok(0)
}

fn execute_run(args: RunArgs) -> Result<i32, String> {
    let Some((program, program_args)) = args.command.split_first() else {
        return Err("missing command after `run`".to_owned());
    };

    let env_snapshot = snapshot_process_env();
    let table = EnvLoader::new()
        .paths(&args.files)
        .required(args.required)
        .parse_only()
        .map_err(format_loader_error)?;

    let mut command = Command::new(program);
    command.args(program_args);
    for (key, value) in merge_first_wins(&env_snapshot, &table) {
        if !env_snapshot.contains_key(&key) {
            command.env(key, value);
        }
    }

    execute_command(command, program)
}

fn snapshot_process_env() -> BTreeMap<String, String> {
    env::vars_os()
        .map(|(key, value)| {
            (
                key.to_string_lossy().into_owned(),
                value.to_string_lossy().into_owned(),
            )
        })
        .collect()
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<(), String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|err| format!("failed to render JSON: {err}"))?;
    println!("{rendered}");
    Ok(())
}

#[cfg(unix)]
fn execute_command(mut command: Command, program: &OsString) -> Result<i32, String> {
    let err = command.exec();
    Err(format!(
        "failed to execute `{}`: {err}",
        program.to_string_lossy()
    ))
}

#[cfg(not(unix))]
fn execute_command(mut command: Command, program: &OsString) -> Result<i32, String> {
    let status = command
        .status()
        .map_err(|err| format!("failed to execute `{}`: {err}", program.to_string_lossy()))?;
    Ok(status.code().unwrap_or(1))
}

fn format_loader_error(err: Error) -> String {
    err.to_string()
}
