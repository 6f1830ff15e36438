//! CLI entrypoint for the QRVMC loader harness.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use serde::Serialize;

use qrvmc_abi::{Loader, telemetry};
use qrvmc_core::{LoaderError, derive_create_symbol, parse_configuration};
use qrvmc_harness::HarnessError;
use qrvmc_harness::report::{config_report, inspect_vm, symbol_report};
use qrvmc_harness::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};

/// Loads, inspects, and configures QRVMC virtual machines.
#[derive(Debug, Parser)]
#[command(name = "qrvmc-harness")]
#[command(about = "Tooling harness for the QRVMC dynamic VM loader")]
struct Cli {
    /// Write a JSONL record of the loader call to this file.
    #[arg(long, global = true)]
    log: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a VM from a configuration string, report on it, and destroy it.
    Load {
        /// `<path>[,<name>[=<value>]]*`
        #[arg(long)]
        config: String,
        /// Include process-wide loader counters in the report.
        #[arg(long)]
        stats: bool,
    },
    /// Print the create-function symbols expected in a library.
    Symbol {
        /// Library path.
        path: String,
    },
    /// Print the tokenized form of a configuration string.
    Parse {
        /// `<path>[,<name>[=<value>]]*`
        config: String,
    },
}

fn print_json(value: &impl Serialize) -> Result<(), HarnessError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Logs `entry` with the outcome of `result` when a log sink is configured.
fn record<T>(
    emitter: Option<&mut LogEmitter>,
    entry: LogEntry,
    result: &Result<T, LoaderError>,
) -> Result<(), HarnessError> {
    let Some(emitter) = emitter else {
        return Ok(());
    };
    let entry = match result {
        Ok(_) => entry.with_outcome(Outcome::Pass),
        Err(err) => entry.with_loader_error(err),
    };
    emitter.emit_entry(entry)?;
    emitter.flush()?;
    Ok(())
}

fn run(cli: Cli) -> Result<(), HarnessError> {
    let run_id = format!("run-{}", std::process::id());
    let mut emitter = match &cli.log {
        Some(path) => Some(LogEmitter::to_file(path, "qrvmc-harness", &run_id)?),
        None => None,
    };

    match cli.command {
        Command::Load { config, stats } => {
            let started = Instant::now();
            let result = inspect_vm(&Loader::system(), &config);
            let elapsed = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);

            let mut entry = LogEntry::new("", LogLevel::Info, "load_and_configure")
                .with_config(config.as_str())
                .with_latency_ns(elapsed);
            if let Ok(parsed) = parse_configuration(config.as_bytes()) {
                entry = entry
                    .with_path(String::from_utf8_lossy(parsed.path))
                    .with_symbol(String::from_utf8_lossy(&derive_create_symbol(parsed.path)));
            }
            if let Ok(report) = &result {
                entry = entry.with_details(serde_json::to_value(report)?);
            }
            record(emitter.as_mut(), entry, &result)?;

            print_json(&result?)?;
            if stats {
                let snapshot = telemetry::snapshot();
                print_json(&serde_json::json!({
                    "loads": snapshot.loads,
                    "creates": snapshot.creates,
                    "configures": snapshot.configures,
                    "failures": snapshot.failures(),
                }))?;
            }
        }
        Command::Symbol { path } => {
            let result = symbol_report(&path);
            let mut entry = LogEntry::new("", LogLevel::Info, "derive_symbol").with_path(path.as_str());
            if let Ok(report) = &result {
                entry = entry.with_symbol(report.symbol.as_str());
            }
            record(emitter.as_mut(), entry, &result)?;
            print_json(&result?)?;
        }
        Command::Parse { config } => {
            let result = config_report(&config);
            let entry = LogEntry::new("", LogLevel::Info, "parse_configuration")
                .with_config(config.as_str());
            record(emitter.as_mut(), entry, &result)?;
            print_json(&result?)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}
