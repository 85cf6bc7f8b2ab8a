//! Gauge command line
//!
//! One-shot conversions from the shell, or an MCP stdio server when run
//! with `serve` (the default).

mod server;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gauge_core::{GaugeError, Value};
use gauge_plugin::EvalContext;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser)]
#[command(name = "gauge")]
#[command(about = "Unit converter with explained formulas", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the measurement categories
    Categories,
    /// List the units of a category
    Units {
        /// Category name, e.g. "length"
        category: String,
    },
    /// Convert a value between two units
    Convert {
        /// Value to convert (zero or greater)
        #[arg(allow_negative_numbers = true)]
        value: String,
        /// Source unit
        from: String,
        /// Target unit
        to: String,
        /// Category both units belong to
        #[arg(long, short)]
        category: String,
    },
    /// Convert a value into every unit of its category
    Table {
        /// Value to convert (zero or greater)
        #[arg(allow_negative_numbers = true)]
        value: String,
        /// Source unit
        from: String,
        /// Category of the source unit
        #[arg(long, short)]
        category: String,
    },
    /// Run the MCP server on stdin/stdout
    Serve,
}

/// Invalid category, unit or value. Usage errors exit with clap's 2.
const EXIT_INVALID_INPUT: u8 = 1;

fn init_logging(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve);

    init_logging(match command {
        Commands::Serve => "info",
        _ => "warn",
    });

    let ctx = EvalContext::new(Arc::new(gauge_units::standard_registry()));

    match run(&ctx, command) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Process exit status of a command
fn run(ctx: &EvalContext, command: Commands) -> Result<u8> {
    if let Commands::Serve = command {
        server::serve(ctx)?;
        return Ok(0);
    }

    match render(ctx, &command) {
        Ok(output) => {
            println!("{}", output);
            Ok(0)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            Ok(EXIT_INVALID_INPUT)
        }
    }
}

/// Text output of a one-shot command
fn render(ctx: &EvalContext, command: &Commands) -> Result<String, GaugeError> {
    let (function, args) = match command {
        Commands::Categories => ("categories", Vec::new()),
        Commands::Units { category } => ("units_of", vec![Value::from(category.as_str())]),
        Commands::Convert { value, from, to, category } => ("convert", vec![
            Value::from(value.as_str()),
            Value::from(from.as_str()),
            Value::from(to.as_str()),
            Value::from(category.as_str()),
        ]),
        Commands::Table { value, from, category } => ("convert_all", vec![
            Value::from(value.as_str()),
            Value::from(from.as_str()),
            Value::from(category.as_str()),
        ]),
        Commands::Serve => return Err(GaugeError::internal("serve has no text output")),
    };

    debug!(function, args = args.len(), "running command");
    let result = ctx.registry.call_function(function, &args, ctx);
    if let Value::Error(e) = result {
        return Err(e);
    }

    let output = match command {
        Commands::Convert { .. } => format!(
            "{}\nFormula: {}",
            result.get("summary"),
            result.get("formula")
        ),
        Commands::Table { .. } => result.as_list().unwrap_or_default().iter()
            .map(|row| format!("{} {}", row.get("display"), row.get("unit")))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => result.as_list().unwrap_or_default().iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(output)
}
