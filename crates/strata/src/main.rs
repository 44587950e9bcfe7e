use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use strata::{CheckArgs, init_tracing, run_check, run_types};

/// Exit code for configuration, I/O and other unexpected failures.
const EXIT_FAILURE: u8 = 3;

/// Strata CLI - check JSON documents against nested type configurations
#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Check JSON documents against nested type configurations", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging (overridden by STRATA_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Subcommand)]
enum Commands {
    /// Parse, validate and re-serialize a JSON document
    Check {
        /// Type configuration (strata.toml or strata.json)
        #[arg(short, long)]
        config: PathBuf,
        /// Node type to read the document as (defaults to the configured root)
        #[arg(short = 't', long = "type")]
        type_name: Option<String>,
        /// Skip validation of nested nodes and groups
        #[arg(long)]
        no_nested: bool,
        /// JSON document to check, or - for stdin
        input: PathBuf,
    },
    /// List the types declared in a configuration
    Types {
        /// Type configuration (strata.toml or strata.json)
        #[arg(short, long)]
        config: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let result = match cli.command {
        Commands::Check {
            config,
            type_name,
            no_nested,
            input,
        } => run_check(&CheckArgs {
            config,
            type_name,
            no_nested,
            input,
        }),
        Commands::Types { config } => run_types(&config),
    };

    match result {
        Ok(None) => ExitCode::SUCCESS,
        Ok(Some(code)) => ExitCode::from(code),
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
