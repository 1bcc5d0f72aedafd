//! Call Tree Studio CLI
//!
//! Generates call-tree traces from a demo workload and verifies that the
//! text and binary forms of a trace agree.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use calltree_studio::commands::{
    display_format, display_version, execute_generate, execute_verify, print_trace_file,
    validate_args, GenerateArgs, VerifyArgs,
};
use calltree_studio::utils::config::{
    DEFAULT_APPS, DEFAULT_BINARY_PATH, DEFAULT_TEXT_PATH, DEFAULT_WORKERS,
};

/// Call Tree Studio - record, print and verify call trees
#[derive(Parser, Debug)]
#[command(name = "calltree")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the demo workload and write text and binary traces
    Generate {
        /// Output path for the text trees
        #[arg(long, default_value = DEFAULT_TEXT_PATH)]
        text: PathBuf,

        /// Output path for the binary trees
        #[arg(long, default_value = DEFAULT_BINARY_PATH)]
        binary: PathBuf,

        /// Number of demo applications
        #[arg(long, default_value_t = DEFAULT_APPS)]
        apps: usize,

        /// Worker threads
        #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
        workers: usize,

        /// Seed for reproducible traces
        #[arg(long, env = "CALLTREE_SEED")]
        seed: Option<u64>,

        /// Print the generated trees to stdout
        #[arg(long)]
        print: bool,
    },

    /// Check that text and binary traces hold the same trees
    Verify {
        /// Text trace file
        #[arg(long, default_value = DEFAULT_TEXT_PATH)]
        text: PathBuf,

        /// Binary trace file
        #[arg(long, default_value = DEFAULT_BINARY_PATH)]
        binary: PathBuf,

        /// Accept any call site instead of only the demo methods
        #[arg(long)]
        accept_all: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode a text trace file and print it back
    Print {
        /// Text trace file
        #[arg(short, long, default_value = DEFAULT_TEXT_PATH)]
        file: PathBuf,

        /// Accept any call site instead of only the demo methods
        #[arg(long)]
        accept_all: bool,
    },

    /// Describe the text format
    Format,

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Generate {
            text,
            binary,
            apps,
            workers,
            seed,
            print,
        } => {
            let args = GenerateArgs {
                text_path: text,
                binary_path: binary,
                apps,
                workers,
                seed,
                print_trees: print,
            };

            // Validate args first
            validate_args(&args)?;

            execute_generate(args)?;
        }

        Commands::Verify {
            text,
            binary,
            accept_all,
            json,
        } => {
            let args = VerifyArgs {
                text_path: text,
                binary_path: binary,
                accept_all,
                json,
            };

            let report = execute_verify(&args)?;

            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.verdict());
            }

            report.ensure_passed()?;
        }

        Commands::Print { file, accept_all } => {
            let (printed, rejected) = print_trace_file(&file, accept_all)?;
            if rejected > 0 {
                anyhow::bail!(
                    "{} tree(s) could not be decoded ({} printed)",
                    rejected,
                    printed
                );
            }
        }

        Commands::Format => {
            display_format();
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
