//! Binary entry point for itemgate.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
#![allow(clippy::multiple_crate_versions)]

use clap::{Parser, Subcommand};
use itemgate::cli::{ConfigCommand, ListCommand, OutputFormat, SaveCommand};
use itemgate::observability::{self, InitOptions, ObservabilityConfig, ObservabilityHandle};
use itemgate::{ItemgateConfig, SaveOrchestrator, create_backend};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Itemgate - deduplicating save path for content-identified items.
#[derive(Parser)]
#[command(name = "itemgate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "ITEMGATE_CONFIG")]
    config: Option<PathBuf>,

    /// Print a Prometheus metrics snapshot to stderr before exiting.
    #[arg(long, global = true)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Save one or more items; identical values are saved at most once.
    Save {
        /// Content values to save (saved concurrently).
        #[arg(required = true)]
        contents: Vec<String>,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List all stored items.
    List {
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Show the effective configuration.
        #[arg(long)]
        show: bool,
    },
}

/// Main entry point.
fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match ItemgateConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let mut observability_config = match observability::build_config(
        Some(&config.observability),
        InitOptions {
            verbose: cli.verbose,
        },
    ) {
        Ok(observability_config) => observability_config,
        Err(e) => {
            eprintln!("Invalid observability settings: {e}");
            return ExitCode::FAILURE;
        },
    };
    if cli.print_metrics {
        observability_config.metrics.enabled = true;
    }

    let handle = match observability::init(observability_config.clone()) {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("Failed to initialize observability: {e}");
            return ExitCode::FAILURE;
        },
    };

    let code = match run_command(&cli, &config, &observability_config) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    };

    if cli.print_metrics {
        print_metrics(&handle);
    }

    code
}

/// Runs the selected command.
fn run_command(
    cli: &Cli,
    config: &ItemgateConfig,
    observability_config: &ObservabilityConfig,
) -> itemgate::Result<ExitCode> {
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Commands::Save { contents, json } => {
            let orchestrator = SaveOrchestrator::new(create_backend(config)?);
            let all_saved = SaveCommand::new(OutputFormat::from_json_flag(*json)).run(
                &orchestrator,
                contents,
                &mut stdout,
            )?;
            Ok(if all_saved {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        },
        Commands::List { json } => {
            let orchestrator = SaveOrchestrator::new(create_backend(config)?);
            ListCommand::new(OutputFormat::from_json_flag(*json)).run(&orchestrator, &mut stdout)?;
            Ok(ExitCode::SUCCESS)
        },
        Commands::Config { show } => {
            if *show {
                ConfigCommand::new().show(
                    config,
                    &observability_config.logging,
                    &observability_config.metrics,
                    &mut stdout,
                )?;
            } else {
                println!("Use --show to display the effective configuration.");
            }
            Ok(ExitCode::SUCCESS)
        },
    }
}

fn print_metrics(handle: &ObservabilityHandle) {
    if let Some(snapshot) = handle.render_metrics() {
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(snapshot.as_bytes());
    }
}
