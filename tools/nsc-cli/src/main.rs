//! NeuroScreenCaster CLI — QA smoke-check surface plus diagnostic commands.
//!
//! Usage:
//!   nsc check --project <PATH> [--check-export]   Smoke-check a project bundle
//!   nsc analyze --project <PATH>                   Run the Smart Camera Engine over events.json
//!   nsc info --project <PATH>                      Show project + camera-track summary

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "nsc",
    about = "NeuroScreenCaster synthesis-core QA and inspection tool",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Smoke-check a project bundle: schema, monotonicity, bounds, drift
    Check {
        /// Path to the project directory
        #[arg(long)]
        project: PathBuf,

        /// Root directory projects are normally stored under, used only to
        /// render relative paths in diagnostics
        #[arg(long)]
        root: Option<PathBuf>,

        /// Also run the duration-drift check against the events span
        #[arg(long)]
        check_export: bool,
    },

    /// Run the Smart Camera Engine over a project's events.json
    Analyze {
        /// Path to the project directory
        #[arg(long)]
        project: PathBuf,
    },

    /// Show project information and a derived camera-track summary
    Info {
        /// Path to the project directory
        #[arg(long)]
        project: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    nsc_common::logging::init_logging(&nsc_common::config::LoggingConfig {
        level: log_level.to_string(),
        json: false,
        file: None,
    });

    let ok = match cli.command {
        Commands::Check {
            project,
            root,
            check_export,
        } => commands::check::run(project, root, check_export)?,
        Commands::Analyze { project } => commands::analyze::run(project)?,
        Commands::Info { project } => commands::info::run(project)?,
    };

    if ok {
        Ok(())
    } else {
        std::process::exit(1);
    }
}
