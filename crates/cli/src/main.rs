use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::*;
use conductor_core::manager::{ProjectManager, ProjectManagerConfig};
use conductor_core::resolver::ResolutionStrategy;
use conductor_core::types::ConductorError;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod commands;

/// Conductor - runs build jobs and their prerequisites in order
#[derive(Parser)]
#[command(name = "conductor")]
#[command(about = "Runs build jobs and their prerequisites in order")]
#[command(version)]
struct Cli {
    /// Which job to execute. "jobs" will print available jobs.
    job: String,

    /// Clean all intermediate files before starting
    #[arg(short, long)]
    clean: bool,

    /// Use release profiles and optimizations wherever possible
    #[arg(short, long)]
    release: bool,

    /// Activate the extra steps needed on GitHub hosted runners
    #[arg(short, long)]
    github_runner: bool,

    /// Path to the project root (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Print the steps that would be taken without running them
    #[arg(long)]
    plan: bool,

    /// Override the job ordering from the project file
    #[arg(long, value_enum)]
    ordering: Option<Ordering>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Ordering {
    Topological,
    ReverseDedup,
}

impl From<Ordering> for ResolutionStrategy {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Topological => ResolutionStrategy::Topological,
            Ordering::ReverseDedup => ResolutionStrategy::ReverseDedup,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        // Failed commands were already reported by the executor
        if !already_reported(&err) {
            eprintln!("{} {:#}", "ERROR:".red().bold(), err);
        }
        std::process::exit(exit_code(&err));
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let manager = ProjectManager::new(ProjectManagerConfig {
        project_root: cli.project,
        release: cli.release,
        github_runner: cli.github_runner,
        strategy: cli.ordering.map(ResolutionStrategy::from),
    })?;
    debug!(
        jobs = manager.list_tasks().len(),
        strategy = ?manager.strategy(),
        "project loaded"
    );

    if cli.plan {
        commands::plan::execute(&manager, &cli.job, cli.clean)
    } else {
        commands::run::execute(&manager, &cli.job, cli.clean)
    }
}

/// Status of the failing command, or 1 for errors detected internally
fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<ConductorError>()
        .map(ConductorError::exit_code)
        .unwrap_or(1)
}

fn already_reported(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<ConductorError>(),
        Some(ConductorError::ActionFailed { .. })
    )
}
