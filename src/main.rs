//! declutter - resolve duplicate file groups and act on the surplus copies.
//!
//! Usage:
//!   declutter groups                          List duplicate groups
//!   declutter plan --strategy newest          Show which copies a strategy removes
//!   declutter run --strategy oldest --action delete
//!                                             Apply an action to the surplus copies
//!   declutter --help                          Show help

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result};
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use declutter_analyze::{GroupSummary, ResolutionPlan, Resolver};
use declutter_core::fixtures::{demo_groups, demo_store_entries};
use declutter_core::{CoordinatorConfig, DuplicateGroup, RetentionStrategy, SelectionSet};
use declutter_ops::{
    AlwaysConfirm, BatchCoordinator, BatchError, BatchReport, Confirm, ConfirmRequest, FileAction,
    MemoryStore, PendingAction,
};

const LOG_ENV: &str = "DECLUTTER_LOG";

#[derive(Parser)]
#[command(
    name = "declutter",
    version,
    about = "Resolve duplicate files and clean up the extra copies",
    long_about = "declutter keeps one copy of every duplicate group and deletes, moves, \
                  or archives the rest.\n\n\
                  Set DECLUTTER_LOG (e.g. `debug`) to see what happens under the hood."
)]
struct Cli {
    /// TOML file with coordinator settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List duplicate groups
    Groups {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Show the copies a retention strategy would act on
    Plan {
        #[command(flatten)]
        resolve: ResolveArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Apply an action to the surplus copies
    Run(RunArgs),
}

#[derive(Args)]
struct ResolveArgs {
    /// Which copies to keep
    #[arg(short, long, default_value = "manual")]
    strategy: StrategyArg,

    /// File ids to keep when the strategy is manual (repeatable)
    #[arg(long = "select", value_name = "ID")]
    select: Vec<String>,
}

impl ResolveArgs {
    fn selection(&self) -> SelectionSet {
        self.select.iter().map(String::as_str).collect()
    }
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    resolve: ResolveArgs,

    /// What to do with the surplus copies
    #[arg(short, long)]
    action: ActionArg,

    /// Destination folder for move
    #[arg(short, long)]
    dest: Option<String>,

    /// Archive name for archive (defaults to the configured name)
    #[arg(long)]
    archive_name: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,

    /// Undo the action right after it completes
    #[arg(long)]
    undo: bool,

    /// Remove a path from the store before running (repeatable)
    #[arg(long, value_name = "PATH")]
    missing: Vec<String>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Newest,
    Oldest,
    Manual,
}

impl From<StrategyArg> for RetentionStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Newest => RetentionStrategy::Newest,
            StrategyArg::Oldest => RetentionStrategy::Oldest,
            StrategyArg::Manual => RetentionStrategy::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ActionArg {
    Delete,
    Move,
    Archive,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// JSON shape of `run`.
#[derive(Serialize)]
struct RunOutput {
    report: BatchReport,
    undone: Option<PendingAction>,
    groups: Vec<DuplicateGroup>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => CoordinatorConfig::load(path)
            .wrap_err_with(|| format!("Failed to load config {}", path.display()))?,
        None => CoordinatorConfig::default(),
    };

    match cli.command {
        Command::Groups { format } => show_groups(format)?,
        Command::Plan { resolve, format } => show_plan(&resolve, format)?,
        Command::Run(args) => run_batch(config, args).await?,
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

/// List the demo duplicate groups.
fn show_groups(format: OutputFormat) -> Result<()> {
    let groups = demo_groups();

    match format {
        OutputFormat::Text => {
            print_header("Duplicate Groups");
            print_groups(&groups);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&groups)?);
        }
    }

    Ok(())
}

/// Show which files a strategy would act on, without touching anything.
fn show_plan(args: &ResolveArgs, format: OutputFormat) -> Result<()> {
    let groups = demo_groups();
    let strategy = RetentionStrategy::from(args.strategy);
    let plan = Resolver::new(strategy).plan(&groups, &args.selection());

    match format {
        OutputFormat::Text => {
            print_header(&format!("Plan: {}", strategy.label()));
            print_plan(&plan);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
    }

    Ok(())
}

/// Run one batch action against the demo store.
async fn run_batch(config: CoordinatorConfig, args: RunArgs) -> Result<()> {
    let store = Arc::new(
        MemoryStore::with_files(demo_store_entries()).with_archive_dir(config.archive_dir.clone()),
    );
    for path in &args.missing {
        if !store.remove(path) {
            warn!(path = %path, "--missing path is not in the store");
        }
    }

    let confirm: Arc<dyn Confirm> = if args.yes {
        Arc::new(AlwaysConfirm)
    } else {
        Arc::new(prompt)
    };

    let coordinator =
        BatchCoordinator::with_store(demo_groups(), store, confirm).with_config(config);
    for id in &args.resolve.select {
        coordinator.select(id.as_str());
    }

    let action = match args.action {
        ActionArg::Delete => FileAction::Delete,
        ActionArg::Move => FileAction::move_to(args.dest.clone().unwrap_or_default()),
        ActionArg::Archive => coordinator.archive_action(args.archive_name.clone()),
    };

    let strategy = RetentionStrategy::from(args.resolve.strategy);
    let report = match coordinator.execute_batch(strategy, action).await {
        Ok(report) => report,
        Err(BatchError::Cancelled) => {
            eprintln!("Cancelled.");
            return Ok(());
        }
        Err(err) => return Err(err).wrap_err("Batch action failed"),
    };

    let undone = if args.undo {
        Some(coordinator.undo().await.wrap_err("Undo failed")?)
    } else {
        None
    };

    match args.format {
        OutputFormat::Text => {
            println!("{}", report.summary());
            if let Some(name) = &report.archive_name {
                println!("Archive: {name}");
            }
            if let Some(pending) = &undone {
                println!("Undone: {}", pending.undo_description());
            } else if let Some(pending) = coordinator.pending_action() {
                println!("Undo available: {}", pending.undo_description());
            }
            println!();
            print_header("Remaining Groups");
            print_groups(&coordinator.groups());
        }
        OutputFormat::Json => {
            let output = RunOutput {
                report,
                undone,
                groups: coordinator.groups(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

/// Ask on stdin before anything is changed.
fn prompt(request: &ConfirmRequest) -> bool {
    for path in &request.paths {
        eprintln!("  {path}");
    }
    eprint!("{request} [y/N] ");
    if io::stderr().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_header(title: &str) {
    println!("{}", "─".repeat(70));
    println!(" {title}");
    println!("{}", "─".repeat(70));
    println!();
}

fn print_groups(groups: &[DuplicateGroup]) {
    let summary = GroupSummary::from_groups(groups);
    if !summary.has_duplicates() {
        println!(" No duplicate files found.");
        return;
    }

    println!(
        " {} groups ({} files), {} wasted",
        summary.group_count,
        summary.file_count,
        format_size(summary.wasted_bytes)
    );
    println!();

    for group in groups {
        println!(
            " Group {} ({} files, {} wasted)",
            group.id,
            group.count(),
            format_size(group.wasted_bytes())
        );
        for file in &group.files {
            println!(
                "   {:<4} {:<40} {:>10}  {}",
                file.id.as_str(),
                file.path,
                format_size(file.size),
                file.last_modified.format("%Y-%m-%d")
            );
        }
        println!();
    }
}

fn print_plan(plan: &ResolutionPlan) {
    if plan.is_empty() {
        println!(" Nothing to process.");
        return;
    }

    for resolution in &plan.groups {
        let keep = resolution
            .keep
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            " Group {} keeps [{}]{}",
            resolution.group_id,
            keep,
            if resolution.keeps_nothing() { " (no copy kept)" } else { "" }
        );
        for file in &resolution.surplus {
            println!("   - {}", file.path);
        }
    }

    println!();
    println!(
        " {} file(s), {} reclaimable",
        plan.surplus_count(),
        format_size(plan.reclaimable_bytes())
    );
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
