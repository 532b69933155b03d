mod config;
mod logging;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use flexmerge::{BuiltinStrategy, MappingStrategy, MergeError, SequenceStrategy};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::logging::init_logging;

#[derive(Parser)]
#[command(
    name = "flexmerge",
    about = "Merge JSON documents with configurable sequence and mapping strategies"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log merge decisions to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge JSON files left to right and print the result
    Merge(MergeArgs),
    /// List the built-in strategy names
    Strategies,
}

#[derive(Args)]
struct MergeArgs {
    /// Files to merge; later files take precedence
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Sequence strategy (append, prepend, unique, replace, keep)
    #[arg(long)]
    sequences: Option<String>,

    /// Mapping strategy (deep, shallow, replace, keep)
    #[arg(long)]
    mappings: Option<String>,

    /// Settings file with default strategies and output options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,

    /// Write the result to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match &cli.command {
        Commands::Merge(args) => cmd_merge(args),
        Commands::Strategies => {
            cmd_strategies();
            Ok(())
        }
    }
}

fn cmd_merge(args: &MergeArgs) -> anyhow::Result<()> {
    let rendered = run_merge(args)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, rendered + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote merged document");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn run_merge(args: &MergeArgs) -> anyhow::Result<String> {
    let mut settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    settings.apply_overrides(args.sequences.as_deref(), args.mappings.as_deref());

    let merger = settings.merge.build()?;
    let documents = args
        .files
        .iter()
        .map(|path| read_document(path))
        .collect::<anyhow::Result<Vec<_>>>()?;

    tracing::debug!(files = documents.len(), merger = %merger, "merging documents");

    let merged = match merger.merge(&documents) {
        Ok(merged) => merged,
        Err(MergeError::InvalidArgumentType { index, found }) => anyhow::bail!(
            "{} must contain a JSON object, found {}",
            args.files[index].display(),
            found
        ),
        Err(e) => return Err(e.into()),
    };

    let merged = Value::Object(merged);
    let rendered = if args.compact || !settings.output.pretty {
        serde_json::to_string(&merged)?
    } else {
        serde_json::to_string_pretty(&merged)?
    };
    Ok(rendered)
}

fn read_document(path: &Path) -> anyhow::Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn cmd_strategies() {
    println!("Sequence strategies:");
    for strategy in SequenceStrategy::all() {
        let marker = if *strategy == SequenceStrategy::default() { " (default)" } else { "" };
        println!("  {}{}", strategy, marker);
    }
    println!();
    println!("Mapping strategies:");
    for strategy in MappingStrategy::all() {
        let marker = if *strategy == MappingStrategy::default() { " (default)" } else { "" };
        println!("  {}{}", strategy, marker);
    }
}
