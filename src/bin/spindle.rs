//! Spindle CLI - run the correlation pipeline from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Strip and correlate a dataset, dump what survives
//! spindle run --dataset sources.nq --rules rulebase.ttl --output stripped.nq
//!
//! # Same, merging clusters and printing a JSON report
//! spindle run --dataset sources.nq --rules rulebase.ttl --strategy union-find --json
//!
//! # Show the whitelist a rule document produces
//! spindle rules --rules rulebase.ttl
//!
//! # License report only
//! spindle validate --dataset sources.nq
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use spindle::formats::{load_dataset, write_nquads};
use spindle::observer::TracingObserver;
use spindle::{
    validate, DatasetStore, Format, GraphName, IdStrategy, InMemoryDataset, MergeStrategy,
    Pipeline, PipelineConfig, PipelineReport, Rulebase,
};

#[derive(Parser)]
#[command(name = "spindle")]
#[command(version, about = "Entity correlation engine for linked data", long_about = None)]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate, strip, correlate and optionally generate
    Run(RunArgs),

    /// Print the whitelist built from a rule document
    Rules {
        /// Rule document
        #[arg(long)]
        rules: PathBuf,

        /// Rule document format (guessed from the extension by default)
        #[arg(long)]
        rules_format: Option<Format>,

        /// Graph holding the rules (default: the rule document's path)
        #[arg(long)]
        rule_graph: Option<String>,
    },

    /// Print license rows of a dataset
    Validate {
        /// Dataset document
        #[arg(long)]
        dataset: PathBuf,

        /// Dataset format (guessed from the extension by default)
        #[arg(long)]
        format: Option<Format>,

        /// Print one JSON object per row
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Dataset document
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Dataset format (guessed from the extension by default)
    #[arg(long)]
    format: Option<Format>,

    /// Rule document
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Rule document format (guessed from the extension by default)
    #[arg(long)]
    rules_format: Option<Format>,

    /// Graph holding the rules (default: the rule document's path)
    #[arg(long)]
    rule_graph: Option<String>,

    /// JSON config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// How equivalences between existing clusters are handled
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Mint cluster ids 1, 2, 3, ... instead of random UUIDs
    #[arg(long)]
    sequential_ids: bool,

    /// Run the proxy generator
    #[arg(long)]
    generate: bool,

    /// Write the processed dataset as N-Quads
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    /// Reuse the subject's cluster, else the object's; never merge
    FirstProxy,
    /// Merge clusters linked by an equivalence
    UnionFind,
}

impl From<StrategyArg> for MergeStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::FirstProxy => Self::FirstProxy,
            StrategyArg::UnionFind => Self::UnionFind,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Run(args) => cmd_run(args),
        Commands::Rules {
            rules,
            rules_format,
            rule_graph,
        } => cmd_rules(&rules, rules_format, rule_graph),
        Commands::Validate {
            dataset,
            format,
            json,
        } => cmd_validate(&dataset, format, json),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn build_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(dataset) = &args.dataset {
        config.dataset = Some(dataset.clone());
    }
    if args.format.is_some() {
        config.dataset_format = args.format;
    }
    if let Some(rules) = &args.rules {
        config.rulebase = Some(rules.clone());
    }
    if args.rules_format.is_some() {
        config.rulebase_format = args.rules_format;
    }
    if let Some(graph) = &args.rule_graph {
        config.rule_graph = Some(graph.clone());
    }
    if let Some(strategy) = args.strategy {
        config.merge_strategy = strategy.into();
    }
    if args.sequential_ids {
        config.id_strategy = IdStrategy::Sequential;
    }
    if args.generate {
        config.generate.enabled = true;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn cmd_run(args: RunArgs) -> Result<()> {
    let config = build_config(&args)?;
    let pipeline = Pipeline::new(config, Arc::new(TracingObserver));
    let (dataset, report) = pipeline.run_from_config().context("Pipeline failed")?;

    if let Some(path) = &args.output {
        let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let written = write_nquads(&dataset, BufWriter::new(file))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), quads = written, "dump: done");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report.summary())?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &PipelineReport) {
    println!("Spindle Run");
    println!("===========");
    println!("License rows:   {}", report.license_rows.len());
    println!("Stripped:       {}", report.removed);
    println!("Remaining:      {}", report.remaining);
    println!("Clusters:       {}", report.index.cluster_count());
    println!("Entities:       {}", report.index.entity_count());
    if let Some(artifact) = &report.artifact {
        println!("Generated:      {} into {}", artifact.len(), artifact.graph);
    }
    println!("Before:         {}", report.fingerprint_before);
    println!("After:          {}", report.fingerprint_after);

    for cluster in report.index.clusters() {
        println!();
        println!("{}", cluster.to_iri());
        for member in report.index.distinct_members(cluster) {
            println!("  {member}");
        }
    }
}

fn resolve_format(path: &Path, format: Option<Format>) -> Result<Format> {
    match format {
        Some(format) => Ok(format),
        None => Format::from_path(path).context("Pass the format explicitly"),
    }
}

fn cmd_rules(path: &Path, format: Option<Format>, rule_graph: Option<String>) -> Result<()> {
    let format = resolve_format(path, format)?;
    let store = InMemoryDataset::new();
    let summary = load_dataset(path, format, &store)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let graph = GraphName::new(rule_graph.unwrap_or(summary.source));
    let rulebase = Rulebase::build(&store, &graph)
        .with_context(|| format!("Failed to read rule graph {graph}"))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for term in rulebase.iter() {
        writeln!(out, "{term}")?;
    }
    Ok(())
}

fn cmd_validate(path: &Path, format: Option<Format>, json: bool) -> Result<()> {
    let format = resolve_format(path, format)?;
    let store = InMemoryDataset::new();
    load_dataset(path, format, &store).with_context(|| format!("Failed to load {}", path.display()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut rows = 0usize;
    for row in validate(&store) {
        let row = row?;
        if json {
            writeln!(out, "{}", serde_json::to_string(&row)?)?;
        } else {
            writeln!(
                out,
                "{}\t{}\t{}\t{}",
                row.graph, row.entity, row.entity_type, row.license
            )?;
        }
        rows += 1;
    }
    tracing::info!(rows, graphs = store.graph_names()?.len(), "validate: done");
    Ok(())
}
