// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tetragen CLI

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use tetragen::cli::Reporter;
use tetragen::evolution::{EvolutionConfig, EvolutionRun, FitnessFunction, RunMetadata, CONFIG_FILE};
use tetragen::grammar::{CrossoverStrategy, Grammar, Label, Operation, DEFAULT_ALPHABET};
use tetragen::io::{self, ExportFormat};
use tetragen::TetraMesh;

#[derive(Parser)]
#[command(name = "tetragen")]
#[command(about = "Grammar-driven tetrahedral mesh growth and evolution", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evolve a population of grammars
    Evolve(EvolveArgs),

    /// Grow a single mesh from a grammar and export it
    Grow(GrowArgs),

    /// Write the default configuration to a TOML file
    InitConfig {
        /// Destination file
        #[arg(default_value = CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show version information
    Version,
}

#[derive(Args)]
struct EvolveArgs {
    /// Configuration file (defaults to tetragen.toml plus TETRAGEN_* variables)
    #[arg(short, long, value_name = "FILE", conflicts_with = "replay")]
    config: Option<PathBuf>,

    /// Rerun a previous run directory with its recorded seed and settings
    #[arg(long, value_name = "RUN_DIR")]
    replay: Option<PathBuf>,

    #[arg(short, long)]
    generations: Option<usize>,

    #[arg(short, long)]
    population: Option<usize>,

    /// hull_volume, num_faces, dist_to_point or out_there_score
    #[arg(short, long)]
    fitness: Option<String>,

    /// one, two or uniform
    #[arg(long)]
    crossover: Option<String>,

    #[arg(long)]
    seed: Option<u64>,

    /// Root directory for run output
    #[arg(long, value_name = "DIR")]
    data_path: Option<PathBuf>,

    #[arg(long)]
    run_name: Option<String>,

    /// Write nothing to disk
    #[arg(long)]
    no_persist: bool,

    /// Allow self-intersecting growth
    #[arg(long)]
    no_collision: bool,
}

#[derive(Args)]
struct GrowArgs {
    /// Rules as "A:grow:DBF, B:relabel:C, ..."
    #[arg(short, long, conflicts_with = "from_csv")]
    grammar: Option<String>,

    /// Grammar file written by `evolve` (generations.csv or generation_<n>.csv)
    #[arg(long, value_name = "FILE")]
    from_csv: Option<PathBuf>,

    /// Row of the CSV file to grow; the last row when omitted
    #[arg(long, requires = "from_csv")]
    row: Option<usize>,

    /// Labels of the alphabet, e.g. "ABCDEFG"
    #[arg(long)]
    alphabet: Option<String>,

    /// Rules to apply
    #[arg(short, long, default_value = "50")]
    iters: usize,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// Output format (stl, obj); guessed from the extension when omitted
    #[arg(short, long)]
    format: Option<String>,

    /// Allow self-intersecting growth
    #[arg(long)]
    no_collision: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Evolve(args) => evolve_command(args),
        Commands::Grow(args) => grow_command(args),
        Commands::InitConfig { path, force } => init_config_command(&path, force),
        Commands::Version => {
            println!("Tetragen v{}", tetragen::VERSION);
            Ok(())
        }
    };

    if let Err(e) = result {
        Reporter::report_error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn evolve_command(args: EvolveArgs) -> Result<()> {
    let mut config = match (&args.config, &args.replay) {
        (Some(path), _) => EvolutionConfig::from_file(path)?,
        (None, Some(run_dir)) => RunMetadata::load(run_dir)?.replay_config(),
        (None, None) => EvolutionConfig::load()?,
    };

    if let Some(generations) = args.generations {
        config.generations = generations;
    }
    if let Some(population) = args.population {
        config.population_size = population;
        config.num_elites = config.num_elites.min(population);
    }
    if let Some(fitness) = &args.fitness {
        config.fitness_function = fitness.parse::<FitnessFunction>()?;
    }
    if let Some(crossover) = &args.crossover {
        config.crossover_strategy = crossover.parse::<CrossoverStrategy>()?;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(data_path) = args.data_path {
        config.data_path = Some(data_path);
    }
    if args.run_name.is_some() {
        config.run_name = args.run_name;
    }
    if args.no_persist {
        config.data_path = None;
    }
    if args.no_collision {
        config.check_collision = false;
    }

    if !config.persists() {
        Reporter::report_info("persistence disabled, nothing will be written to disk");
    }

    let start = Instant::now();
    let mut run = EvolutionRun::new(config)?;
    let generations = run.config().generations;

    let progress = ProgressBar::new(generations as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    while run.generation() < generations {
        let stats = run.step()?;
        progress.suspend(|| Reporter::report_generation(&stats));
        progress.inc(1);
    }
    progress.finish_and_clear();

    let summary = run.finish()?;
    Reporter::report_summary(&summary, start.elapsed());
    Ok(())
}

fn grow_command(args: GrowArgs) -> Result<()> {
    let grammar = load_grammar(&args)?;
    let format = match &args.format {
        Some(format) => format.parse()?,
        None => ExportFormat::from_path(&args.output).unwrap_or_default(),
    };

    if !grammar.is_total() {
        Reporter::report_warning("grammar has no rule for some labels; growth stops when one is reached");
    }

    let start = Instant::now();
    let mut mesh = TetraMesh::new(&grammar, !args.no_collision)?;
    let stats = mesh.apply_rules(args.iters)?;
    let duration = start.elapsed();

    io::export(&mesh, &args.output, format)?;
    Reporter::report_mesh(&mesh, &stats, duration);
    Reporter::success(&format!("Exported to {}", args.output.display()));
    Ok(())
}

fn load_grammar(args: &GrowArgs) -> Result<Grammar> {
    let alphabet: Vec<Label> = match &args.alphabet {
        Some(labels) => labels.chars().filter(|c| !c.is_whitespace() && *c != ',').collect(),
        None => DEFAULT_ALPHABET.to_vec(),
    };

    if let Some(rules) = &args.grammar {
        return Ok(Grammar::parse_rules(alphabet, Operation::ALL.to_vec(), rules)?);
    }

    let Some(path) = &args.from_csv else {
        Reporter::report_info("no grammar given, growing the example grammar");
        return Ok(Grammar::example());
    };

    // a run directory carries the alphabet and operations it was evolved with
    let (alphabet, operations) = match path.parent().map(RunMetadata::load) {
        Some(Ok(metadata)) if args.alphabet.is_none() => {
            let config = metadata.replay_config();
            (config.alphabet, config.operations)
        }
        _ => (alphabet, Operation::ALL.to_vec()),
    };

    let rows = io::read_grammar_rows(path)?;
    let index = args.row.unwrap_or_else(|| rows.len().saturating_sub(1));
    let Some(row) = rows.get(index) else {
        bail!("{} has {} rows, no row {}", path.display(), rows.len(), index);
    };

    Reporter::report_info(&format!("growing row {} (fitness {})", index, row.fitness));
    Grammar::from_record(alphabet, operations, &row.record)
        .with_context(|| format!("Failed to decode grammar from {}", path.display()))
}

fn init_config_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    EvolutionConfig::default().save(path)?;
    Reporter::success(&format!("Wrote default configuration to {}", path.display()));
    Ok(())
}
