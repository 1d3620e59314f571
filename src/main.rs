//! Mating Sim - Entry Point
//!
//! Loads a run configuration, evolves the population and reports the result.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use mating_sim::{simulate, Result, SimulationConfig};

/// Evolve male competitive effort under female choice across migrating groups
#[derive(Parser, Debug)]
#[command(name = "mating-sim")]
#[command(about = "Simulate sexual selection on male competitive effort")]
struct Args {
    /// TOML config file (defaults are used for missing keys)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Override the number of generations
    #[arg(long)]
    generations: Option<u32>,

    /// Override the number of groups
    #[arg(long)]
    groups: Option<usize>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Write the full JSON output to this file
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Output format for stdout
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "mating_sim=debug" } else { "mating_sim=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_toml_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(generations) = args.generations {
        config.number_generations = generations;
    }
    if let Some(groups) = args.groups {
        config.number_groups = groups;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;

    let output = simulate(config)?;

    match args.format {
        Format::Text => {
            println!("{}", output.summary());
            for (g, genes) in output.statistics.final_genes.iter().enumerate() {
                let genes: Vec<String> = genes.iter().map(|gene| format!("{gene:.3}")).collect();
                println!("  group {g}: [{}]", genes.join(", "));
            }
        }
        Format::Json => println!("{}", output.to_json()?),
    }

    if let Some(path) = &args.output {
        std::fs::write(path, output.to_json()?)?;
        tracing::info!(path = %path.display(), "full output written");
    }

    Ok(())
}
