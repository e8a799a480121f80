use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use log::warn;

use genetic_nest::concavity::relax_concavities;
use genetic_nest::ga::{Evolution, GAConfig};
use genetic_nest::io::{build_output_document, read_input, write_output};
use genetic_nest::rng::seed_from_environment;

/// Command line arguments for the nesting optimizer.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct CliArgs {
    /// RNG seed for a fully reproducible run; clock^pid if omitted
    pub seed: Option<u64>,

    /// Input problem description
    #[arg(long, default_value = "input_shapes.json")]
    pub input: PathBuf,

    /// Output file for the optimized nesting result
    #[arg(long, default_value = "genetic_nesting_optimized_result.json")]
    pub output: PathBuf,

    /// Population size for the genetic algorithm
    #[arg(long, default_value_t = 100, value_name = "SIZE")]
    pub population_size: usize,

    /// Number of generations to evolve
    #[arg(long, default_value_t = 50, value_name = "N")]
    pub generations: usize,

    /// Mutation acceptance rate per candidate
    #[arg(long, default_value_t = 0.15, value_name = "RATE")]
    pub mutation_rate: f64,

    /// Number of top genomes carried unchanged into the next generation
    #[arg(long, default_value_t = 10, value_name = "SIZE")]
    pub elite_size: usize,

    /// Tournament size used by selection
    #[arg(long, default_value_t = 3, value_name = "SIZE")]
    pub tournament_size: usize,

    /// Skip the post-evolution concavity re-seating pass
    #[arg(long, default_value_t = false)]
    pub no_concavity_pass: bool,
}

/// Parsed configuration derived from [`CliArgs`].
#[derive(Debug)]
pub struct Config {
    pub seed: u64,
    pub input: PathBuf,
    pub output: PathBuf,
    pub ga: GAConfig,
    pub run_concavity_pass: bool,
}

impl From<CliArgs> for Config {
    fn from(args: CliArgs) -> Self {
        let seed = args.seed.unwrap_or_else(seed_from_environment);
        Self {
            seed,
            input: args.input,
            output: args.output,
            ga: GAConfig {
                population_size: args.population_size,
                generations: args.generations,
                tournament_size: args.tournament_size,
                mutation_rate: args.mutation_rate,
                elite_size: args.elite_size,
            },
            run_concavity_pass: !args.no_concavity_pass,
        }
    }
}

/// Parse command line arguments into a configuration struct.
pub fn parse_config() -> Config {
    let args = CliArgs::parse();
    args.into()
}

fn run(cfg: &Config) -> Result<()> {
    let start = Instant::now();
    let input = read_input(&cfg.input)?;

    let evolution = Evolution::new(&input, cfg.ga, cfg.seed);
    let (genome, mut layout) = evolution.evolve();

    if genome.board_count.unwrap_or(0) == 0 && !input.pieces.is_empty() {
        warn!("no piece could be placed on any board");
    }

    if cfg.run_concavity_pass {
        relax_concavities(&mut layout, &input.pieces, input.distance_between_boards, input.distance_between_pieces);
    }

    let execution_time = start.elapsed().as_secs_f64();
    let document = build_output_document(&layout, input.board_width, input.board_height, execution_time);

    if let Err(e) = write_output(&cfg.output, &document) {
        eprintln!("Failed to write output file {}: {e:#}", cfg.output.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cfg = parse_config();

    match run(&cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Failed to run nesting optimizer: {e:#}");
            ExitCode::FAILURE
        }
    }
}
