//! FinCycle CLI — drive the personal-finance agent simulation.
//!
//! Commands:
//! - `run` — execute N cycles, write artifacts, print a summary
//! - `market` — advance a standalone market and print its metrics

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use fincycle_core::market::{MarketConfig, MarketProcess};
use fincycle_core::rng::SeedBank;
use fincycle_runner::{run_to_artifacts, RunConfig};

#[derive(Parser)]
#[command(
    name = "fincycle",
    about = "FinCycle CLI — autonomous personal-finance agent simulator"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the agent for a number of cycles and write artifacts.
    Run {
        /// Number of cycles to simulate. Overrides the config file's value.
        #[arg(long)]
        cycles: Option<u64>,

        /// Master seed. Omit for a non-reproducible run from OS entropy.
        #[arg(long)]
        seed: Option<u64>,

        /// Path to a TOML run config. CLI flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory for cycles.jsonl, transactions.csv, summary.json.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Advance a standalone market and print instrument metrics.
    Market {
        /// Steps to advance beyond the bootstrap.
        #[arg(long, default_value_t = 250)]
        steps: u64,

        /// Master seed. Omit for OS entropy.
        #[arg(long)]
        seed: Option<u64>,

        /// Instrument to report (unknown symbols fall back to the default).
        #[arg(long, default_value = "INDEX")]
        symbol: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            cycles,
            seed,
            config,
            output_dir,
        } => cmd_run(cycles, seed, config, output_dir),
        Commands::Market {
            steps,
            seed,
            symbol,
        } => cmd_market(steps, seed, &symbol),
    }
}

fn cmd_run(
    cycles: Option<u64>,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
    output_dir: PathBuf,
) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => RunConfig::from_path(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => RunConfig::default(),
    };
    if let Some(cycles) = cycles {
        config.cycles = cycles;
    }
    if seed.is_some() {
        config.sim.seed = seed;
    }

    let summary = run_to_artifacts(&config, &output_dir)
        .with_context(|| format!("running {} cycles", config.cycles))?;

    println!("FinCycle run complete");
    println!("  cycles:        {}", summary.cycles);
    match summary.master_seed {
        Some(seed) => println!("  seed:          {seed}"),
        None => println!("  seed:          (entropy)"),
    }
    println!("  total reward:  {:.4}", summary.total_reward);
    println!("  mean reward:   {:.4}", summary.mean_reward);
    println!("  final balance: {:.2}", summary.final_balance);
    println!("  final NAV:     {:.2}", summary.final_nav);
    println!("  total value:   {:.2}", summary.final_total_value);
    println!("  invested:      {:.2}", summary.invested_amount);
    println!("  actions:");
    for (action, count) in &summary.action_counts {
        println!("    {action:<8} {count}");
    }
    if summary.degraded_cycles > 0 {
        println!("  WARNING: {} degraded cycles (persistence failures)", summary.degraded_cycles);
    }
    println!("  artifacts in:  {}", output_dir.display());
    Ok(())
}

fn cmd_market(steps: u64, seed: Option<u64>, symbol: &str) -> Result<()> {
    let seeds = SeedBank::from_option(seed);
    let mut market = MarketProcess::new(&MarketConfig::default(), seeds.stream("market"));
    for _ in 0..steps {
        market.advance();
    }

    let metrics = market.metrics(symbol);
    println!("Market after {steps} steps (+ bootstrap)");
    println!("  symbol:       {symbol}");
    println!("  price:        {:.4}", metrics.current_price);
    println!("  volatility:   {:.5}", metrics.volatility);
    println!("  total return: {:+.2}%", metrics.total_return * 100.0);
    println!("  history len:  {}", metrics.history.len());
    Ok(())
}
