#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for the GridPath navigation sandbox.

mod config;
mod frontend;
mod session;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::{Builder, Env};
use gridpath_core::Agent;
use gridpath_system_astar::AStar;
use gridpath_system_frontier::FrontierExplorer;
use gridpath_system_greedy::Greedy;
use gridpath_system_map_generator::{GeneratorConfig, MapGenerator};
use gridpath_system_q_learning::{PolicyError, TrainedAgent, Trainer};
use gridpath_system_wall_follower::WallFollower;
use gridpath_world::{render_map, ManualControl};
use log::info;

use crate::{
    config::AppConfig,
    frontend::{legend_line, parse_script, TerminalFrontend},
    session::{Session, SessionSummary},
};

#[derive(Parser, Debug)]
#[command(name = "gridpath", author, version, about = "Grid navigation sandbox")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for map generation and Q-learning exploration.
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Log at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a map and print it or write it to a file.
    Generate {
        #[arg(long)]
        rows: Option<u32>,
        #[arg(long)]
        columns: Option<u32>,
        #[arg(long)]
        wall_density: Option<f64>,
        /// Write the map here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run a navigation agent on a map.
    Run {
        #[arg(value_enum)]
        agent: AgentKind,
        /// Map file; a generated map is used otherwise.
        #[arg(long)]
        map: Option<PathBuf>,
        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Train a Q-learning policy and save its table.
    Train {
        #[arg(long)]
        map: Option<PathBuf>,
        #[arg(long)]
        episodes: Option<u32>,
        /// Where to save the table.
        #[arg(long)]
        table: Option<PathBuf>,
    },
    /// Replay a trained Q-learning policy.
    Evaluate {
        #[arg(long)]
        map: Option<PathBuf>,
        #[arg(long)]
        table: Option<PathBuf>,
        #[command(flatten)]
        display: DisplayArgs,
    },
}

#[derive(clap::Args, Debug)]
struct DisplayArgs {
    /// Print every frame.
    #[arg(long)]
    render: bool,
    /// Wait for the step delay between frames.
    #[arg(long)]
    animate: bool,
    /// Comma-separated control keys fed to the run, e.g. `p,f,p,r`.
    #[arg(long, default_value = "")]
    script: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AgentKind {
    Greedy,
    Astar,
    WallFollower,
    Frontier,
    Manual,
}

impl AgentKind {
    fn build(self) -> Box<dyn Agent> {
        match self {
            Self::Greedy => Box::new(Greedy::new()),
            Self::Astar => Box::new(AStar::new()),
            Self::WallFollower => Box::new(WallFollower::new()),
            Self::Frontier => Box::new(FrontierExplorer::new()),
            Self::Manual => Box::new(ManualControl),
        }
    }
}

/// Entry point for the GridPath command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(level)).init();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    let seed = config.resolve_seed(cli.seed);
    info!("using seed {seed}");

    match cli.command {
        Command::Generate {
            rows,
            columns,
            wall_density,
            output,
        } => {
            let defaults = config.generator;
            let generator_config = GeneratorConfig {
                rows: rows.unwrap_or(defaults.rows),
                columns: columns.unwrap_or(defaults.columns),
                wall_density: wall_density.unwrap_or(defaults.wall_density),
            };
            generate(generator_config, seed, output.as_deref())
        }
        Command::Run {
            agent,
            map,
            display,
        } => {
            let mut session = open_session(&config, seed, map)?;
            let mut agent = agent.build();
            let mut frontend = terminal(&config, &display);
            let summary = session.run_agent(agent.as_mut(), &mut frontend)?;
            report(&summary);
            Ok(())
        }
        Command::Train {
            map,
            episodes,
            table,
        } => {
            if let Some(episodes) = episodes {
                config.q_learning.episodes = episodes;
            }
            if let Some(table) = table {
                config.q_learning.table_path = table;
            }
            train(&config, seed, map)
        }
        Command::Evaluate {
            map,
            table,
            display,
        } => {
            if let Some(table) = table {
                config.q_learning.table_path = table;
            }
            let mut agent = match TrainedAgent::load(&config.q_learning) {
                Ok(agent) => agent,
                Err(error @ PolicyError::PolicyNotTrained { .. }) => {
                    println!("{error}");
                    return Ok(());
                }
                Err(error) => return Err(error.into()),
            };
            let mut session = open_session(&config, seed, map)?;
            let mut frontend = terminal(&config, &display);
            let summary = session.run_agent(&mut agent, &mut frontend)?;
            println!("policy used {} steps", agent.steps());
            report(&summary);
            Ok(())
        }
    }
}

fn generate(config: GeneratorConfig, seed: u64, output: Option<&Path>) -> Result<()> {
    let mut generator = MapGenerator::new(config, seed)?;
    let text = render_map(&generator.generate()?);

    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            println!("wrote {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn train(config: &AppConfig, seed: u64, map: Option<PathBuf>) -> Result<()> {
    let session = open_session(config, seed, map)?;
    let mut controller = session.controller()?;
    let mut frontend = TerminalFrontend::new(Vec::new(), false, false);
    let mut trainer = Trainer::new(&config.q_learning, config.rewards.clone());

    let report = trainer.train(&mut controller, &mut frontend)?;
    if let Some(signal) = report.interrupted {
        println!("training interrupted by {signal:?}");
    }
    println!(
        "trained {} episodes, {} reached the exit",
        report.episodes.len(),
        report.successes()
    );

    let path = &config.q_learning.table_path;
    let table = trainer.into_table();
    table.save(path)?;
    println!("saved {} states to {}", table.len(), path.display());
    Ok(())
}

fn open_session(config: &AppConfig, seed: u64, map: Option<PathBuf>) -> Result<Session> {
    let generator = MapGenerator::new(config.generator.clone(), seed)?;
    let map = map.or_else(|| config.cli.map.clone());
    let session = Session::new(generator, config.simulation.clone(), map.as_deref())?;

    let grid = session.active_map().grid();
    info!("playing on a {}x{} map", grid.rows(), grid.columns());
    Ok(session)
}

fn terminal(config: &AppConfig, display: &DisplayArgs) -> TerminalFrontend {
    let render = display.render || config.cli.render;
    if render {
        println!("{}", legend_line());
    }
    TerminalFrontend::new(
        parse_script(&display.script),
        render,
        display.animate || config.cli.animate,
    )
}

fn report(summary: &SessionSummary) {
    info!(
        "session ended after {} runs: {:?}",
        summary.runs, summary.last.ending
    );
}
