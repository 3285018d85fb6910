//! Hexfront CLI - headless driver for the tactics engine.
//!
//! - `hexfront replay` - apply a JSON command script to a scenario and print the events
//! - `hexfront inspect` - show movement and attack options for units
//! - `hexfront check` - validate a rules directory and a scenario

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use hexfront_core::{
    load_rules, parse_scenario, skirmish_scenario, CompiledRules, GameEngine, GameState,
    GameStatus, RulesSource,
};
use hexfront_protocol::{Command, Event, Hex, Scenario, UnitId};

#[derive(Parser)]
#[command(name = "hexfront")]
#[command(about = "Turn-based hex tactics engine", version)]
struct Cli {
    /// Rules directory with terrain.yaml, units.yaml and tuning.yaml (embedded rules by default)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Scenario JSON file (embedded skirmish by default)
    #[arg(short, long, global = true)]
    scenario: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a command script and print the resulting events
    Replay {
        /// JSON array of commands
        commands: PathBuf,

        /// Seed for weather and capture rolls
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Stop at the first rejected command
        #[arg(long)]
        strict: bool,

        /// Print a JSON summary instead of one line per event
        #[arg(long)]
        json: bool,
    },

    /// Show reachable and attackable hexes
    Inspect {
        /// Only this unit (every unit of the active team by default)
        #[arg(long)]
        unit: Option<u32>,
    },

    /// Validate the rules and the scenario
    Check,
}

#[derive(Serialize)]
struct ReplaySummary {
    events: Vec<Event>,
    rejected: Vec<Rejection>,
    status: GameStatus,
    turn: u32,
}

#[derive(Serialize)]
struct Rejection {
    index: usize,
    command: Command,
    reason: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let logger = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        logger.json().init();
    } else {
        logger.init();
    }

    let rules = read_rules(cli.rules.as_deref())?;
    let scenario = read_scenario(cli.scenario.as_deref())?;

    match cli.command {
        Commands::Replay {
            commands,
            seed,
            strict,
            json,
        } => replay(&scenario, rules, &commands, seed, strict, json),
        Commands::Inspect { unit } => inspect(&scenario, rules, unit.map(UnitId)),
        Commands::Check => check(&scenario, &rules),
    }
}

fn read_rules(dir: Option<&Path>) -> Result<CompiledRules> {
    match dir {
        Some(dir) => load_rules(RulesSource::Path(dir.display().to_string()))
            .with_context(|| format!("loading rules from {}", dir.display())),
        None => load_rules(RulesSource::Embedded).context("loading embedded rules"),
    }
}

fn read_scenario(path: Option<&Path>) -> Result<Scenario> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading scenario {}", path.display()))?;
            parse_scenario(&json).with_context(|| format!("parsing scenario {}", path.display()))
        }
        None => skirmish_scenario().context("parsing embedded skirmish"),
    }
}

fn replay(
    scenario: &Scenario,
    rules: CompiledRules,
    script: &Path,
    seed: u64,
    strict: bool,
    json: bool,
) -> Result<()> {
    let raw = std::fs::read_to_string(script)
        .with_context(|| format!("reading command script {}", script.display()))?;
    let commands: Vec<Command> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing command script {}", script.display()))?;

    let mut engine =
        GameEngine::from_scenario(scenario, rules, seed).context("building game state")?;
    tracing::info!(scenario = %scenario.name, commands = commands.len(), seed, "replay started");

    let mut events = Vec::new();
    let mut rejected = Vec::new();
    for (index, command) in commands.into_iter().enumerate() {
        match engine.try_apply_command(command.clone()) {
            Ok(batch) => {
                if !json {
                    for event in &batch {
                        println!("{}", serde_json::to_string(event)?);
                    }
                }
                events.extend(batch);
            }
            Err(err) => {
                tracing::warn!(index, error = %err, "command rejected");
                if strict {
                    anyhow::bail!("command #{index} rejected: {err}");
                }
                rejected.push(Rejection {
                    index,
                    command,
                    reason: err.to_string(),
                });
            }
        }
    }

    let state = engine.state();
    if json {
        let summary = ReplaySummary {
            events,
            rejected,
            status: state.status,
            turn: state.turn,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_status(state);
        if !rejected.is_empty() {
            println!("{} command(s) rejected", rejected.len());
        }
    }
    Ok(())
}

fn inspect(scenario: &Scenario, rules: CompiledRules, unit: Option<UnitId>) -> Result<()> {
    let engine = GameEngine::from_scenario(scenario, rules, 0).context("building game state")?;
    let state = engine.state();
    let ids: Vec<UnitId> = match unit {
        Some(id) => {
            anyhow::ensure!(state.unit(id).is_some(), "no unit {id} in scenario");
            vec![id]
        }
        None => state.units_of(state.active_team).map(|u| u.id).collect(),
    };

    for id in ids {
        let Some(unit) = state.unit(id) else {
            continue;
        };
        let reachable = engine.query_reachable(id);
        let targets = engine.query_attackable(id);
        println!(
            "{id} {} ({}) at {} hp {}/{} fuel {}",
            unit.kind, unit.team, unit.position, unit.hp, unit.max_hp, unit.fuel
        );
        println!("  reachable ({}): {}", reachable.len(), join_hexes(&reachable));
        println!("  attackable ({}): {}", targets.len(), join_hexes(&targets));
    }
    Ok(())
}

fn check(scenario: &Scenario, rules: &CompiledRules) -> Result<()> {
    let state = GameState::from_scenario(scenario, rules).context("validating scenario")?;
    println!(
        "rules ok: {} terrains, {} unit types",
        rules.terrains.len(),
        rules.units.len()
    );
    println!(
        "scenario ok: {} tiles, {} cities, {} units",
        state.board.len(),
        state.board.cities().count(),
        state.units.len()
    );
    print_status(&state);
    Ok(())
}

fn print_status(state: &GameState) {
    match state.status {
        GameStatus::Playing => println!(
            "turn {} - {} to move - weather {:?} ({})",
            state.turn, state.active_team, state.weather, state.weather_duration
        ),
        GameStatus::GameOver { winner, reason } => {
            println!("game over on turn {}: {winner} wins by {reason:?}", state.turn)
        }
    }
}

fn join_hexes(hexes: &[Hex]) -> String {
    hexes
        .iter()
        .map(|hex| hex.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
