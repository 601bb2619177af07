//! # Breakdown Headless Runner
//!
//! Generates a game, plays a command script (or waits out a number of
//! turns) and prints a summary. Nothing is rendered.

use breakdown::{
    parse_script, BreakdownResult, Command, GameEvent, GameState, GenerationConfig,
    GenerationStrategy, Intent,
};
use clap::{Parser, ValueEnum};
use log::{debug, error, info};
use std::path::PathBuf;

/// Command line arguments for the Breakdown runner.
#[derive(Parser, Debug)]
#[command(name = "breakdown")]
#[command(about = "Headless runner for the Breakdown station roguelike")]
#[command(version)]
struct Args {
    /// Random seed for level generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// Level layout strategy
    #[arg(short, long, value_enum, default_value_t = Generator::Bsp)]
    generator: Generator,

    /// Turns to wait when no script is given
    #[arg(short, long, default_value_t = 10)]
    turns: u32,

    /// Whitespace-separated command script, e.g. "8 8 p u0 @12,7"
    #[arg(long)]
    script: Option<String>,

    /// Write the final state to this JSON file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Generator {
    Bsp,
    Rooms,
}

impl From<Generator> for GenerationStrategy {
    fn from(generator: Generator) -> Self {
        match generator {
            Generator::Bsp => GenerationStrategy::Bsp,
            Generator::Rooms => GenerationStrategy::RandomRooms,
        }
    }
}

fn main() {
    let args = Args::parse();
    initialize_logging(&args.log_level);

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// Initializes `env_logger`; `RUST_LOG` wins over `--log-level`.
fn initialize_logging(log_level: &str) {
    env_logger::Builder::new()
        .parse_filters(log_level)
        .parse_default_env()
        .format_target(false)
        .init();
}

fn run(args: &Args) -> BreakdownResult<()> {
    info!("Starting Breakdown v{}", breakdown::VERSION);
    let seed = args.seed.unwrap_or(12345);
    let config = GenerationConfig::new(seed).with_strategy(args.generator.into());
    info!("Generating station with seed {} ({})", seed, config.strategy);

    let mut game = GameState::new(config)?;
    let commands = match &args.script {
        Some(script) => parse_script(script)?,
        None => (0..args.turns).map(|_| Command::new(Intent::Wait)).collect(),
    };

    let mut consumed = 0;
    for command in &commands {
        if game.is_game_over() {
            info!("Game over, ignoring remaining commands");
            break;
        }
        let mut selector = command.selector();
        if game.process_intent(command.intent, &mut selector)?.consumes_turn() {
            consumed += 1;
        }
        for event in game.drain_events() {
            log_event(&event);
        }
    }

    print_summary(&game, commands.len(), consumed);

    if let Some(path) = &args.save {
        game.save_to_file(path)?;
        info!("Saved game to {}", path.display());
    }
    Ok(())
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::Died { name, .. } => info!("{} is dead", name),
        GameEvent::Descended { depth } => info!("Descended to depth {}", depth),
        GameEvent::GameOver => info!("The hero has fallen"),
        other => debug!("{:?}", other),
    }
}

fn print_summary(game: &GameState, commands: usize, consumed: u32) {
    let player = &game.player;
    println!("seed:      {}", game.seed);
    println!("depth:     {}", game.depth());
    println!("turn:      {}", game.turn);
    println!("commands:  {} ({} consumed a turn)", commands, consumed);
    println!(
        "player:    {} at {} with {}/{} hp, {} xp",
        player.name, player.position, player.fighter.hp, player.fighter.max_hp, player.fighter.xp
    );
    println!("enemies:   {}", game.level.characters.len());
    println!("inventory: {} items", player.inventory.len());
    println!(
        "status:    {}",
        if game.is_game_over() { "game over" } else { "playing" }
    );
}
