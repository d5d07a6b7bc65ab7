use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{Context, Result};
use clap::Parser;
use hexmapper::{
    Category, Difficulty, Direction, EngineConfig, ExplorerSession, Hex, PaletteGroup,
    TerrainType,
};

/// Columns shown on each side of the explorer.
const VIEW_HALF_WIDTH: i32 = 9;
/// Rows shown above and below the explorer.
const VIEW_HALF_HEIGHT: i32 = 6;

#[derive(Parser, Debug)]
#[command(author, version, about = "Explore a hex map that grows around you", long_about = None)]
struct Cli {
    /// JSON engine config; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    seed: Option<String>,
    /// easy, normal, hard or sandbox.
    #[arg(long)]
    difficulty: Option<String>,
    /// Vision radius, 1 to 3.
    #[arg(long)]
    vision: Option<u8>,
    /// Show every generated tile regardless of distance.
    #[arg(long)]
    no_fog: bool,
    /// Biome type placed on the starting tile, by key (e.g. foret).
    #[arg(long)]
    origin: Option<String>,
    /// Comma-separated moves (e.g. "e,e,ne"); prints the result and exits.
    #[arg(long)]
    moves: Option<String>,
}

fn build_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = &cli.seed {
        config.seed = seed.clone();
    }
    if let Some(difficulty) = &cli.difficulty {
        config.difficulty = difficulty.parse()?;
    }
    if let Some(vision) = cli.vision {
        config.vision_radius = hexmapper::VisionRadius::new(vision)?;
    }
    if cli.no_fog {
        config.fog_enabled = false;
    }
    if let Some(origin) = &cli.origin {
        config.origin_terrain = origin.parse::<TerrainType>().map_err(hexmapper::ConfigError::from)?;
    }
    config.validate()?;
    Ok(config)
}

fn glyph(terrain: TerrainType) -> char {
    match terrain {
        TerrainType::Foret => 'F',
        TerrainType::Jungle => 'J',
        TerrainType::Plaine => 'P',
        TerrainType::Marais => 'M',
        TerrainType::Mont => '^',
        TerrainType::Sable => 'S',
        TerrainType::Riviere => '=',
        TerrainType::Lac => 'L',
        TerrainType::Oasis => 'O',
        TerrainType::ForetPetrifiee => 'f',
        TerrainType::TerresFongales => 'j',
        TerrainType::CiteFantome => 'c',
        TerrainType::TourbiereAssechee => 'm',
        TerrainType::MontNoir => 'A',
        TerrainType::Saliniere => 's',
        TerrainType::CanyonPlat => '-',
        TerrainType::MerDOmbre => '#',
        TerrainType::NuageToxique => 'x',
    }
}

fn color_code(terrain: TerrainType) -> &'static str {
    let bold = terrain.category() == Category::Biome;
    match (terrain.palette_group(), bold) {
        (PaletteGroup::Vert, true) => "\x1b[1;32m",
        (PaletteGroup::Vert, false) => "\x1b[32m",
        (PaletteGroup::Jaune, true) => "\x1b[1;93m",
        (PaletteGroup::Jaune, false) => "\x1b[93m",
        (PaletteGroup::Orange, true) => "\x1b[1;33m",
        (PaletteGroup::Orange, false) => "\x1b[33m",
        (PaletteGroup::Violet, true) => "\x1b[1;35m",
        (PaletteGroup::Violet, false) => "\x1b[35m",
        (PaletteGroup::Noir, true) => "\x1b[1;90m",
        (PaletteGroup::Noir, false) => "\x1b[90m",
        (PaletteGroup::Rouge, true) => "\x1b[1;31m",
        (PaletteGroup::Rouge, false) => "\x1b[31m",
        (PaletteGroup::Cyan, true) => "\x1b[1;36m",
        (PaletteGroup::Cyan, false) => "\x1b[36m",
        (PaletteGroup::Bleu, true) => "\x1b[1;34m",
        (PaletteGroup::Bleu, false) => "\x1b[34m",
        (PaletteGroup::Rose, true) => "\x1b[1;95m",
        (PaletteGroup::Rose, false) => "\x1b[95m",
    }
}

/// Draws the neighbourhood of the explorer in odd-r offset layout.
fn print_map_ascii(session: &ExplorerSession) {
    let here = session.position();
    let column_of = |hex: Hex| hex.q + (hex.r - hex.r.rem_euclid(2)) / 2;
    let center_column = column_of(here);

    for r in here.r - VIEW_HALF_HEIGHT..=here.r + VIEW_HALF_HEIGHT {
        if r.rem_euclid(2) == 1 {
            print!(" ");
        }
        for column in center_column - VIEW_HALF_WIDTH..=center_column + VIEW_HALF_WIDTH {
            let hex = Hex::new(column - (r - r.rem_euclid(2)) / 2, r);
            let tile = session.world().get(hex);
            let visible = tile.is_some_and(|t| session.is_visible(t));
            let on_river = session.rivers().occupies(hex);

            let cell = if hex == here {
                "\x1b[1;97m@\x1b[0m".to_string()
            } else if let Some(tile) = tile.filter(|_| visible) {
                if on_river {
                    "\x1b[1;96m~\x1b[0m".to_string()
                } else if session.trail().contains(&hex) {
                    "\x1b[97m+\x1b[0m".to_string()
                } else {
                    format!("{}{}\x1b[0m", color_code(tile.terrain), glyph(tile.terrain))
                }
            } else if tile.is_some() {
                "\x1b[2m.\x1b[0m".to_string()
            } else {
                " ".to_string()
            };
            print!("{} ", cell);
        }
        println!();
    }
}

fn print_session_info(session: &ExplorerSession) {
    let summary = session.summary();
    println!("\n\x1b[1mExpedition:\x1b[0m");
    println!("═══════════════════════════════");
    println!(
        "  Seed {} · difficulty {} · move {} (reroll {})",
        summary.seed, summary.difficulty, summary.move_id, summary.reroll_nonce
    );
    println!("  Position {}", summary.position);
    println!(
        "  Tiles {} · Biome {:.1}% · Désert {:.1}%",
        summary.tiles,
        summary.biome_fraction * 100.0,
        (1.0 - summary.biome_fraction) * 100.0
    );
    println!(
        "  Rivers {} ({} finished)",
        summary.rivers, summary.finished_rivers
    );

    for category in [Category::Biome, Category::Desert] {
        let found = session.discovered(category);
        let names: Vec<String> = found
            .iter()
            .map(|t| format!("{}{}\x1b[0m {}", color_code(*t), glyph(*t), t.label()))
            .collect();
        println!(
            "\n\x1b[1m{} discovered ({}/9):\x1b[0m {}",
            category.label(),
            found.len(),
            names.join("  ")
        );
    }
}

fn print_help() {
    println!("\n\x1b[1mCommands:\x1b[0m");
    println!("  e ne nw w sw se   move one tile");
    println!("  r                 reroll the tiles of the last move");
    println!("  g [seed]          reroll the whole world (new seed)");
    println!("  d <difficulty>    easy, normal, hard, sandbox");
    println!("  f                 toggle fog of war");
    println!("  v <1-3>           set vision radius");
    println!("  i                 expedition info");
    println!("  j                 expedition info as JSON");
    println!("  q                 quit");
}

fn time_seed() -> String {
    let secs = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    secs.to_string()
}

/// Applies one command line. Returns `false` when the session should end.
fn run_command(session: &mut ExplorerSession, line: &str) -> Result<bool> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(true);
    };
    let argument = words.next();

    if let Ok(direction) = command.parse::<Direction>() {
        let report = session.move_explorer(direction);
        println!(
            "Moved {} to {} · {} new tiles",
            direction.short_name(),
            report.position,
            report.tiles_added
        );
        print_map_ascii(session);
        return Ok(true);
    }

    match command {
        "r" => {
            let count = session.reroll_last_move();
            println!("Rerolled {} tiles", count);
            print_map_ascii(session);
        }
        "g" => {
            let seed = argument.map(str::to_string).unwrap_or_else(time_seed);
            session.reroll_global(seed);
            println!("New world, seed {}", session.seed());
            print_map_ascii(session);
        }
        "d" => match argument {
            Some(id) => match session.set_difficulty(id) {
                Ok(()) => println!("Difficulty set to {}", session.profile().difficulty),
                Err(e) => println!("\x1b[91m{}\x1b[0m", e),
            },
            None => println!("Difficulty is {}", session.profile().difficulty),
        },
        "f" => {
            let enabled = !session.fog().enabled;
            session.set_fog(enabled);
            println!("Fog of war {}", if enabled { "on" } else { "off" });
            print_map_ascii(session);
        }
        "v" => match argument.map(str::parse::<u8>) {
            Some(Ok(radius)) => match session.set_vision_radius(radius) {
                Ok(()) => print_map_ascii(session),
                Err(e) => println!("\x1b[91m{}\x1b[0m", e),
            },
            _ => println!("\x1b[91mUsage: v <1-3>\x1b[0m"),
        },
        "i" => print_session_info(session),
        "j" => println!("{}", serde_json::to_string_pretty(&session.summary())?),
        "h" | "?" => print_help(),
        "q" => return Ok(false),
        _ => println!("\x1b[91mUnknown command '{}'. Type h for help.\x1b[0m", command),
    }
    Ok(true)
}

fn run_scripted(session: &mut ExplorerSession, moves: &str) -> Result<()> {
    for step in moves.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let direction: Direction = step.parse()?;
        session.move_explorer(direction);
    }
    print_map_ascii(session);
    print_session_info(session);
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli).context("invalid configuration")?;
    let mut session = ExplorerSession::new(config)?;

    if let Some(moves) = &cli.moves {
        return run_scripted(&mut session, moves);
    }

    println!("=== Hexmapper ===");
    println!("Difficulties: {}", Difficulty::ALL.map(|d| d.id()).join(", "));
    print_help();
    print_map_ascii(&session);

    let stdin = io::stdin();
    let mut input = String::new();
    loop {
        print!("\n> ");
        io::stdout().flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        if !run_command(&mut session, input.trim())? {
            break;
        }
    }
    println!("Exiting...");
    Ok(())
}
